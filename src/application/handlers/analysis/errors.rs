//! Error type shared by the analysis command and query handlers.

use thiserror::Error;

use crate::domain::analysis::{AnalysisError, RecordState};
use crate::domain::foundation::{AnalysisId, ErrorCode, ValidationError};
use crate::ports::StoreError;

/// Failure of an analysis use case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisCommandError {
    #[error("Analysis was deleted: {0}")]
    Deleted(AnalysisId),

    #[error("Analysis cannot move from {from:?} to {to:?}")]
    InvalidStateTransition { from: RecordState, to: RecordState },

    #[error(transparent)]
    Domain(#[from] AnalysisError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ValidationError> for AnalysisCommandError {
    fn from(err: ValidationError) -> Self {
        AnalysisCommandError::Domain(AnalysisError::Validation(err))
    }
}

impl AnalysisCommandError {
    /// Returns the client-facing error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisCommandError::Deleted(_) => ErrorCode::AnalysisNotFound,
            AnalysisCommandError::InvalidStateTransition { .. } => {
                ErrorCode::InvalidStateTransition
            }
            AnalysisCommandError::Domain(e) => e.code(),
            AnalysisCommandError::Store(e) => e.code(),
        }
    }
}
