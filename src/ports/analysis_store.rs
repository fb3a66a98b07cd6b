//! Analysis Store Port - Interface for persisting analysis records.
//!
//! Stores keep each analysis as a JSON document. Loading hands back the raw
//! document so the domain decides how missing or mistyped fields are read.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::analysis::{AnalysisRecord, AnalysisSnapshot, AnalysisSummary};
use crate::domain::foundation::{AnalysisId, ErrorCode};

/// Errors that can occur during analysis storage operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Analysis not found: {0}")]
    NotFound(AnalysisId),

    #[error("Failed to serialize analysis: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Returns the client-facing error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::NotFound(_) => ErrorCode::AnalysisNotFound,
            StoreError::Serialization(_) => ErrorCode::InternalError,
            StoreError::Io(_) | StoreError::Database(_) | StoreError::Unavailable(_) => {
                ErrorCode::StoreUnavailable
            }
        }
    }
}

/// Port for persisting and loading analysis records
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Persist a newly created record
    ///
    /// # Returns
    /// The record as stored
    ///
    /// # Errors
    /// Returns `StoreError` if the write fails
    async fn create(&self, record: &AnalysisRecord) -> Result<AnalysisRecord, StoreError>;

    /// Load the raw stored document of a record
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no record exists
    async fn load(&self, id: AnalysisId) -> Result<Value, StoreError>;

    /// Overwrite the saved fields of an existing record
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if the record was deleted
    async fn save(&self, id: AnalysisId, snapshot: &AnalysisSnapshot) -> Result<(), StoreError>;

    /// Delete a record
    ///
    /// # Errors
    /// Returns `StoreError::NotFound` if no record exists
    async fn delete(&self, id: AnalysisId) -> Result<(), StoreError>;

    /// List summaries of every record, most recently updated first
    async fn list(&self) -> Result<Vec<AnalysisSummary>, StoreError>;
}
