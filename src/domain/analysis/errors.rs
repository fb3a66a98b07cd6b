//! Error types for analysis computation and record handling.

use std::fmt;
use thiserror::Error;

use crate::domain::foundation::{ErrorCode, ValidationError};

/// Which piece of data did not line up with the attribute list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// The rating list of the scenario with this id.
    ScenarioRatings(u32),
    /// The active weight vector.
    WeightVector,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::ScenarioRatings(id) => write!(f, "ratings of scenario {}", id),
            Shape::WeightVector => write!(f, "weight vector"),
        }
    }
}

/// Errors raised by the scoring engine and the analysis aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Shape mismatch: {shape} has {actual} entries, expected {expected}")]
    ShapeMismatch {
        shape: Shape,
        expected: usize,
        actual: usize,
    },

    #[error("Malformed analysis record: {0}")]
    MalformedRecord(String),

    #[error("Attribute not found: {0}")]
    AttributeNotFound(u32),

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(u32),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl AnalysisError {
    /// Creates a shape mismatch error.
    pub fn shape_mismatch(shape: Shape, expected: usize, actual: usize) -> Self {
        AnalysisError::ShapeMismatch {
            shape,
            expected,
            actual,
        }
    }

    /// Creates a malformed record error.
    pub fn malformed(reason: impl Into<String>) -> Self {
        AnalysisError::MalformedRecord(reason.into())
    }

    /// Returns the client-facing error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            AnalysisError::ShapeMismatch { .. } => ErrorCode::ShapeMismatch,
            AnalysisError::MalformedRecord(_) => ErrorCode::MalformedRecord,
            AnalysisError::AttributeNotFound(_) => ErrorCode::AttributeNotFound,
            AnalysisError::ScenarioNotFound(_) => ErrorCode::ScenarioNotFound,
            AnalysisError::Validation(_) => ErrorCode::ValidationFailed,
        }
    }
}
