//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod analysis;

pub use analysis::{
    AnalysisCommandError, AnalysisSession, CreateAnalysisCommand, CreateAnalysisHandler,
    DeleteAnalysisHandler, ListAnalysesHandler, OpenAnalysisHandler,
};
