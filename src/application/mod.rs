//! Application layer - Commands, Queries, Handlers and background saving.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod autosave;
pub mod handlers;

pub use autosave::{AutoSaveConfig, AutoSaver, SyncStatus};
pub use handlers::{
    AnalysisCommandError, AnalysisSession, CreateAnalysisCommand, CreateAnalysisHandler,
    DeleteAnalysisHandler, ListAnalysesHandler, OpenAnalysisHandler,
};
