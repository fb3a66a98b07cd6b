//! Storage Adapters
//!
//! Implementations of the AnalysisStore port that need no database.
//!
//! ## Available Adapters
//!
//! - **FileAnalysisStore** - Stores each analysis as a YAML file on disk
//! - **InMemoryAnalysisStore** - Stores analyses in memory (testing/development)
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::{FileAnalysisStore, InMemoryAnalysisStore};
//!
//! // Single-node deployment: file-based storage
//! let store = FileAnalysisStore::new("./data/analyses");
//!
//! // Testing: in-memory storage
//! let store = InMemoryAnalysisStore::new();
//! ```

mod file_analysis_store;
mod in_memory_analysis_store;

pub use file_analysis_store::FileAnalysisStore;
pub use in_memory_analysis_store::InMemoryAnalysisStore;

use crate::domain::analysis::AnalysisSummary;

/// Orders summaries by most recent update, ties by id.
pub(crate) fn newest_first(mut summaries: Vec<AnalysisSummary>) -> Vec<AnalysisSummary> {
    summaries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
    summaries
}
