//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `AnalysisStore` - Persistence of analysis records

mod analysis_store;

pub use analysis_store::{AnalysisStore, StoreError};
