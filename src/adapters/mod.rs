//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `storage` - In-memory and YAML file analysis stores
//! - `postgres` - PostgreSQL analysis store
//! - `http` - axum REST API

pub mod http;
pub mod postgres;
pub mod storage;

pub use postgres::PostgresAnalysisStore;
pub use storage::{FileAnalysisStore, InMemoryAnalysisStore};
