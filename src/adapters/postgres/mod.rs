//! PostgreSQL adapters - Database implementations of the storage port.
//!
//! - `PostgresAnalysisStore` - Analyses in the `analyses` table, one JSONB column per document field

mod analysis_store;

pub use analysis_store::PostgresAnalysisStore;
