//! Analysis command and query handlers.
//!
//! Create, open, list and delete analyses. An opened analysis is edited
//! through its `AnalysisSession`, which schedules debounced saves.

mod create_analysis;
mod delete_analysis;
mod errors;
mod list_analyses;
mod open_analysis;
mod session;

pub use create_analysis::{CreateAnalysisCommand, CreateAnalysisHandler};
pub use delete_analysis::DeleteAnalysisHandler;
pub use errors::AnalysisCommandError;
pub use list_analyses::ListAnalysesHandler;
pub use open_analysis::OpenAnalysisHandler;
pub use session::AnalysisSession;
