//! HTTP adapter for analysis endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    AddScenarioRequest, AnalysisListResponse, AnalysisResponse, AnalysisSummaryResponse,
    CreateAnalysisRequest, ErrorResponse, JudgmentRequest, NameRequest, RatingRequest,
    RenameAnalysisRequest, SyncResponse, WeightRequest,
};
pub use handlers::AnalysisHandlers;
pub use routes::analysis_routes;
