//! HTTP adapters - REST API implementations.
//!
//! `app_router` assembles the full API: the health probe plus the nested
//! analysis endpoints, wrapped in request tracing, CORS and a timeout.

pub mod analysis;

use std::time::Duration;

use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

pub use analysis::{analysis_routes, AnalysisHandlers};

/// Builds the application router.
pub fn app_router(handlers: AnalysisHandlers, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/analyses", analysis_routes(handlers))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(TimeoutLayer::new(request_timeout)),
        )
}

/// GET /health - Liveness probe
async fn health_check() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}
