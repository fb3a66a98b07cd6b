//! HTTP routes for analysis endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use super::handlers::{
    add_scenario, create_analysis, delete_analysis, derive_weights, get_analysis, list_analyses,
    remove_scenario, rename_analysis, rename_attribute, save_analysis, set_attribute_weight,
    set_judgment, set_rating, use_manual_weights, AnalysisHandlers,
};

/// Creates the analysis router with all endpoints.
pub fn analysis_routes(handlers: AnalysisHandlers) -> Router {
    Router::new()
        .route("/", post(create_analysis).get(list_analyses))
        .route(
            "/:id",
            get(get_analysis)
                .patch(rename_analysis)
                .delete(delete_analysis),
        )
        .route(
            "/:id/attributes/:attribute_id/weight",
            put(set_attribute_weight),
        )
        .route("/:id/attributes/:attribute_id/name", put(rename_attribute))
        .route(
            "/:id/scenarios/:scenario_id/ratings/:index",
            put(set_rating),
        )
        .route("/:id/scenarios", post(add_scenario))
        .route("/:id/scenarios/:scenario_id", delete(remove_scenario))
        .route("/:id/judgments", put(set_judgment))
        .route("/:id/weights/derive", post(derive_weights))
        .route("/:id/weights/manual", post(use_manual_weights))
        .route("/:id/save", post(save_analysis))
        .with_state(handlers)
}
