//! REST surface (spec.md §6), mounted under `/api/v1`.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{health, runs, trigger, workflows};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/workflows", post(workflows::create_workflow))
        .route("/workflows/:uuid", get(workflows::get_workflow))
        .route("/trigger", post(trigger::trigger_workflow))
        .route("/runs", get(runs::list_runs))
        .route("/runs/:uuid", get(runs::get_run));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health::health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
