//! Route definitions for the API.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::SharedState;

/// Create the main API router
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/v1/update/:branch", get(handlers::update::get_update))
        .route(
            "/v1/update/:branch/changes",
            get(handlers::update::get_changes),
        )
        .route(
            "/v1/webhook/refresh",
            get(handlers::webhook::refresh).post(handlers::webhook::refresh),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
