// ABOUTME: Route table for the control endpoint.
// ABOUTME: Request tracing comes from tower-http's TraceLayer.

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers;
use super::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/redeploy", post(handlers::redeploy))
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
