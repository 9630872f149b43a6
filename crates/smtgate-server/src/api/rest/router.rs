//! Router creation and configuration

use super::handlers::*;
use super::types::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use smtgate_core::SolveService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create REST API router
pub fn create_router(service: SolveService) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/solve", post(solve))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
