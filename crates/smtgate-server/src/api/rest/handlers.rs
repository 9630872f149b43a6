//! API endpoint handlers

use super::extractors::JsonExtractor;
use super::types::*;
use crate::error::ServerError;
use axum::{extract::State, Json};
use smtgate_core::{ConstraintRequest, SolveError, SolverResponse};
use tracing::{error, info, warn};

/// Usage banner
pub(super) async fn root() -> Json<RootResponse> {
    Json(RootResponse::default())
}

/// Health check endpoint
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Solve endpoint
#[axum::debug_handler]
pub(super) async fn solve(
    State(state): State<AppState>,
    JsonExtractor(payload): JsonExtractor<ConstraintRequest>,
) -> Result<Json<SolverResponse>, ServerError> {
    info!(
        "Received solve request with {} byte constraint",
        payload.constraint.len()
    );

    match state.service.handle(&payload).await {
        Ok(response) => {
            info!(
                check_result = %response.check_result(),
                model_size = response.model().map_or(0, |m| m.len()),
                "Solve request completed"
            );
            Ok(Json(response))
        }
        Err(err) => {
            log_failure(&err);
            Err(err.into())
        }
    }
}

fn log_failure(err: &SolveError) {
    if err.is_unavailable() {
        error!(kind = err.kind(), error = %err, "Solver could not be started");
    } else {
        warn!(kind = err.kind(), error = %err, "Constraint rejected");
    }
}
