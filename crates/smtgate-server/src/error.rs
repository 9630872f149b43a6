//! Server error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use smtgate_core::SolveError;
use thiserror::Error;

/// Server error type
///
/// Every variant renders as `{"detail": "<display>"}`.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The constraint could not be solved as submitted
    #[error("Error processing constraint: {0}")]
    InvalidConstraint(String),

    /// The request body could not be read
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// No solver session could be opened
    #[error("Solver unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidConstraint(_) => StatusCode::BAD_REQUEST,
            ServerError::InvalidRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "detail": self.to_string(),
        }));

        (status, body).into_response()
    }
}

impl From<SolveError> for ServerError {
    fn from(err: SolveError) -> Self {
        if err.is_unavailable() {
            ServerError::Unavailable(err.to_string())
        } else {
            ServerError::InvalidConstraint(err.to_string())
        }
    }
}

impl From<anyhow::Error> for ServerError {
    fn from(err: anyhow::Error) -> Self {
        ServerError::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use smtgate_core::EngineError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_invalid_constraint_display() {
        let err = ServerError::InvalidConstraint("unknown constant y".to_string());
        assert_eq!(err.to_string(), "Error processing constraint: unknown constant y");
    }

    #[test]
    fn test_invalid_request_display() {
        let err = ServerError::InvalidRequest("missing field `constraint`".to_string());
        assert_eq!(err.to_string(), "Invalid request: missing field `constraint`");
    }

    #[test]
    fn test_parse_failure_maps_to_bad_request() {
        let err: ServerError = SolveError::from(EngineError::Parse("bad".to_string())).into();
        assert!(matches!(err, ServerError::InvalidConstraint(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Error processing constraint: bad");
    }

    #[test]
    fn test_engine_fault_maps_to_bad_request() {
        let err: ServerError =
            SolveError::from(EngineError::Exited("while answering (check-sat)".to_string())).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_empty_constraint_maps_to_bad_request() {
        let err: ServerError = SolveError::EmptyConstraint.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            "Error processing constraint: constraint must not be empty"
        );
    }

    #[test]
    fn test_spawn_failure_maps_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "z3 not found");
        let err: ServerError = SolveError::from(EngineError::Spawn(io)).into();
        assert!(matches!(err, ServerError::Unavailable(_)));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_anyhow_error_conversion() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let server_err: ServerError = anyhow_err.into();
        assert!(server_err.to_string().contains("Internal error"));
        assert!(server_err.to_string().contains("something went wrong"));
    }

    #[tokio::test]
    async fn test_into_response_body_has_detail() {
        let response = ServerError::InvalidConstraint("oops".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Error processing constraint: oops"})
        );
    }

    #[tokio::test]
    async fn test_into_response_internal_error() {
        let response = ServerError::InternalError("crash".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"detail": "Internal error: crash"}));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ServerError>();
    }
}
