//! HTTP client for `POST /solve`

use crate::error::{ClientError, ClientResult};
use crate::segment::{compose_constraint, Segment};
use reqwest::Client;
use serde::Deserialize;
use smtgate_core::{ConstraintRequest, SolverResponse, Verdict};
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a segment conflict check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictReport {
    /// `true` when no user can match every segment at once
    pub valid: bool,

    /// Verdict the solver gave for the composed constraint; `None` when no
    /// request was needed
    pub check_result: Option<Verdict>,
}

/// Error body returned by the API
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Client for a smtgate server
#[derive(Debug, Clone)]
pub struct SolverClient {
    client: Client,
    base_url: String,
}

impl SolverClient {
    /// Request timeout used by [`SolverClient::new`]
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a client for the API at `base_url` (e.g. `http://127.0.0.1:8000`)
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout
    ///
    /// The timeout should exceed the server's solver deadline, or slow
    /// constraints fail here instead of answering `unknown`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Build)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Solve one constraint
    pub async fn solve(&self, constraint: &str) -> ClientResult<SolverResponse> {
        let url = format!("{}/solve", self.base_url);
        debug!(%url, bytes = constraint.len(), "Sending constraint to solver");

        let response = self
            .client
            .post(&url)
            .json(&ConstraintRequest::new(constraint))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .map(|err| err.detail)
                .unwrap_or(body);
            warn!(status = status.as_u16(), %detail, "Solver returned error status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Check whether the segments can all match one user
    ///
    /// Segments are valid (non-conflicting) unless the solver finds a user
    /// in every one of them. An empty list is valid without a request.
    pub async fn check_segments_conflict(
        &self,
        segments: &[Segment],
    ) -> ClientResult<ConflictReport> {
        if segments.is_empty() {
            return Ok(ConflictReport {
                valid: true,
                check_result: None,
            });
        }

        let constraint = compose_constraint(segments)?;
        let response = self.solve(&constraint).await?;
        let check_result = response.check_result();

        debug!(segments = segments.len(), %check_result, "Segment conflict check");
        Ok(ConflictReport {
            valid: check_result != Verdict::Sat,
            check_result: Some(check_result),
        })
    }
}
