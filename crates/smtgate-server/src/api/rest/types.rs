//! REST API type definitions
//!
//! `POST /solve` reads a [`ConstraintRequest`](smtgate_core::ConstraintRequest)
//! and answers with a [`SolverResponse`](smtgate_core::SolverResponse); those
//! live in the core crate so the client can share them.

use serde::{Deserialize, Serialize};
use smtgate_core::SolveService;

/// Application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: SolveService,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Usage banner served at `GET /`
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
    pub usage: String,
}

impl Default for RootResponse {
    fn default() -> Self {
        Self {
            message: "Z3 Solver API".to_string(),
            usage: "POST to /solve with JSON body: {\"constraint\": \"<Z3 constraint string>\"}"
                .to_string(),
        }
    }
}
