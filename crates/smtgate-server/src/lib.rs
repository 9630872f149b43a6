//! smtgate HTTP server library
//!
//! Exposes the router, configuration and error types so tests and embedders
//! can build the same app the binary serves.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;
