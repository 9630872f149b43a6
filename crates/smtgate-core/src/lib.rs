//! smtgate core - solver contract and model normalization
//!
//! This crate holds everything between an HTTP request and the solver process:
//! - The engine contract (`Engine`, `Session`, `Verdict`, `EngineModel`)
//! - The Z3 process engine speaking SMT-LIB 2 over stdio
//! - The result normalizer turning solver values into JSON-friendly values
//! - The request handler (`SolveService`) with its per-request deadline

pub mod engine;
pub mod error;
pub mod normalize;
pub mod service;
pub mod sexpr;
pub mod types;
pub mod z3;

// Re-export commonly used types
pub use engine::{
    Declaration, Decoded, Engine, EngineModel, EngineValue, MockEngine, MockOutcome, Rational,
    Session, Verdict,
};
pub use error::{EngineError, SolveError};
pub use normalize::{normalize, normalize_value, DECIMAL_PRECISION};
pub use service::SolveService;
pub use types::{ConstraintRequest, ModelEntry, ModelValue, SolverResponse};
pub use z3::{Z3Config, Z3Engine};
