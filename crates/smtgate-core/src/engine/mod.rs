//! Solving engine contract
//!
//! A solving engine is a black box: open a session, submit constraint text,
//! ask for a verdict, and read the model when the verdict is `sat`.
//! Sessions are never shared; one request owns one session from start to end.

mod mock;
mod model;

pub use mock::{MockEngine, MockOutcome};
pub use model::{Declaration, Decoded, EngineModel, EngineValue, Rational};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Three-way satisfiability verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Sat,
    Unsat,
    Unknown,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Sat => "sat",
            Verdict::Unsat => "unsat",
            Verdict::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "sat" => Ok(Verdict::Sat),
            "unsat" => Ok(Verdict::Unsat),
            "unknown" => Ok(Verdict::Unknown),
            other => Err(format!("not a verdict: {}", other)),
        }
    }
}

/// Factory for isolated solver sessions
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine name for logs
    fn name(&self) -> &str;

    /// Open a fresh session with no declarations or assertions
    async fn new_session(&self) -> Result<Box<dyn Session>>;
}

/// One solver conversation
#[async_trait]
pub trait Session: Send {
    /// Submit constraint text in the engine's native syntax
    async fn submit(&mut self, text: &str) -> Result<()>;

    /// Decide satisfiability of everything submitted so far
    async fn check(&mut self) -> Result<Verdict>;

    /// Witnessing model; only valid after `check` answered `Sat`
    async fn model(&mut self) -> Result<EngineModel>;
}
