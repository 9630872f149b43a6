//! Scripted engine for testing
//!
//! Outcomes are keyed by the exact constraint text. Text without a scripted
//! outcome is rejected as a parse error, the way a real engine rejects input
//! it cannot read.

use super::{Engine, EngineModel, Session, Verdict};
use crate::error::{EngineError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What a mock session does with a given constraint
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Answer `verdict`; `model` is `get-model` text served after `Sat`
    Answer {
        verdict: Verdict,
        model: Option<String>,
    },
    /// Reject the text on submit
    ParseError(String),
    /// Accept the text, then fail on check
    SolverError(String),
    /// Accept the text, then never answer check
    Hang,
}

impl MockOutcome {
    pub fn sat(model: impl Into<String>) -> Self {
        MockOutcome::Answer {
            verdict: Verdict::Sat,
            model: Some(model.into()),
        }
    }

    pub fn unsat() -> Self {
        MockOutcome::Answer {
            verdict: Verdict::Unsat,
            model: None,
        }
    }

    pub fn unknown() -> Self {
        MockOutcome::Answer {
            verdict: Verdict::Unknown,
            model: None,
        }
    }
}

/// In-memory engine with scripted answers
#[derive(Debug, Default)]
pub struct MockEngine {
    outcomes: Arc<HashMap<String, MockOutcome>>,
    sessions_opened: AtomicUsize,
    unavailable: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine whose sessions can never be opened
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    /// Script the outcome for `constraint`
    pub fn with_outcome(mut self, constraint: impl Into<String>, outcome: MockOutcome) -> Self {
        Arc::make_mut(&mut self.outcomes).insert(constraint.into(), outcome);
        self
    }

    /// Number of sessions opened so far
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    async fn new_session(&self) -> Result<Box<dyn Session>> {
        if self.unavailable {
            return Err(EngineError::Spawn(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "mock engine is unavailable",
            )));
        }
        self.sessions_opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockSession {
            outcomes: Arc::clone(&self.outcomes),
            submitted: None,
        }))
    }
}

struct MockSession {
    outcomes: Arc<HashMap<String, MockOutcome>>,
    submitted: Option<MockOutcome>,
}

#[async_trait]
impl Session for MockSession {
    async fn submit(&mut self, text: &str) -> Result<()> {
        if self.submitted.is_some() {
            return Err(EngineError::Protocol(
                "mock sessions accept a single submission".to_string(),
            ));
        }
        match self.outcomes.get(text) {
            None => Err(EngineError::Parse(format!("unrecognized constraint: {}", text))),
            Some(MockOutcome::ParseError(message)) => Err(EngineError::Parse(message.clone())),
            Some(outcome) => {
                self.submitted = Some(outcome.clone());
                Ok(())
            }
        }
    }

    async fn check(&mut self) -> Result<Verdict> {
        match &self.submitted {
            None => Err(EngineError::Protocol("check before submit".to_string())),
            Some(MockOutcome::Answer { verdict, .. }) => Ok(*verdict),
            Some(MockOutcome::SolverError(message)) => Err(EngineError::Solver(message.clone())),
            Some(MockOutcome::Hang) => std::future::pending().await,
            Some(MockOutcome::ParseError(message)) => Err(EngineError::Parse(message.clone())),
        }
    }

    async fn model(&mut self) -> Result<EngineModel> {
        match &self.submitted {
            Some(MockOutcome::Answer {
                verdict: Verdict::Sat,
                model: Some(text),
            }) => EngineModel::parse(text),
            _ => Err(EngineError::Solver("model is not available".to_string())),
        }
    }
}
