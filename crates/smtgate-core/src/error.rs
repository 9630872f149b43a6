//! Error types for smtgate core

use thiserror::Error;

/// Failure raised by a solving engine while opening a session, submitting
/// text, checking, or extracting a model
#[derive(Error, Debug)]
pub enum EngineError {
    /// The submitted text was rejected as malformed
    #[error("{0}")]
    Parse(String),

    /// The solver reported an error for a well-formed command
    #[error("solver error: {0}")]
    Solver(String),

    /// The solver answered with something we could not interpret
    #[error("unexpected solver output: {0}")]
    Protocol(String),

    /// The solver process went away mid-conversation
    #[error("solver process exited {0}")]
    Exited(String),

    /// The solver process could not be started
    #[error("failed to start solver: {0}")]
    Spawn(#[source] std::io::Error),

    /// Reading from or writing to the solver failed
    #[error("solver I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Short label used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::Parse(_) => "parse",
            EngineError::Solver(_) => "solver",
            EngineError::Protocol(_) => "protocol",
            EngineError::Exited(_) => "exited",
            EngineError::Spawn(_) => "spawn",
            EngineError::Io(_) => "io",
        }
    }
}

/// Failure of a whole solve request
#[derive(Error, Debug)]
pub enum SolveError {
    #[error("constraint must not be empty")]
    EmptyConstraint,

    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl SolveError {
    /// True when no session could be opened at all, as opposed to the
    /// constraint being at fault
    pub fn is_unavailable(&self) -> bool {
        matches!(self, SolveError::Engine(EngineError::Spawn(_)))
    }

    /// Short label used in structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::EmptyConstraint => "empty",
            SolveError::Engine(err) => err.kind(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
