//! Request and response types of the solve contract

use crate::engine::Verdict;
use serde::{Deserialize, Serialize};

/// Solve request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRequest {
    /// Constraint program in the engine's native syntax (SMT-LIB 2)
    pub constraint: String,
}

impl ConstraintRequest {
    pub fn new(constraint: impl Into<String>) -> Self {
        Self {
            constraint: constraint.into(),
        }
    }
}

/// Portable value of a model entry
///
/// Serialized untagged, so `Opaque` reaches JSON as a plain string. Reading
/// JSON back yields `String` for any string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelValue {
    Int(i64),
    Bool(bool),
    Float(f64),
    String(String),
    /// Engine rendering of a value with no portable decoding
    Opaque(String),
}

/// One declared symbol and its value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    pub value: ModelValue,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, value: ModelValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Solve outcome; `model` is present exactly when the verdict is `sat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverResponse {
    check_result: Verdict,
    model: Option<Vec<ModelEntry>>,
}

impl SolverResponse {
    pub fn sat(model: Vec<ModelEntry>) -> Self {
        Self {
            check_result: Verdict::Sat,
            model: Some(model),
        }
    }

    pub fn unsat() -> Self {
        Self {
            check_result: Verdict::Unsat,
            model: None,
        }
    }

    pub fn unknown() -> Self {
        Self {
            check_result: Verdict::Unknown,
            model: None,
        }
    }

    pub fn check_result(&self) -> Verdict {
        self.check_result
    }

    pub fn model(&self) -> Option<&[ModelEntry]> {
        self.model.as_deref()
    }

    pub fn into_model(self) -> Option<Vec<ModelEntry>> {
        self.model
    }
}
