//! Client for the smtgate solver API
//!
//! [`SolverClient`] posts constraints to `POST /solve`. The [`segment`]
//! module turns audience segments into one SMT-LIB constraint so that
//! [`SolverClient::check_segments_conflict`] can ask whether a single user
//! could match all of them at once.

pub mod client;
pub mod error;
pub mod segment;

pub use client::{ConflictReport, SolverClient};
pub use error::{ClientError, ClientResult, ComposeError};
pub use segment::{
    compose_constraint, Attribute, Condition, ConditionOperator, DataType, Segment, SegmentRule,
};
pub use smtgate_core::{ModelEntry, ModelValue, SolverResponse, Verdict};
