//! Error types for the client

use crate::segment::{ConditionOperator, DataType};
use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`SolverClient`](crate::SolverClient)
#[derive(Error, Debug)]
pub enum ClientError {
    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// Transport failure (connect, timeout, body read)
    #[error("Request to solver failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("Solver returned error status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The response body was not a solver response
    #[error("Failed to parse solver response: {0}")]
    Decode(String),

    /// Segments could not be turned into a constraint
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// Errors raised while composing a constraint from segments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    /// Attribute name that cannot be written as an SMT-LIB symbol
    #[error("invalid attribute name '{0}'")]
    InvalidAttributeName(String),

    /// The same attribute appears with two data types
    #[error("attribute '{name}' is used as both {first} and {second}")]
    ConflictingDataType {
        name: String,
        first: DataType,
        second: DataType,
    },

    /// A value that does not parse as the attribute's data type
    #[error("invalid {data_type} value '{value}' for attribute '{attribute}'")]
    InvalidValue {
        attribute: String,
        data_type: DataType,
        value: String,
    },

    /// An operator that has no meaning for the attribute's data type
    #[error("operator {operator} is not supported for {data_type} attribute '{attribute}'")]
    UnsupportedOperator {
        attribute: String,
        operator: ConditionOperator,
        data_type: DataType,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: 400,
            detail: "Error processing constraint: unknown constant y".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Solver returned error status 400: Error processing constraint: unknown constant y"
        );
    }

    #[test]
    fn test_compose_error_is_transparent() {
        let err: ClientError = ComposeError::InvalidAttributeName("a|b".to_string()).into();
        assert_eq!(err.to_string(), "invalid attribute name 'a|b'");
    }

    #[test]
    fn test_unsupported_operator_display() {
        let err = ComposeError::UnsupportedOperator {
            attribute: "country".to_string(),
            operator: ConditionOperator::GreaterThan,
            data_type: DataType::String,
        };
        assert_eq!(
            err.to_string(),
            "operator greater_than is not supported for string attribute 'country'"
        );
    }
}
