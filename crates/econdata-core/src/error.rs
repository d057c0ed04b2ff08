//! Error types for data operations.
//!
//! This module defines [`DataError`] which covers every failure a backend call can
//! surface: local validation, partial batch failures and transport failures.

use thiserror::Error;

use crate::{entity_error::GetEntitiesError, problem::ProblemDetails};

/// Errors that can occur during data operations.
#[derive(Error, Debug)]
pub enum DataError {
    /// Network-related errors (connection failures, timeouts, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered with a non-success status.
    #[error("{0}")]
    Problem(Box<ProblemDetails>),

    /// One or more entities of a batch request could not be retrieved.
    #[error(transparent)]
    Entities(#[from] GetEntitiesError),

    /// Error parsing data from a backend.
    #[error("Parse error: {0}")]
    Parse(String),

    /// An invalid parameter was provided. Raised before any backend call.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The local backend reported a failure.
    #[error("Backend error: {0}")]
    Backend(String),

    /// The requested feature is not supported by this backend.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl DataError {
    /// Returns the problem details if this error came from a non-success HTTP response.
    #[must_use]
    pub fn problem_details(&self) -> Option<&ProblemDetails> {
        match self {
            Self::Problem(problem) => Some(problem),
            _ => None,
        }
    }
}

impl From<ProblemDetails> for DataError {
    fn from(problem: ProblemDetails) -> Self {
        Self::Problem(Box::new(problem))
    }
}

impl From<serde_json::Error> for DataError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

/// Result type alias using [`DataError`].
pub type Result<T> = std::result::Result<T, DataError>;
