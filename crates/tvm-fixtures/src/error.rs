//! Error types for the fixture runner

use thiserror::Error;
use tvm_executor::ExecutionError;

/// Fixture error type
#[derive(Error, Debug)]
pub enum FixtureError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A transaction the fixture expects to run was rejected
    #[error("transaction rejected: {0}")]
    Rejected(#[from] ExecutionError),

    /// Assertion failed
    #[error("Assertion failed: {0}")]
    Assertion(String),
}

/// Fixture result type
pub type FixtureResult<T> = Result<T, FixtureError>;
