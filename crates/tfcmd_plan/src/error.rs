//! Error types for plan parsing.

use thiserror::Error;

/// Result type alias for plan operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Errors that can occur while reading a plan.
///
/// Shape problems inside a well-formed plan are tolerated and defaulted;
/// only undecodable input is an error.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid plan JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Plan must be a JSON object, got {0}")]
    NotAnObject(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
