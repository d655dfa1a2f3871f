//! Error types for the runner module.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for runner operations.
pub type RunnerResult<T> = Result<T, RunnerError>;

/// Errors that can occur while executing a command line.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to spawn {binary}: {reason}")]
    SpawnFailed { binary: String, reason: String },

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Command exited with code {exit_code}: {message}")]
    NonZeroExit { exit_code: i64, message: String },

    #[error("Command timed out after {0} seconds")]
    Timeout(u64),

    #[error("Working directory not found: {0}")]
    WorkingDirNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
