//! Error types for the terraform facade.

use thiserror::Error;

/// Result type alias for facade operations.
pub type TfResult<T> = Result<T, TfError>;

/// Errors that can occur while building, running or inspecting commands.
#[derive(Error, Debug)]
pub enum TfError {
    #[error("terraform command failed with exit code {exit_code}: {command}\n{stderr}")]
    CommandFailed {
        command: String,
        exit_code: i64,
        stderr: String,
    },

    #[error("Command was not run (dry-run): {0}")]
    DryRun(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Option error: {0}")]
    Option(#[from] tfcmd_core::OptionError),

    #[error("Plan error: {0}")]
    Plan(#[from] tfcmd_plan::PlanError),

    #[error("Runner error: {0}")]
    Runner(#[from] tfcmd_runner::RunnerError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
