//! Error types for option resolution and command-line assembly.

use thiserror::Error;

/// Result type alias for option operations.
pub type OptionResult<T> = Result<T, OptionError>;

/// Errors raised while resolving options into a command line.
///
/// All of these are caller misuse and surface before any process is spawned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("Option definition is missing its name")]
    MissingName,

    #[error("Multiple values provided for '{switch}' (with keys {keys:?}) and option not repeatable: {values:?}")]
    MultipleValues {
        switch: String,
        keys: Vec<String>,
        values: Vec<String>,
    },

    #[error("Invalid value for '{switch}': {reason}")]
    InvalidValue { switch: String, reason: String },

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
