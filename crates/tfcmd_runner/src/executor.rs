//! Command executor trait and types.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tfcmd_core::CommandLine;

use crate::config::RunConfig;
use crate::error::RunnerResult;

/// Result of executing a command line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Unique id of this execution
    pub execution_id: String,
    /// The command as a shell string
    pub command: String,
    /// Exit code of the process
    pub exit_code: i64,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Execution start time
    pub started_at: DateTime<Utc>,
    /// Execution end time
    pub finished_at: DateTime<Utc>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Whether the command was only reported, not run
    pub dry_run: bool,
}

impl ExecutionResult {
    /// Result for a command that was not run.
    pub fn dry_run(command: &CommandLine) -> Self {
        let now = Utc::now();
        let rendered = command.to_string();
        Self {
            execution_id: "dry-run".to_string(),
            stdout: format!("[DRY-RUN] Command: {}", rendered),
            command: rendered,
            exit_code: 0,
            stderr: String::new(),
            started_at: now,
            finished_at: now,
            duration_ms: 0,
            dry_run: true,
        }
    }

    /// Check if execution was successful (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Get combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }

    /// Last non-empty stderr line, for short error messages.
    pub fn error_summary(&self) -> &str {
        self.stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("Unknown error")
    }
}

/// Something that can run an assembled command line.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Check whether `binary` can be started.
    async fn is_available(&self, binary: &str) -> RunnerResult<bool>;

    /// Run `command` with the given settings and capture its output.
    async fn execute(&self, command: &CommandLine, config: &RunConfig) -> RunnerResult<ExecutionResult>;
}
