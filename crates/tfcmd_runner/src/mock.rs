//! Mock executor for testing.
//!
//! Records every command it is asked to run and answers with scripted
//! responses, so callers can be tested without a terraform installation.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use parking_lot::RwLock;
use tfcmd_core::CommandLine;

use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::executor::{CommandExecutor, ExecutionResult};

/// Predefined response for one execution.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
            duration_ms: 100,
        }
    }

    pub fn failure(exit_code: i64, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            stderr: stderr.into(),
            duration_ms: 100,
        }
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration_ms = ms;
        self
    }
}

/// A recorded execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedCall {
    pub command: String,
    pub argv: Vec<String>,
    pub subcommands: Vec<String>,
    pub working_dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub dry_run: bool,
}

/// Mock executor for testing.
#[derive(Clone)]
pub struct MockExecutor {
    available: Arc<RwLock<bool>>,
    responses: Arc<RwLock<Vec<MockResponse>>>,
    response_index: Arc<AtomicUsize>,
    captured_calls: Arc<RwLock<Vec<CapturedCall>>>,
    simulate_failure: Arc<RwLock<Option<String>>>,
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutor {
    pub fn new() -> Self {
        Self {
            available: Arc::new(RwLock::new(true)),
            responses: Arc::new(RwLock::new(Vec::new())),
            response_index: Arc::new(AtomicUsize::new(0)),
            captured_calls: Arc::new(RwLock::new(Vec::new())),
            simulate_failure: Arc::new(RwLock::new(None)),
        }
    }

    /// Set whether binaries are reported as available.
    pub fn set_available(self, available: bool) -> Self {
        *self.available.write() = available;
        self
    }

    /// Add a response for the next execution.
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.write().push(response);
        self
    }

    /// Replace the scripted responses. They are replayed in a cycle.
    pub fn with_responses(self, responses: Vec<MockResponse>) -> Self {
        *self.responses.write() = responses;
        self
    }

    /// Fail every execution with `message` before a process would start.
    pub fn simulate_failure(self, message: impl Into<String>) -> Self {
        *self.simulate_failure.write() = Some(message.into());
        self
    }

    pub fn clear_calls(&self) {
        self.captured_calls.write().clear();
    }

    pub fn get_calls(&self) -> Vec<CapturedCall> {
        self.captured_calls.read().clone()
    }

    pub fn call_count(&self) -> usize {
        self.captured_calls.read().len()
    }

    /// The most recent call, if any.
    pub fn last_call(&self) -> Option<CapturedCall> {
        self.captured_calls.read().last().cloned()
    }

    /// Calls whose subcommand path is `subcommand` (e.g. `"workspace select"`).
    pub fn calls_for(&self, subcommand: &str) -> Vec<CapturedCall> {
        self.captured_calls
            .read()
            .iter()
            .filter(|c| c.subcommands.join(" ") == subcommand)
            .cloned()
            .collect()
    }

    pub fn was_called(&self, subcommand: &str) -> bool {
        !self.calls_for(subcommand).is_empty()
    }

    fn record_call(&self, command: &CommandLine, config: &RunConfig) {
        self.captured_calls.write().push(CapturedCall {
            command: command.to_string(),
            argv: command.to_argv(),
            subcommands: command.subcommands().to_vec(),
            working_dir: config.working_dir.clone(),
            env: config.env.clone(),
            dry_run: config.dry_run,
        });
    }

    fn next_response(&self) -> MockResponse {
        let responses = self.responses.read();
        if responses.is_empty() {
            return MockResponse::success("");
        }
        let index = self.response_index.fetch_add(1, Ordering::SeqCst);
        responses
            .get(index % responses.len())
            .cloned()
            .unwrap_or_else(|| MockResponse::success(""))
    }

    fn check_failure(&self) -> RunnerResult<()> {
        if let Some(msg) = self.simulate_failure.read().clone() {
            return Err(RunnerError::ExecutionFailed(msg));
        }
        Ok(())
    }
}

#[async_trait]
impl CommandExecutor for MockExecutor {
    async fn is_available(&self, _binary: &str) -> RunnerResult<bool> {
        Ok(*self.available.read())
    }

    async fn execute(&self, command: &CommandLine, config: &RunConfig) -> RunnerResult<ExecutionResult> {
        self.record_call(command, config);
        self.check_failure()?;

        if config.dry_run {
            return Ok(ExecutionResult::dry_run(command));
        }

        let response = self.next_response();
        let started_at = Utc::now();
        let finished_at = started_at + Duration::milliseconds(response.duration_ms as i64);

        let result = ExecutionResult {
            execution_id: format!("mock-{}", uuid::Uuid::new_v4()),
            command: command.to_string(),
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
            started_at,
            finished_at,
            duration_ms: response.duration_ms,
            dry_run: false,
        };

        if config.fail_fast && !result.success() {
            return Err(RunnerError::NonZeroExit {
                exit_code: result.exit_code,
                message: result.error_summary().to_string(),
            });
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(subcommand: &str) -> CommandLine {
        CommandLine::builder("terraform").subcommands(subcommand).build()
    }

    #[tokio::test]
    async fn test_default_response_is_empty_success() {
        let mock = MockExecutor::new();
        let result = mock.execute(&line("init"), &RunConfig::default()).await.unwrap();
        assert!(result.success());
        assert!(result.stdout.is_empty());
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_responses_cycle() {
        let mock = MockExecutor::new().with_responses(vec![
            MockResponse::success("first"),
            MockResponse::failure(1, "second"),
        ]);
        let config = RunConfig::default();

        assert_eq!(mock.execute(&line("plan"), &config).await.unwrap().stdout, "first");
        assert_eq!(mock.execute(&line("plan"), &config).await.unwrap().exit_code, 1);
        assert_eq!(mock.execute(&line("plan"), &config).await.unwrap().stdout, "first");
    }

    #[tokio::test]
    async fn test_simulated_failure_still_records() {
        let mock = MockExecutor::new().simulate_failure("no terraform");
        let err = mock.execute(&line("init"), &RunConfig::default()).await.unwrap_err();
        assert!(matches!(err, RunnerError::ExecutionFailed(ref m) if m == "no terraform"));
        assert!(mock.was_called("init"));
    }

    #[tokio::test]
    async fn test_fail_fast_and_availability() {
        let mock = MockExecutor::new()
            .add_response(MockResponse::failure(2, "Error: locked\n"))
            .set_available(false);

        let err = mock
            .execute(&line("apply"), &RunConfig::new().fail_fast(true))
            .await
            .unwrap_err();
        assert!(matches!(err, RunnerError::NonZeroExit { exit_code: 2, ref message } if message == "Error: locked"));
        assert!(!mock.is_available("terraform").await.unwrap());
    }
}
