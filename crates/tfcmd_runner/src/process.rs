//! Executor that spawns the command line as a local process.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tfcmd_core::CommandLine;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, error, info, warn};

use crate::config::RunConfig;
use crate::error::{RunnerError, RunnerResult};
use crate::executor::{CommandExecutor, ExecutionResult};

/// One line of process output.
#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub stream: LogStream,
    pub message: String,
}

/// Log stream type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStream {
    Stdout,
    Stderr,
}

impl std::fmt::Display for LogStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdout => write!(f, "stdout"),
            Self::Stderr => write!(f, "stderr"),
        }
    }
}

/// Log handler callback type.
pub type LogHandler = Arc<dyn Fn(LogLine) + Send + Sync>;

/// Runs command lines as local processes with `tokio::process`.
///
/// Output is read line by line so that long-running commands can be followed
/// live when `stream_logs` is set. Streamed lines go to the log handler if one
/// is installed, otherwise to the console.
#[derive(Clone)]
pub struct ProcessExecutor {
    ci_mode: bool,
    log_handler: Option<LogHandler>,
}

impl Default for ProcessExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self {
            ci_mode: std::env::var("CI").is_ok(),
            log_handler: None,
        }
    }

    /// Prefix streamed lines with timestamps and stream names.
    pub fn ci_mode(mut self, enabled: bool) -> Self {
        self.ci_mode = enabled;
        self
    }

    /// Send streamed lines to `handler` instead of the console.
    pub fn with_log_handler(mut self, handler: LogHandler) -> Self {
        self.log_handler = Some(handler);
        self
    }

    /// Where streamed lines go: exactly one sink per line.
    fn line_sink(&self) -> LogHandler {
        match &self.log_handler {
            Some(handler) => handler.clone(),
            None => console_handler(self.ci_mode),
        }
    }

    async fn run_process(&self, argv: &[String], config: &RunConfig) -> RunnerResult<(i64, String, String)> {
        let (binary, args) = argv
            .split_first()
            .ok_or_else(|| RunnerError::ExecutionFailed("Empty command line".to_string()))?;

        let mut cmd = Command::new(binary);
        cmd.args(args)
            .envs(&config.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &config.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|e| RunnerError::SpawnFailed {
            binary: binary.clone(),
            reason: e.to_string(),
        })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stdout was not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| RunnerError::ExecutionFailed("stderr was not captured".to_string()))?;

        let sink = config.stream_logs.then(|| self.line_sink());
        let stdout_task = tokio::spawn(read_lines(stdout, LogStream::Stdout, sink.clone()));
        let stderr_task = tokio::spawn(read_lines(stderr, LogStream::Stderr, sink));
        let readers = [stdout_task.abort_handle(), stderr_task.abort_handle()];

        // The wait and both pipe reads share one deadline: a grandchild that
        // inherits a pipe keeps it open after the child itself has exited.
        let completion = async {
            let status = child
                .wait()
                .await
                .map_err(|e| RunnerError::ExecutionFailed(format!("Failed to wait for process: {}", e)))?;
            let stdout = stdout_task.await.unwrap_or_default();
            let stderr = stderr_task.await.unwrap_or_default();
            Ok::<_, RunnerError>((status, stdout, stderr))
        };

        let outcome = if config.timeout_seconds == 0 {
            completion.await
        } else {
            match tokio::time::timeout(Duration::from_secs(config.timeout_seconds), completion).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    warn!("Command timed out after {}s", config.timeout_seconds);
                    for reader in &readers {
                        reader.abort();
                    }
                    let _ = child.kill().await;
                    return Err(RunnerError::Timeout(config.timeout_seconds));
                }
            }
        };

        let (status, stdout, stderr) = outcome?;
        let exit_code = status.code().unwrap_or(-1) as i64;
        Ok((exit_code, stdout, stderr))
    }
}

fn console_handler(ci_mode: bool) -> LogHandler {
    Arc::new(move |line: LogLine| {
        if ci_mode {
            println!(
                "[{}] [{}] {}",
                line.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
                line.stream,
                line.message
            );
        } else {
            match line.stream {
                LogStream::Stdout => println!("{}", line.message),
                LogStream::Stderr => eprintln!("{}", line.message),
            }
        }
    })
}

async fn read_lines<R>(source: R, stream: LogStream, sink: Option<LogHandler>) -> String
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(source).lines();
    let mut output = String::new();
    while let Ok(Some(line)) = lines.next_line().await {
        output.push_str(&line);
        output.push('\n');
        if let Some(sink) = &sink {
            sink(LogLine {
                timestamp: Utc::now(),
                stream,
                message: line,
            });
        }
    }
    output
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn is_available(&self, binary: &str) -> RunnerResult<bool> {
        let status = Command::new(binary)
            .arg("version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await;
        Ok(status.map(|s| s.success()).unwrap_or(false))
    }

    async fn execute(&self, command: &CommandLine, config: &RunConfig) -> RunnerResult<ExecutionResult> {
        let rendered = command.to_string();
        info!("Running: {}", rendered);

        if config.dry_run {
            info!("[DRY-RUN] Would execute: {}", rendered);
            return Ok(ExecutionResult::dry_run(command));
        }

        if let Some(dir) = &config.working_dir {
            if !dir.is_dir() {
                return Err(RunnerError::WorkingDirNotFound(dir.clone()));
            }
        }

        let argv = command.to_argv();
        debug!("Argv: {:?}", argv);

        let started_at = Utc::now();
        let (exit_code, stdout, stderr) = self.run_process(&argv, config).await?;
        let finished_at = Utc::now();
        let duration_ms = (finished_at - started_at).num_milliseconds().max(0) as u64;

        let result = ExecutionResult {
            execution_id: uuid::Uuid::new_v4().to_string(),
            command: rendered,
            exit_code,
            stdout,
            stderr,
            started_at,
            finished_at,
            duration_ms,
            dry_run: false,
        };

        if result.success() {
            info!("Command completed successfully in {}ms", duration_ms);
        } else {
            error!(
                "Command failed with exit code {} after {}ms",
                exit_code, duration_ms
            );
            if config.fail_fast {
                return Err(RunnerError::NonZeroExit {
                    exit_code,
                    message: result.error_summary().to_string(),
                });
            }
        }

        Ok(result)
    }
}
