//! # tfcmd_runner
//!
//! Execution of assembled terraform command lines.
//!
//! # Features
//!
//! - **Process Executor**: spawns the command with `std::process`, streaming
//!   output line by line to an optional handler
//! - **Timeouts and Dry-Run**: per-execution [`RunConfig`]
//! - **CI Integration**: timestamped log lines when `CI` is set
//! - **Mock Executor**: records calls and replays scripted responses
//!
//! # Example
//!
//! ```rust,no_run
//! use tfcmd_core::CommandLine;
//! use tfcmd_runner::{CommandExecutor, ProcessExecutor, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let line = CommandLine::builder("terraform")
//!         .subcommands("validate")
//!         .build();
//!
//!     let result = ProcessExecutor::new()
//!         .execute(&line, &RunConfig::new().working_dir("infra").timeout(120))
//!         .await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod mock;
pub mod process;

pub use config::RunConfig;
pub use error::{RunnerError, RunnerResult};
pub use executor::{CommandExecutor, ExecutionResult};
pub use mock::{CapturedCall, MockExecutor, MockResponse};
pub use process::{LogHandler, LogLine, LogStream, ProcessExecutor};
