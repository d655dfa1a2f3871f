//! tfcmd CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Option error
//! - 4: Plan error
//! - 5: Terraform error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tfcmd::TfError;
use tfcmd_core::OptionError;
use tfcmd_plan::PlanError;
use tfcmd_runner::RunnerError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const OPTION_ERROR: u8 = 3;
    pub const PLAN_ERROR: u8 = 4;
    pub const TERRAFORM_ERROR: u8 = 5;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose {
        "tfcmd=debug"
    } else if cli.quiet {
        "tfcmd=warn"
    } else {
        "tfcmd=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logging may already be initialized; carry on either way.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match &cli.command {
        Commands::Commands(args) => commands::list::execute(args),
        Commands::Render(args) => commands::render::execute(&cli, args),
        Commands::Run(args) => commands::run::execute(&cli, args).await,
        Commands::PlanSummary(args) => commands::plan_summary::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<TfError>() {
            return match err {
                TfError::Option(_) => ExitCodes::OPTION_ERROR,
                TfError::Plan(_) => ExitCodes::PLAN_ERROR,
                TfError::CommandFailed { .. } | TfError::Runner(_) => ExitCodes::TERRAFORM_ERROR,
                TfError::Config(_) | TfError::Yaml(_) => ExitCodes::INVALID_ARGS,
                _ => ExitCodes::GENERAL_ERROR,
            };
        }
        if cause.is::<OptionError>() {
            return ExitCodes::OPTION_ERROR;
        }
        if cause.is::<PlanError>() {
            return ExitCodes::PLAN_ERROR;
        }
        if cause.is::<RunnerError>() {
            return ExitCodes::TERRAFORM_ERROR;
        }
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("argument") || msg.contains("not found") || msg.contains("values") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}
