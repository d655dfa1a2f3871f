//! Run command - Build and execute a terraform command.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::{info, warn};

use tfcmd::{Terraform, TerraformConfig, TerraformOutput};

use super::{load_config, Cli, CommandArgs};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub command: CommandArgs,

    /// Print the command instead of running it
    #[arg(long)]
    pub dry_run: bool,

    /// Directory to run terraform in
    #[arg(short = 'C', long)]
    pub working_dir: Option<PathBuf>,

    /// Timeout in seconds (0 = no timeout)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Echo terraform output while it runs
    #[arg(long)]
    pub stream: bool,
}

pub async fn execute(cli: &Cli, args: &RunArgs) -> Result<()> {
    let config = apply_overrides(load_config(cli)?, args);
    // With stream_logs set the process executor echoes lines as they arrive.
    let stream = config.stream_logs;
    let tf = Terraform::new(config)?;

    let name = args.command.command_name();
    info!("Running terraform {}", name);
    let output = tf.run(&name, &args.command.option_values()?).await?;

    report(&output, stream);
    Ok(())
}

fn apply_overrides(mut config: TerraformConfig, args: &RunArgs) -> TerraformConfig {
    if let Some(binary) = &args.command.binary {
        config = config.with_binary(binary.clone());
    }
    if let Some(dir) = &args.working_dir {
        config = config.with_working_dir(dir.clone());
    }
    if let Some(timeout) = args.timeout {
        config = config.with_timeout(timeout);
    }
    if args.dry_run {
        config = config.with_dry_run(true);
    }
    if args.stream {
        config = config.with_stream_logs(true);
    }
    config
}

fn report(output: &TerraformOutput, streamed: bool) {
    if output.dry_run {
        println!("Would run: {}", output.command);
        return;
    }

    if needs_replay(output, streamed) {
        if !output.stdout.is_empty() {
            print!("{}", output.stdout);
        }
        if !output.stderr.is_empty() {
            eprint!("{}", output.stderr);
        }
    }

    if output.has_changes() {
        warn!("Plan has pending changes");
    }
    info!("Finished in {} ms", output.duration_ms);
}

/// Output is printed after the run only if it was not already streamed.
fn needs_replay(output: &TerraformOutput, streamed: bool) -> bool {
    !output.dry_run && !streamed
}
