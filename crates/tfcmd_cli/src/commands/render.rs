//! Render command - Print an assembled command line.

use anyhow::Result;
use clap::Args;
use tracing::info;

use tfcmd::{CommandLine, Terraform, TerraformConfig};

use super::{load_config, Cli, CommandArgs};

#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub command: CommandArgs,

    /// Print the argument vector as a JSON array instead of a shell string
    #[arg(long)]
    pub argv: bool,
}

pub fn execute(cli: &Cli, args: &RenderArgs) -> Result<()> {
    let config = load_config(cli)?;
    let line = render(config, &args.command)?;
    info!("Rendered '{}'", args.command.command_name());

    if args.argv {
        println!("{}", serde_json::to_string(&line.to_argv())?);
    } else {
        println!("{}", line);
    }
    Ok(())
}

/// Build the command line described by `args` under `config`.
pub fn render(mut config: TerraformConfig, args: &CommandArgs) -> Result<CommandLine> {
    if let Some(binary) = &args.binary {
        config = config.with_binary(binary.clone());
    }
    let tf = Terraform::new(config)?;
    Ok(tf.command(&args.command_name(), &args.option_values()?)?)
}
