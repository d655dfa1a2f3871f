//! CLI command definitions.
//!
//! Each subcommand either inspects the command catalog, renders a command
//! line, runs terraform, or reads a JSON plan.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::debug;

use tfcmd::{OptionValues, TerraformConfig};

pub mod list;
pub mod plan_summary;
pub mod render;
pub mod run;

/// tfcmd - build and run terraform command lines
#[derive(Parser)]
#[command(name = "tfcmd")]
#[command(version, about = "tfcmd - build and run terraform command lines")]
#[command(long_about = r#"
tfcmd assembles terraform command lines from named option values, runs them,
and summarises JSON plans.

COMMANDS:
  commands      → List the terraform commands tfcmd knows and their switches
  render        → Print the command line a set of values produces
  run           → Build and execute a terraform command
  plan-summary  → Classify the resource changes in a JSON plan

VALUES:
  Option values are keyed by switch: -auto-approve is auto_approve, and
  repeatable switches also accept the plural key (targets, var_files, vars).

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Option error
  4 - Plan error
  5 - Terraform error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true, env = "TFCMD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List known terraform commands
    Commands(list::ListArgs),

    /// Print the assembled command line without running it
    Render(render::RenderArgs),

    /// Build and run a terraform command
    Run(run::RunArgs),

    /// Summarise the changes in a JSON plan
    #[command(name = "plan-summary")]
    PlanSummary(plan_summary::PlanSummaryArgs),
}

/// Command name and option values shared by `render` and `run`.
#[derive(Args, Debug, Clone)]
pub struct CommandArgs {
    /// Terraform command, e.g. "apply" or "workspace select"
    #[arg(num_args = 1.., required = true)]
    pub command: Vec<String>,

    /// Option values as a JSON object
    #[arg(long)]
    pub values: Option<String>,

    /// File holding option values (JSON or YAML)
    #[arg(long)]
    pub values_file: Option<PathBuf>,

    /// Single option value, KEY=VALUE (repeatable)
    #[arg(long = "set", value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// Terraform binary to use
    #[arg(long)]
    pub binary: Option<String>,
}

impl CommandArgs {
    pub fn command_name(&self) -> String {
        self.command.join(" ")
    }

    /// Collect values: the file first, then `--values`, then `--set` pairs.
    /// Later sources replace earlier keys.
    pub fn option_values(&self) -> Result<OptionValues> {
        let mut values = OptionValues::new();

        if let Some(path) = &self.values_file {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read values file {:?}", path))?;
            merge(&mut values, parse_values_document(&content, path)?)?;
        }

        if let Some(json) = &self.values {
            let document: Value =
                serde_json::from_str(json).context("--values must be valid JSON")?;
            merge(&mut values, document)?;
        }

        for pair in &self.set {
            let (key, value) = pair
                .split_once('=')
                .with_context(|| format!("--set argument '{}' is not KEY=VALUE", pair))?;
            values.insert(key.trim(), value);
        }

        debug!("Collected {} option value(s)", values.keys().count());
        Ok(values)
    }
}

fn parse_values_document(content: &str, path: &Path) -> Result<Value> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(content).with_context(|| format!("Invalid JSON in {:?}", path))
    } else {
        serde_yaml::from_str(content).with_context(|| format!("Invalid YAML in {:?}", path))
    }
}

fn merge(values: &mut OptionValues, document: Value) -> Result<()> {
    match document {
        Value::Object(map) => {
            for (key, value) in map {
                values.insert(key, value);
            }
            Ok(())
        }
        other => anyhow::bail!("Option values must be an object, got {}", other),
    }
}

/// Load configuration from `--config` (or defaults) with environment overrides.
pub fn load_config(cli: &Cli) -> Result<TerraformConfig> {
    let config = match &cli.config {
        Some(path) => TerraformConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {:?}", path))?,
        None => TerraformConfig::default(),
    };
    Ok(config.with_env_overrides()?)
}
