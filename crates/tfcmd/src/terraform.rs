//! Terraform client: builds command lines from the catalog and runs them.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use tfcmd_core::{catalog, CommandLine, Definitions, OptionValues, Switch};
use tfcmd_plan::Plan;
use tfcmd_runner::{CommandExecutor, ExecutionResult, ProcessExecutor};

use crate::config::TerraformConfig;
use crate::error::{TfError, TfResult};

/// `plan -detailed-exitcode` exits with this code when there are changes.
const CHANGES_PRESENT_EXIT_CODE: i64 = 2;

/// Result of a terraform command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerraformOutput {
    pub command: String,
    pub exit_code: i64,
    pub stdout: String,
    pub stderr: String,
    pub duration_ms: u64,
    pub dry_run: bool,
}

impl TerraformOutput {
    /// Whether a `-detailed-exitcode` plan reported pending changes.
    pub fn has_changes(&self) -> bool {
        self.exit_code == CHANGES_PRESENT_EXIT_CODE
    }

    pub fn combined_output(&self) -> String {
        if self.stdout.is_empty() {
            self.stderr.clone()
        } else if self.stderr.is_empty() {
            self.stdout.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

impl From<ExecutionResult> for TerraformOutput {
    fn from(result: ExecutionResult) -> Self {
        Self {
            command: result.command,
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
            duration_ms: result.duration_ms,
            dry_run: result.dry_run,
        }
    }
}

/// Terraform client.
///
/// Values are looked up by option key: `auto_approve` for `-auto-approve`,
/// `vars`/`var` for `-var`, `targets`/`target` for `-target`. Positional
/// arguments use the keys listed by the catalog (e.g. `plan` for `apply`).
pub struct Terraform {
    config: TerraformConfig,
    definitions: Definitions,
    executor: Arc<dyn CommandExecutor>,
}

impl Terraform {
    /// Create a client that runs terraform as a local process.
    pub fn new(config: TerraformConfig) -> TfResult<Self> {
        let definitions = config.definitions_table()?;
        debug!(
            "Using {} with {} option definition(s)",
            config.binary,
            definitions.len()
        );
        Ok(Self {
            config,
            definitions,
            executor: Arc::new(ProcessExecutor::new()),
        })
    }

    /// Run commands through `executor` instead.
    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    pub fn config(&self) -> &TerraformConfig {
        &self.config
    }

    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Whether the configured binary can be started.
    pub async fn is_available(&self) -> TfResult<bool> {
        Ok(self.executor.is_available(&self.config.binary).await?)
    }

    /// Assemble the command line for `name` without running it.
    pub fn command(&self, name: &str, values: &OptionValues) -> TfResult<CommandLine> {
        let spec = catalog::lookup(name)?;
        Ok(spec.build(&self.config.binary, values, &self.definitions)?)
    }

    /// Build and run `name`. A non-zero exit code is an error, except for the
    /// changes-present code of a `-detailed-exitcode` run.
    pub async fn run(&self, name: &str, values: &OptionValues) -> TfResult<TerraformOutput> {
        let command = self.command(name, values)?;
        let result = self.executor.execute(&command, &self.config.run_config()).await?;

        let detailed = command
            .options()
            .iter()
            .any(|option| option.switch == Switch::from("-detailed-exitcode"));
        let accepted = result.success()
            || (detailed && result.exit_code == CHANGES_PRESENT_EXIT_CODE);

        if !accepted {
            return Err(TfError::CommandFailed {
                command: result.command,
                exit_code: result.exit_code,
                stderr: result.stderr,
            });
        }

        Ok(result.into())
    }

    /// Run terraform init.
    pub async fn init(&self, values: &OptionValues) -> TfResult<TerraformOutput> {
        info!("Running terraform init in {:?}", self.working_dir());
        self.run("init", values).await
    }

    /// Run terraform validate.
    pub async fn validate(&self, values: &OptionValues) -> TfResult<TerraformOutput> {
        info!("Running terraform validate in {:?}", self.working_dir());
        self.run("validate", values).await
    }

    /// Run terraform plan.
    pub async fn plan(&self, values: &OptionValues) -> TfResult<TerraformOutput> {
        info!("Running terraform plan in {:?}", self.working_dir());
        self.run("plan", values).await
    }

    /// Run terraform apply.
    pub async fn apply(&self, values: &OptionValues) -> TfResult<TerraformOutput> {
        info!("Running terraform apply in {:?}", self.working_dir());
        self.run("apply", values).await
    }

    /// Run terraform destroy.
    pub async fn destroy(&self, values: &OptionValues) -> TfResult<TerraformOutput> {
        info!("Running terraform destroy in {:?}", self.working_dir());
        self.run("destroy", values).await
    }

    /// Run terraform output.
    pub async fn output(&self, values: &OptionValues) -> TfResult<TerraformOutput> {
        self.run("output", values).await
    }

    /// All root module outputs as JSON, keyed by output name.
    pub async fn outputs(&self) -> TfResult<Value> {
        let output = self.output(&OptionValues::new().set("json", true)).await?;
        self.require_ran(&output)?;
        Ok(serde_json::from_str(&output.stdout)?)
    }

    /// Run `show -json <plan_file>` and parse the result.
    pub async fn show_plan(&self, plan_file: &Path) -> TfResult<Plan> {
        info!("Reading plan {:?}", plan_file);
        let values = OptionValues::new()
            .set("json", true)
            .set("no_color", true)
            .set("path", plan_file.to_string_lossy().into_owned());
        let output = self.run("show", &values).await?;
        self.require_ran(&output)?;
        Ok(Plan::parse(&output.stdout)?)
    }

    fn working_dir(&self) -> &Path {
        self.config
            .working_dir
            .as_deref()
            .unwrap_or_else(|| Path::new("."))
    }

    fn require_ran(&self, output: &TerraformOutput) -> TfResult<()> {
        if output.dry_run {
            return Err(TfError::DryRun(output.command.clone()));
        }
        Ok(())
    }
}
