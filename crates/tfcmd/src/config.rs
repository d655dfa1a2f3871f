//! Configuration for the terraform facade.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tfcmd_core::{Definition, DefinitionSpec, Definitions};
use tfcmd_runner::RunConfig;
use tracing::debug;

use crate::error::{TfError, TfResult};

pub const DEFAULT_BINARY: &str = "terraform";

pub const ENV_BINARY: &str = "TFCMD_BINARY";
pub const ENV_WORKING_DIR: &str = "TFCMD_WORKING_DIR";
pub const ENV_TIMEOUT: &str = "TFCMD_TIMEOUT";

/// How terraform is located and run.
///
/// ```yaml
/// binary: /usr/local/bin/terraform
/// working_dir: infra/prod
/// timeout_seconds: 900
/// env:
///   TF_IN_AUTOMATION: "1"
/// definitions:
///   - name: -test-directory
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerraformConfig {
    /// Path or name of the terraform binary
    pub binary: String,
    /// Directory commands run in
    pub working_dir: Option<PathBuf>,
    /// Extra environment variables for every command
    pub env: BTreeMap<String, String>,
    /// Timeout in seconds (0 = no timeout)
    pub timeout_seconds: u64,
    /// Echo command output while it runs
    pub stream_logs: bool,
    /// Report commands without running them
    pub dry_run: bool,
    /// Option definitions layered over the built-in table
    pub definitions: Vec<DefinitionSpec>,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            working_dir: None,
            env: BTreeMap::new(),
            timeout_seconds: 0,
            stream_logs: false,
            dry_run: false,
            definitions: Vec::new(),
        }
    }
}

impl TerraformConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> TfResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> TfResult<Self> {
        serde_yaml::from_str(yaml).map_err(TfError::from)
    }

    /// Serialize the configuration to YAML.
    pub fn to_yaml(&self) -> TfResult<String> {
        serde_yaml::to_string(self).map_err(TfError::from)
    }

    /// Apply `TFCMD_BINARY`, `TFCMD_WORKING_DIR` and `TFCMD_TIMEOUT` from the
    /// process environment.
    pub fn with_env_overrides(self) -> TfResult<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> TfResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup(ENV_BINARY).filter(|v| !v.is_empty()) {
            debug!("{} overrides binary: {}", ENV_BINARY, binary);
            self.binary = binary;
        }
        if let Some(dir) = lookup(ENV_WORKING_DIR).filter(|v| !v.is_empty()) {
            debug!("{} overrides working directory: {}", ENV_WORKING_DIR, dir);
            self.working_dir = Some(PathBuf::from(dir));
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT).filter(|v| !v.is_empty()) {
            self.timeout_seconds = timeout.trim().parse().map_err(|_| {
                TfError::Config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT, timeout))
            })?;
        }
        Ok(self)
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn with_stream_logs(mut self, enabled: bool) -> Self {
        self.stream_logs = enabled;
        self
    }

    pub fn with_dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn with_definition(mut self, spec: DefinitionSpec) -> Self {
        self.definitions.push(spec);
        self
    }

    /// The built-in definition table with this configuration's definitions
    /// layered on top.
    pub fn definitions_table(&self) -> TfResult<Definitions> {
        let overrides = self
            .definitions
            .iter()
            .cloned()
            .map(Definition::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Definitions::builtin().with_overrides(overrides))
    }

    /// Execution settings derived from this configuration.
    pub fn run_config(&self) -> RunConfig {
        let mut run_config = RunConfig::new()
            .timeout(self.timeout_seconds)
            .envs(self.env.clone())
            .stream_logs(self.stream_logs)
            .dry_run(self.dry_run);
        if let Some(dir) = &self.working_dir {
            run_config = run_config.working_dir(dir);
        }
        run_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tfcmd_core::{OptionError, Switch};

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TerraformConfig::default();
        assert_eq!(config.binary, "terraform");
        assert_eq!(config.timeout_seconds, 0);
        assert!(config.definitions.is_empty());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = TerraformConfig::from_yaml("working_dir: infra\ndry_run: true\n").unwrap();
        assert_eq!(config.binary, "terraform");
        assert_eq!(config.working_dir, Some(PathBuf::from("infra")));
        assert!(config.dry_run);
    }

    #[test]
    fn test_env_overrides() {
        let config = TerraformConfig::new()
            .with_binary("tofu")
            .with_overrides_from(lookup(&[
                (ENV_BINARY, "/opt/terraform"),
                (ENV_WORKING_DIR, "stacks/prod"),
                (ENV_TIMEOUT, "600"),
            ]))
            .unwrap();

        assert_eq!(config.binary, "/opt/terraform");
        assert_eq!(config.working_dir, Some(PathBuf::from("stacks/prod")));
        assert_eq!(config.timeout_seconds, 600);
    }

    #[test]
    fn test_empty_overrides_are_ignored() {
        let config = TerraformConfig::new()
            .with_binary("tofu")
            .with_overrides_from(lookup(&[(ENV_BINARY, "")]))
            .unwrap();
        assert_eq!(config.binary, "tofu");
    }

    #[test]
    fn test_bad_timeout_override() {
        let err = TerraformConfig::new()
            .with_overrides_from(lookup(&[(ENV_TIMEOUT, "soon")]))
            .unwrap_err();
        assert!(matches!(err, TfError::Config(ref m) if m.contains("soon")));
    }

    #[test]
    fn test_definitions_table() {
        let config = TerraformConfig::new().with_definition(DefinitionSpec {
            name: Some("-test-directory".to_string()),
            ..DefinitionSpec::default()
        });
        let table = config.definitions_table().unwrap();
        assert!(table.get(&Switch::from("-test-directory")).is_some());
        assert!(table.get(&Switch::from("-var")).is_some());

        let broken = TerraformConfig::new().with_definition(DefinitionSpec::default());
        assert!(matches!(
            broken.definitions_table(),
            Err(TfError::Option(OptionError::MissingName))
        ));
    }

    #[test]
    fn test_run_config() {
        let run_config = TerraformConfig::new()
            .with_working_dir("infra")
            .with_env("TF_IN_AUTOMATION", "1")
            .with_timeout(30)
            .with_dry_run(true)
            .run_config();

        assert_eq!(run_config.timeout_seconds, 30);
        assert_eq!(run_config.working_dir, Some(PathBuf::from("infra")));
        assert_eq!(run_config.env.get("TF_IN_AUTOMATION"), Some(&"1".to_string()));
        assert!(run_config.dry_run);
        assert!(!run_config.fail_fast);
    }
}
