//! Which switches and positional arguments each terraform command accepts.

use serde::Serialize;
use tracing::debug;

use crate::builder::CommandLine;
use crate::definitions::Definitions;
use crate::error::{OptionError, OptionResult};
use crate::factory::OptionsFactory;
use crate::value::OptionValues;

/// Switches accepted by every command. Rendered before the subcommand.
pub const GLOBAL_SWITCHES: &[&str] = &["-chdir"];

/// A single terraform command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommandSpec {
    /// Space-separated subcommand path, e.g. `"workspace select"`.
    pub name: &'static str,
    pub switches: &'static [&'static str],
    /// Value keys that become positional arguments, in order.
    pub arguments: &'static [&'static str],
}

impl CommandSpec {
    pub fn subcommands(&self) -> Vec<&'static str> {
        self.name.split(' ').collect()
    }

    /// Global switches followed by this command's own switches.
    pub fn accepted_switches(&self) -> Vec<&'static str> {
        GLOBAL_SWITCHES
            .iter()
            .chain(self.switches.iter())
            .copied()
            .collect()
    }

    /// Positional arguments from `values`; absent keys yield `None`.
    pub fn arguments_from(&self, values: &OptionValues) -> Vec<Option<String>> {
        let mut arguments = Vec::new();
        for key in self.arguments {
            match values.get(key) {
                None => arguments.push(None),
                Some(value) => arguments.extend(value.listify().iter().map(|v| Some(v.render()))),
            }
        }
        arguments
    }

    /// Assemble the command line for this command.
    pub fn build(
        &self,
        binary: &str,
        values: &OptionValues,
        definitions: &Definitions,
    ) -> OptionResult<CommandLine> {
        let options = OptionsFactory::new(definitions).resolve(&self.accepted_switches(), values)?;
        debug!("Building '{}' with {} option(s)", self.name, options.len());

        Ok(CommandLine::builder(binary)
            .subcommands(self.subcommands())
            .options(options)
            .arguments(self.arguments_from(values))
            .build())
    }
}

macro_rules! command {
    ($name:expr, [$($switch:expr),* $(,)?], [$($arg:expr),* $(,)?]) => {
        CommandSpec {
            name: $name,
            switches: &[$($switch),*],
            arguments: &[$($arg),*],
        }
    };
}

static COMMANDS: &[CommandSpec] = &[
    command!(
        "init",
        [
            "-backend", "-backend-config", "-force-copy", "-from-module", "-get", "-input",
            "-lock", "-lock-timeout", "-no-color", "-plugin-dir", "-reconfigure", "-migrate-state",
            "-upgrade", "-lockfile", "-ignore-remote-version",
        ],
        []
    ),
    command!("validate", ["-json", "-no-color"], []),
    command!(
        "plan",
        [
            "-compact-warnings", "-destroy", "-detailed-exitcode", "-input", "-json",
            "-lock", "-lock-timeout", "-no-color", "-out", "-parallelism", "-refresh",
            "-refresh-only", "-replace", "-state", "-target", "-var", "-var-file",
            "-generate-config-out",
        ],
        []
    ),
    command!(
        "apply",
        [
            "-auto-approve", "-backup", "-compact-warnings", "-destroy", "-input", "-json",
            "-lock", "-lock-timeout", "-no-color", "-parallelism", "-refresh", "-refresh-only",
            "-replace", "-state", "-state-out", "-target", "-var", "-var-file",
        ],
        ["plan"]
    ),
    command!(
        "destroy",
        [
            "-auto-approve", "-backup", "-compact-warnings", "-input", "-json", "-lock",
            "-lock-timeout", "-no-color", "-parallelism", "-refresh", "-state", "-state-out",
            "-target", "-var", "-var-file",
        ],
        []
    ),
    command!(
        "refresh",
        [
            "-backup", "-compact-warnings", "-input", "-lock", "-lock-timeout", "-no-color",
            "-parallelism", "-state", "-state-out", "-target", "-var", "-var-file",
        ],
        []
    ),
    command!("output", ["-json", "-raw", "-no-color", "-state"], ["name"]),
    command!("show", ["-json", "-no-color"], ["path"]),
    command!(
        "fmt",
        ["-list", "-write", "-diff", "-check", "-recursive", "-no-color"],
        ["directory"]
    ),
    command!("get", ["-update", "-no-color"], []),
    command!("graph", ["-draw-cycles", "-plan", "-type", "-module-depth"], []),
    command!(
        "import",
        [
            "-allow-missing-config", "-backup", "-config", "-ignore-remote-version", "-input",
            "-lock", "-lock-timeout", "-no-color", "-parallelism", "-provider", "-state",
            "-state-out", "-var", "-var-file",
        ],
        ["address", "id"]
    ),
    command!(
        "taint",
        [
            "-allow-missing", "-backup", "-ignore-remote-version", "-lock", "-lock-timeout",
            "-state", "-state-out",
        ],
        ["address"]
    ),
    command!(
        "untaint",
        [
            "-allow-missing", "-backup", "-ignore-remote-version", "-lock", "-lock-timeout",
            "-state", "-state-out",
        ],
        ["address"]
    ),
    command!("force-unlock", ["-force"], ["lock_id"]),
    command!("providers", [], []),
    command!(
        "providers lock",
        ["-platform", "-fs-mirror", "-net-mirror", "-enable-plugin-cache"],
        ["providers"]
    ),
    command!("version", ["-json"], []),
    command!("login", [], ["hostname"]),
    command!("logout", [], ["hostname"]),
    command!("workspace list", [], []),
    command!("workspace show", [], []),
    command!("workspace select", ["-or-create"], ["workspace"]),
    command!("workspace new", ["-lock", "-lock-timeout", "-state"], ["workspace"]),
    command!("workspace delete", ["-force", "-lock", "-lock-timeout"], ["workspace"]),
    command!("state list", ["-state", "-id"], ["addresses"]),
    command!("state show", ["-state"], ["address"]),
    command!(
        "state mv",
        [
            "-dry-run", "-backup", "-backup-out", "-ignore-remote-version", "-lock",
            "-lock-timeout", "-state", "-state-out",
        ],
        ["source", "destination"]
    ),
    command!(
        "state rm",
        [
            "-dry-run", "-backup", "-ignore-remote-version", "-lock", "-lock-timeout", "-state",
        ],
        ["addresses"]
    ),
    command!("state pull", [], []),
    command!(
        "state push",
        ["-force", "-ignore-remote-version", "-lock", "-lock-timeout"],
        ["path"]
    ),
    command!(
        "state replace-provider",
        [
            "-auto-approve", "-backup", "-ignore-remote-version", "-lock", "-lock-timeout",
            "-state",
        ],
        ["from", "to"]
    ),
];

fn normalize(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Every known command, in declaration order.
pub fn all() -> &'static [CommandSpec] {
    COMMANDS
}

/// Find a command by name: `"workspace select"`, `"workspace_select"` and
/// `"workspace-select"` all match.
pub fn lookup(name: &str) -> OptionResult<&'static CommandSpec> {
    let wanted = normalize(name);
    COMMANDS
        .iter()
        .find(|spec| normalize(spec.name) == wanted)
        .ok_or_else(|| OptionError::UnknownCommand(name.to_string()))
}
