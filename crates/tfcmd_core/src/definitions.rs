//! The built-in option definition table.
//!
//! Built once on first use and read-only afterwards. Callers that need extra
//! or different definitions layer them on top with [`Definitions::with_overrides`].

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::definition::{Definition, KeyOverride, ValueKind};
use crate::switch::Switch;

const BOOLEAN_SWITCHES: &[&str] = &[
    "-auto-approve",
    "-backend",
    "-get",
    "-input",
    "-list",
    "-lock",
    "-or-create",
    "-refresh",
    "-verify-plugins",
    "-write",
];

const FLAG_SWITCHES: &[&str] = &[
    "-allow-missing",
    "-allow-missing-config",
    "-check",
    "-compact-warnings",
    "-destroy",
    "-detailed-exitcode",
    "-diff",
    "-draw-cycles",
    "-dry-run",
    "-enable-plugin-cache",
    "-force",
    "-force-copy",
    "-ignore-remote-version",
    "-json",
    "-migrate-state",
    "-no-color",
    "-raw",
    "-reconfigure",
    "-recursive",
    "-refresh-only",
    "-update",
    "-upgrade",
];

/// Repeatable string options, accepted under both `x` and `xs`.
const PLURAL_SWITCHES: &[&str] = &[
    "-platform",
    "-plugin-dir",
    "-replace",
    "-target",
    "-var-file",
];

const STANDARD_SWITCHES: &[&str] = &[
    "-backup",
    "-from-module",
    "-generate-config-out",
    "-lock-timeout",
    "-lockfile",
    "-module-depth",
    "-out",
    "-parallelism",
    "-provider",
    "-state",
    "-state-out",
    "-type",
];

fn builtin_definitions() -> Vec<Definition> {
    let mut definitions = Vec::new();

    definitions.extend(BOOLEAN_SWITCHES.iter().map(|s| Definition::boolean(*s)));
    definitions.extend(FLAG_SWITCHES.iter().map(|s| Definition::flag(*s)));
    definitions.extend(PLURAL_SWITCHES.iter().map(|s| Definition::new(*s).repeatable()));
    definitions.extend(STANDARD_SWITCHES.iter().map(|s| Definition::new(*s)));

    definitions.push(Definition::new("-chdir").global());
    definitions.push(
        Definition::new("-var")
            .value_kind(ValueKind::Complex)
            .repeatable(),
    );
    definitions.push(
        Definition::new("-backend-config")
            .value_kind(ValueKind::Complex)
            .repeatable()
            .singular_key(KeyOverride::Disabled)
            .plural_key(KeyOverride::Key("backend_config".to_string())),
    );

    definitions
}

static BUILTIN: Lazy<Definitions> = Lazy::new(|| Definitions::new(builtin_definitions()));

/// A lookup table of option definitions keyed by switch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Definitions {
    entries: BTreeMap<Switch, Definition>,
}

impl Definitions {
    pub fn new(definitions: impl IntoIterator<Item = Definition>) -> Self {
        let mut table = Self::default();
        for definition in definitions {
            table.insert(definition);
        }
        table
    }

    /// The process-wide built-in table.
    pub fn builtin() -> &'static Definitions {
        &BUILTIN
    }

    /// A copy of this table with `overrides` replacing same-named entries.
    pub fn with_overrides(&self, overrides: impl IntoIterator<Item = Definition>) -> Self {
        let mut table = self.clone();
        for definition in overrides {
            table.insert(definition);
        }
        table
    }

    fn insert(&mut self, definition: Definition) {
        self.entries.insert(definition.name().clone(), definition);
    }

    pub fn get(&self, switch: &Switch) -> Option<&Definition> {
        self.entries.get(switch)
    }

    /// The definition for a switch, defaulting to a plain standard option.
    pub fn resolve(&self, switch: &Switch) -> Definition {
        self.get(switch)
            .cloned()
            .unwrap_or_else(|| Definition::new(switch.clone()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Definition> {
        self.entries.values()
    }
}
