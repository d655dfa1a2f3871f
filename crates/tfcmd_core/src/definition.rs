//! Option definitions: how a switch maps user values to options.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{OptionError, OptionResult};
use crate::option::{CliOption, OptionKind, Placement};
use crate::switch::Switch;
use crate::value::{OptionValue, OptionValues};

/// How values for an option are interpreted before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    /// Scalars and sequences of scalars.
    #[default]
    String,
    /// Coerced to `true`/`false`.
    Boolean,
    /// Additionally accepts key/value mappings; non-string values render as JSON.
    Complex,
}

/// Override for the key a value is looked up under.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum KeyOverride {
    /// Derived from the switch name.
    #[default]
    Derived,
    /// No key of this form is accepted.
    Disabled,
    Key(String),
}

impl KeyOverride {
    fn resolve(&self, derived: String) -> Option<String> {
        match self {
            KeyOverride::Derived => Some(derived),
            KeyOverride::Disabled => None,
            KeyOverride::Key(key) => Some(key.clone()),
        }
    }
}

/// Singular and plural key overrides.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OverrideKeys {
    pub singular: KeyOverride,
    pub plural: KeyOverride,
}

/// Additional keys accepted for an option.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtraKeys {
    #[serde(default)]
    pub singular: Vec<String>,
    #[serde(default)]
    pub plural: Vec<String>,
}

/// Declares how a single switch resolves from user values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Definition {
    name: Switch,
    option_kind: OptionKind,
    value_kind: ValueKind,
    repeatable: bool,
    separator: Option<String>,
    placement: Placement,
    override_keys: OverrideKeys,
    extra_keys: ExtraKeys,
}

impl Definition {
    /// A non-repeatable standard string option.
    pub fn new(name: impl Into<Switch>) -> Self {
        Self {
            name: name.into(),
            option_kind: OptionKind::Standard,
            value_kind: ValueKind::String,
            repeatable: false,
            separator: None,
            placement: Placement::Subcommand,
            override_keys: OverrideKeys::default(),
            extra_keys: ExtraKeys::default(),
        }
    }

    /// Boolean option with a boolean value.
    pub fn boolean(name: impl Into<Switch>) -> Self {
        Self::new(name).option_kind(OptionKind::Boolean).value_kind(ValueKind::Boolean)
    }

    /// Flag option with a boolean value.
    pub fn flag(name: impl Into<Switch>) -> Self {
        Self::new(name).option_kind(OptionKind::Flag).value_kind(ValueKind::Boolean)
    }

    pub fn option_kind(mut self, kind: OptionKind) -> Self {
        self.option_kind = kind;
        self
    }

    pub fn value_kind(mut self, kind: ValueKind) -> Self {
        self.value_kind = kind;
        self
    }

    pub fn repeatable(mut self) -> Self {
        self.repeatable = true;
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn global(mut self) -> Self {
        self.placement = Placement::Global;
        self
    }

    pub fn singular_key(mut self, key: KeyOverride) -> Self {
        self.override_keys.singular = key;
        self
    }

    pub fn plural_key(mut self, key: KeyOverride) -> Self {
        self.override_keys.plural = key;
        self
    }

    pub fn extra_singular_key(mut self, key: impl Into<String>) -> Self {
        self.extra_keys.singular.push(key.into());
        self
    }

    pub fn extra_plural_key(mut self, key: impl Into<String>) -> Self {
        self.extra_keys.plural.push(key.into());
        self
    }

    pub fn name(&self) -> &Switch {
        &self.name
    }

    pub fn kind(&self) -> OptionKind {
        self.option_kind
    }

    pub fn values_kind(&self) -> ValueKind {
        self.value_kind
    }

    pub fn is_repeatable(&self) -> bool {
        self.repeatable
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn matches(&self, switch: &Switch) -> bool {
        &self.name == switch
    }

    /// Every key a singular value may be supplied under.
    pub fn singular_keys(&self) -> Vec<String> {
        self.override_keys
            .singular
            .resolve(self.name.as_singular_key())
            .into_iter()
            .chain(self.extra_keys.singular.iter().cloned())
            .collect()
    }

    /// Every key a plural value may be supplied under. Empty unless repeatable.
    pub fn plural_keys(&self) -> Vec<String> {
        if !self.repeatable {
            return Vec::new();
        }
        self.override_keys
            .plural
            .resolve(self.name.as_plural_key())
            .into_iter()
            .chain(self.extra_keys.plural.iter().cloned())
            .collect()
    }

    /// Resolve user values into options: singular values first, then plural.
    pub fn build(&self, values: &OptionValues) -> OptionResult<Vec<CliOption>> {
        let mut options = self.build_singular(values)?;
        options.extend(self.build_plural(values)?);
        if !options.is_empty() {
            debug!("Resolved {} occurrence(s) of {}", options.len(), self.name);
        }
        Ok(options)
    }

    fn lookup<'a>(&self, values: &'a OptionValues, keys: &[String]) -> Vec<&'a OptionValue> {
        keys.iter().filter_map(|key| values.get(key)).collect()
    }

    fn build_singular(&self, values: &OptionValues) -> OptionResult<Vec<CliOption>> {
        let keys = self.singular_keys();
        let found = self.lookup(values, &keys);

        if !self.repeatable {
            let total: usize = found.iter().map(|v| self.occurrences(v)).sum();
            if total > 1 {
                return Err(OptionError::MultipleValues {
                    switch: self.name.to_string(),
                    keys,
                    values: found.iter().map(|v| v.render()).collect(),
                });
            }
        }

        found.into_iter().map(|value| self.build_option(value.clone())).collect()
    }

    fn build_plural(&self, values: &OptionValues) -> OptionResult<Vec<CliOption>> {
        let keys = self.plural_keys();
        let mut options = Vec::new();
        for value in self.lookup(values, &keys) {
            for item in value.listify() {
                options.push(self.build_option(item)?);
            }
        }
        Ok(options)
    }

    /// How many rendered occurrences a singular value would produce.
    fn occurrences(&self, value: &OptionValue) -> usize {
        match self.option_kind {
            OptionKind::Standard => value.count(),
            OptionKind::Boolean | OptionKind::Flag => 1,
        }
    }

    fn build_option(&self, value: OptionValue) -> OptionResult<CliOption> {
        let value = self.check_value(value)?;
        let mut option = CliOption::of_kind(self.option_kind, self.name.clone(), value)
            .with_placement(self.placement);
        if let Some(separator) = &self.separator {
            option = option.with_separator(separator.clone());
        }
        Ok(option)
    }

    fn check_value(&self, value: OptionValue) -> OptionResult<OptionValue> {
        match (self.value_kind, &value) {
            (ValueKind::String, value) if contains_mapping(value) => Err(OptionError::InvalidValue {
                switch: self.name.to_string(),
                reason: "key/value pairs are not accepted by this option".to_string(),
            }),
            (ValueKind::Boolean, _) => Ok(crate::coerce::coerce_boolean(&value)
                .map(OptionValue::from)
                .unwrap_or_default()),
            _ => Ok(value),
        }
    }
}

fn contains_mapping(value: &OptionValue) -> bool {
    match value {
        OptionValue::Mapping(_) => true,
        OptionValue::Sequence(items) => items.iter().any(contains_mapping),
        OptionValue::Null | OptionValue::Scalar(_) => false,
    }
}

/// Serializable form of a [`Definition`], for configuration files.
///
/// `name` is optional here so a missing name surfaces as
/// [`OptionError::MissingName`] rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub option_kind: OptionKind,
    #[serde(default)]
    pub value_kind: ValueKind,
    #[serde(default)]
    pub repeatable: bool,
    #[serde(default)]
    pub separator: Option<String>,
    #[serde(default)]
    pub placement: Placement,
    /// `false` disables the singular key; a string replaces it.
    #[serde(default)]
    pub singular_key: Option<serde_json::Value>,
    #[serde(default)]
    pub plural_key: Option<serde_json::Value>,
    #[serde(default)]
    pub extra_keys: ExtraKeys,
}

fn key_override(value: Option<&serde_json::Value>) -> KeyOverride {
    match value {
        Some(serde_json::Value::Bool(false)) => KeyOverride::Disabled,
        Some(serde_json::Value::String(key)) => KeyOverride::Key(key.clone()),
        _ => KeyOverride::Derived,
    }
}

impl TryFrom<DefinitionSpec> for Definition {
    type Error = OptionError;

    fn try_from(spec: DefinitionSpec) -> OptionResult<Self> {
        let name = spec
            .name
            .filter(|n| !n.trim_start_matches('-').trim().is_empty())
            .ok_or(OptionError::MissingName)?;

        Ok(Self {
            name: Switch::new(name),
            option_kind: spec.option_kind,
            value_kind: spec.value_kind,
            repeatable: spec.repeatable,
            separator: spec.separator,
            placement: spec.placement,
            override_keys: OverrideKeys {
                singular: key_override(spec.singular_key.as_ref()),
                plural: key_override(spec.plural_key.as_ref()),
            },
            extra_keys: spec.extra_keys,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(options: &[CliOption]) -> Vec<String> {
        options
            .iter()
            .flat_map(|o| o.to_rendered())
            .map(|r| r.to_shell("="))
            .collect()
    }

    #[test]
    fn test_plural_values_are_cumulative() {
        let definition = Definition::new("-target").repeatable();
        let values = OptionValues::new()
            .set("target", "a")
            .set("targets", vec!["b", "c"]);

        let options = definition.build(&values).unwrap();
        assert_eq!(render(&options), vec!["-target=a", "-target=b", "-target=c"]);
    }

    #[test]
    fn test_non_repeatable_rejects_multiple_values() {
        let definition = Definition::new("-state").extra_singular_key("state_file");
        let values = OptionValues::new()
            .set("state", "a.tfstate")
            .set("state_file", "b.tfstate");

        let err = definition.build(&values).unwrap_err();
        match err {
            OptionError::MultipleValues { switch, keys, values } => {
                assert_eq!(switch, "-state");
                assert_eq!(keys, vec!["state", "state_file"]);
                assert_eq!(values, vec!["a.tfstate", "b.tfstate"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_non_repeatable_rejects_sequence() {
        let definition = Definition::new("-state");
        let values = OptionValues::new().set("state", vec!["a", "b"]);
        assert!(matches!(
            definition.build(&values),
            Err(OptionError::MultipleValues { .. })
        ));
    }

    #[test]
    fn test_non_repeatable_ignores_plural_key() {
        let definition = Definition::new("-state");
        let values = OptionValues::new().set("states", vec!["a", "b"]);
        assert!(definition.build(&values).unwrap().is_empty());
    }

    #[test]
    fn test_override_keys() {
        let definition = Definition::new("-backend-config")
            .value_kind(ValueKind::Complex)
            .repeatable()
            .singular_key(KeyOverride::Disabled)
            .plural_key(KeyOverride::Key("backend_config".to_string()));

        assert!(definition.singular_keys().is_empty());
        assert_eq!(definition.plural_keys(), vec!["backend_config"]);

        let values = OptionValues::new().set(
            "backend_config",
            OptionValue::mapping([("bucket", json!("b")), ("region", json!("eu-west-2"))]),
        );
        let options = definition.build(&values).unwrap();
        assert_eq!(
            render(&options),
            vec!["-backend-config 'bucket=b'", "-backend-config 'region=eu-west-2'"]
        );
    }

    #[test]
    fn test_string_kind_rejects_mapping() {
        let definition = Definition::new("-out");
        let values = OptionValues::new().set("out", OptionValue::mapping([("a", json!(1))]));
        assert!(matches!(
            definition.build(&values),
            Err(OptionError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_string_kind_rejects_nested_mapping() {
        let definition = Definition::new("-target").repeatable();
        let nested = OptionValue::from(json!([{"a": 1}]));

        for key in ["target", "targets"] {
            let values = OptionValues::new().set(key, nested.clone());
            assert!(matches!(
                definition.build(&values),
                Err(OptionError::InvalidValue { ref switch, .. }) if switch == "-target"
            ));
        }
    }

    #[test]
    fn test_boolean_value_kind_coerces() {
        let definition = Definition::boolean("-lock");
        let values = OptionValues::new().set("lock", "FALSE");
        assert_eq!(render(&definition.build(&values).unwrap()), vec!["-lock=false"]);
    }

    #[test]
    fn test_spec_without_name_is_rejected() {
        let spec = DefinitionSpec::default();
        assert_eq!(Definition::try_from(spec), Err(OptionError::MissingName));
    }

    #[test]
    fn test_spec_conversion() {
        let spec = DefinitionSpec {
            name: Some("replace".to_string()),
            repeatable: true,
            singular_key: Some(json!(false)),
            plural_key: Some(json!("replacements")),
            ..Default::default()
        };
        let definition = Definition::try_from(spec).unwrap();
        assert_eq!(definition.name().as_str(), "-replace");
        assert!(definition.singular_keys().is_empty());
        assert_eq!(definition.plural_keys(), vec!["replacements"]);
    }
}
