//! Option kinds and how each renders onto a command line.

use serde::{Deserialize, Serialize};

use crate::builder::RenderedOption;
use crate::coerce::{boolean_token, coerce_boolean};
use crate::switch::Switch;
use crate::value::{render_json, OptionValue};

/// How an option is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// `switch=value`, repeated for sequences, `switch 'k=v'` for mappings.
    #[default]
    Standard,
    /// `switch=true|false`, suppressed only when absent.
    Boolean,
    /// Bare `switch` when true, nothing otherwise.
    Flag,
}

/// Where an option attaches in the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// After the innermost subcommand.
    #[default]
    Subcommand,
    /// Between the binary and the first subcommand (`-chdir`).
    Global,
}

/// Kind-specific payload of a resolved option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionPayload {
    Standard(OptionValue),
    Boolean(Option<bool>),
    Flag(Option<bool>),
}

/// A resolved option, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct CliOption {
    switch: Switch,
    payload: OptionPayload,
    separator: Option<String>,
    placement: Placement,
}

impl CliOption {
    pub fn standard(switch: impl Into<Switch>, value: impl Into<OptionValue>) -> Self {
        Self::with_payload(switch, OptionPayload::Standard(value.into()))
    }

    pub fn boolean(switch: impl Into<Switch>, value: impl Into<OptionValue>) -> Self {
        Self::with_payload(switch, OptionPayload::Boolean(coerce_boolean(&value.into())))
    }

    pub fn flag(switch: impl Into<Switch>, value: impl Into<OptionValue>) -> Self {
        Self::with_payload(switch, OptionPayload::Flag(coerce_boolean(&value.into())))
    }

    /// Build an option of the given kind from a raw value.
    pub fn of_kind(kind: OptionKind, switch: impl Into<Switch>, value: OptionValue) -> Self {
        match kind {
            OptionKind::Standard => Self::standard(switch, value),
            OptionKind::Boolean => Self::boolean(switch, value),
            OptionKind::Flag => Self::flag(switch, value),
        }
    }

    fn with_payload(switch: impl Into<Switch>, payload: OptionPayload) -> Self {
        Self {
            switch: switch.into(),
            payload,
            separator: None,
            placement: Placement::default(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    pub fn switch(&self) -> &Switch {
        &self.switch
    }

    pub fn payload(&self) -> &OptionPayload {
        &self.payload
    }

    pub fn kind(&self) -> OptionKind {
        match self.payload {
            OptionPayload::Standard(_) => OptionKind::Standard,
            OptionPayload::Boolean(_) => OptionKind::Boolean,
            OptionPayload::Flag(_) => OptionKind::Flag,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Whether rendering produces no tokens at all.
    pub fn is_suppressed(&self) -> bool {
        match &self.payload {
            OptionPayload::Standard(value) => value.count() == 0,
            OptionPayload::Boolean(value) => value.is_none(),
            OptionPayload::Flag(value) => *value != Some(true),
        }
    }

    /// Append this option's tokens, in order.
    pub fn render(&self, out: &mut Vec<RenderedOption>) {
        match &self.payload {
            OptionPayload::Standard(value) => self.render_standard(value, out),
            OptionPayload::Boolean(Some(b)) => out.push(self.rendered(Some(boolean_token(*b).to_string()))),
            OptionPayload::Boolean(None) => {}
            OptionPayload::Flag(Some(true)) => out.push(self.rendered(None)),
            OptionPayload::Flag(_) => {}
        }
    }

    /// Render into a fresh list.
    pub fn to_rendered(&self) -> Vec<RenderedOption> {
        let mut out = Vec::new();
        self.render(&mut out);
        out
    }

    fn render_standard(&self, value: &OptionValue, out: &mut Vec<RenderedOption>) {
        match value {
            OptionValue::Null => {}
            OptionValue::Mapping(entries) => {
                for (key, value) in entries {
                    out.push(
                        RenderedOption::new(self.switch.clone(), Some(format!("{}={}", key, render_json(value))))
                            .with_separator(" ")
                            .quoted()
                            .with_placement(self.placement),
                    );
                }
            }
            OptionValue::Sequence(items) => {
                for item in items {
                    self.render_standard(item, out);
                }
            }
            scalar @ OptionValue::Scalar(_) => out.push(self.rendered(Some(scalar.render()))),
        }
    }

    fn rendered(&self, value: Option<String>) -> RenderedOption {
        let mut rendered = RenderedOption::new(self.switch.clone(), value).with_placement(self.placement);
        if let Some(separator) = &self.separator {
            rendered = rendered.with_separator(separator.clone());
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tokens(option: &CliOption) -> Vec<String> {
        option.to_rendered().iter().map(|r| r.to_shell("=")).collect()
    }

    #[test]
    fn test_standard_scalar() {
        let option = CliOption::standard("-state", "terraform.tfstate");
        assert_eq!(tokens(&option), vec!["-state=terraform.tfstate"]);
    }

    #[test]
    fn test_standard_sequence_repeats() {
        let option = CliOption::standard("-target", vec!["aws_instance.a", "aws_instance.b"]);
        assert_eq!(
            tokens(&option),
            vec!["-target=aws_instance.a", "-target=aws_instance.b"]
        );
    }

    #[test]
    fn test_standard_mapping_uses_space_and_quotes() {
        let option = CliOption::standard(
            "-var",
            OptionValue::mapping([("first", json!(1)), ("second", json!("two")), ("list", json!(["a", "b"]))]),
        );
        assert_eq!(
            tokens(&option),
            vec!["-var 'first=1'", "-var 'second=two'", "-var 'list=[\"a\",\"b\"]'"]
        );
    }

    #[test]
    fn test_standard_null_suppressed() {
        let option = CliOption::standard("-state", OptionValue::Null);
        assert!(option.is_suppressed());
        assert!(tokens(&option).is_empty());
    }

    #[test]
    fn test_boolean_renders_false() {
        assert_eq!(tokens(&CliOption::boolean("-input", false)), vec!["-input=false"]);
        assert_eq!(tokens(&CliOption::boolean("-input", "TRUE")), vec!["-input=true"]);
        assert!(tokens(&CliOption::boolean("-input", OptionValue::Null)).is_empty());
    }

    #[test]
    fn test_flag_only_when_true() {
        assert_eq!(tokens(&CliOption::flag("-no-color", true)), vec!["-no-color"]);
        assert!(tokens(&CliOption::flag("-no-color", false)).is_empty());
        assert!(tokens(&CliOption::flag("-no-color", OptionValue::Null)).is_empty());
        assert!(CliOption::flag("-no-color", false).is_suppressed());
    }

    #[test]
    fn test_custom_separator() {
        let option = CliOption::standard("-lock-timeout", "10s").with_separator(" ");
        assert_eq!(tokens(&option), vec!["-lock-timeout 10s"]);
    }
}
