//! Command-line assembly.
//!
//! A [`CommandLine`] is built once per invocation and handed to an executor.
//! Building never touches the process; it only produces the representation.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::option::{CliOption, Placement};
use crate::switch::Switch;

/// Default separator between a switch and its value.
pub const DEFAULT_SEPARATOR: &str = "=";

/// One rendered occurrence of an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedOption {
    pub switch: Switch,
    /// `None` for bare flags.
    pub value: Option<String>,
    /// Overrides the command line's default separator.
    pub separator: Option<String>,
    /// Force single quotes around the value in shell form.
    pub quoted: bool,
    pub placement: Placement,
}

impl RenderedOption {
    pub fn new(switch: Switch, value: Option<String>) -> Self {
        Self {
            switch,
            value,
            separator: None,
            quoted: false,
            placement: Placement::default(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn quoted(mut self) -> Self {
        self.quoted = true;
        self
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    fn effective_separator<'a>(&'a self, default: &'a str) -> &'a str {
        self.separator.as_deref().unwrap_or(default)
    }

    /// Argv tokens. A whitespace separator splits switch and value into two
    /// tokens; any other separator joins them into one.
    pub fn to_argv(&self, default_separator: &str) -> Vec<String> {
        let switch = self.switch.to_string();
        match &self.value {
            None => vec![switch],
            Some(value) => {
                let separator = self.effective_separator(default_separator);
                if separator.trim().is_empty() {
                    vec![switch, value.clone()]
                } else {
                    vec![format!("{}{}{}", switch, separator, value)]
                }
            }
        }
    }

    /// Shell form of this option.
    pub fn to_shell(&self, default_separator: &str) -> String {
        let switch = self.switch.to_string();
        match &self.value {
            None => switch,
            Some(value) => {
                let separator = self.effective_separator(default_separator);
                if self.quoted {
                    format!("{}{}{}", switch, separator, single_quote(value))
                } else if separator.trim().is_empty() {
                    format!("{}{}{}", switch, separator, shell_word(value))
                } else {
                    shell_word(&format!("{}{}{}", switch, separator, value))
                }
            }
        }
    }
}

/// Wrap in single quotes, escaping embedded single quotes.
pub fn single_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quote a token only when the shell would otherwise split or expand it.
pub fn shell_word(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,@%+".contains(c));
    if safe {
        value.to_string()
    } else {
        single_quote(value)
    }
}

/// Conversion into an ordered list of optional tokens.
///
/// A single scalar becomes a one-element list; `None` entries are kept here
/// and dropped at assembly time.
pub trait IntoTokens {
    fn into_tokens(self) -> Vec<Option<String>>;
}

impl IntoTokens for &str {
    fn into_tokens(self) -> Vec<Option<String>> {
        vec![Some(self.to_string())]
    }
}

impl IntoTokens for String {
    fn into_tokens(self) -> Vec<Option<String>> {
        vec![Some(self)]
    }
}

impl IntoTokens for &String {
    fn into_tokens(self) -> Vec<Option<String>> {
        vec![Some(self.clone())]
    }
}

impl IntoTokens for Option<String> {
    fn into_tokens(self) -> Vec<Option<String>> {
        vec![self]
    }
}

impl IntoTokens for Option<&str> {
    fn into_tokens(self) -> Vec<Option<String>> {
        vec![self.map(str::to_string)]
    }
}

impl<T: IntoTokens> IntoTokens for Vec<T> {
    fn into_tokens(self) -> Vec<Option<String>> {
        self.into_iter().flat_map(IntoTokens::into_tokens).collect()
    }
}

impl<T: IntoTokens + Clone> IntoTokens for &[T] {
    fn into_tokens(self) -> Vec<Option<String>> {
        self.iter().cloned().flat_map(IntoTokens::into_tokens).collect()
    }
}

impl<T: IntoTokens, const N: usize> IntoTokens for [T; N] {
    fn into_tokens(self) -> Vec<Option<String>> {
        self.into_iter().flat_map(IntoTokens::into_tokens).collect()
    }
}

/// An assembled command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandLine {
    binary: String,
    global_options: Vec<RenderedOption>,
    subcommands: Vec<String>,
    options: Vec<RenderedOption>,
    arguments: Vec<String>,
    separator: String,
}

impl CommandLine {
    pub fn builder(binary: impl Into<String>) -> CommandLineBuilder {
        CommandLineBuilder::new(binary)
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    pub fn subcommands(&self) -> &[String] {
        &self.subcommands
    }

    /// Options attached to the innermost subcommand.
    pub fn options(&self) -> &[RenderedOption] {
        &self.options
    }

    pub fn global_options(&self) -> &[RenderedOption] {
        &self.global_options
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Everything after the binary, as process arguments.
    pub fn args(&self) -> Vec<String> {
        let mut args = Vec::new();
        for option in &self.global_options {
            args.extend(option.to_argv(&self.separator));
        }
        args.extend(self.subcommands.iter().cloned());
        for option in &self.options {
            args.extend(option.to_argv(&self.separator));
        }
        args.extend(self.arguments.iter().cloned());
        args
    }

    /// Binary followed by [`CommandLine::args`].
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = vec![self.binary.clone()];
        argv.extend(self.args());
        argv
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = vec![shell_word(&self.binary)];
        parts.extend(self.global_options.iter().map(|o| o.to_shell(&self.separator)));
        parts.extend(self.subcommands.iter().map(|s| shell_word(s)));
        parts.extend(self.options.iter().map(|o| o.to_shell(&self.separator)));
        parts.extend(self.arguments.iter().map(|a| shell_word(a)));
        write!(f, "{}", parts.join(" "))
    }
}

/// Builder for [`CommandLine`].
#[derive(Debug, Clone)]
pub struct CommandLineBuilder {
    binary: String,
    subcommands: Vec<String>,
    options: Vec<CliOption>,
    arguments: Vec<Option<String>>,
    separator: String,
}

impl CommandLineBuilder {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            subcommands: Vec::new(),
            options: Vec::new(),
            arguments: Vec::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Subcommand tokens, outermost first. Options attach to the last one.
    pub fn subcommands(mut self, tokens: impl IntoTokens) -> Self {
        self.subcommands
            .extend(tokens.into_tokens().into_iter().flatten());
        self
    }

    pub fn option(mut self, option: CliOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn options(mut self, options: impl IntoIterator<Item = CliOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Positional arguments, appended after all options.
    pub fn arguments(mut self, arguments: impl IntoTokens) -> Self {
        self.arguments.extend(arguments.into_tokens());
        self
    }

    /// Default separator between switch and value.
    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn build(self) -> CommandLine {
        let mut global_options = Vec::new();
        let mut options = Vec::new();
        for option in &self.options {
            let target = match option.placement() {
                Placement::Global => &mut global_options,
                Placement::Subcommand => &mut options,
            };
            option.render(target);
        }

        let line = CommandLine {
            binary: self.binary,
            global_options,
            subcommands: self.subcommands,
            options,
            arguments: self.arguments.into_iter().flatten().collect(),
            separator: self.separator,
        };
        debug!("Assembled command line: {}", line);
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OptionValue;
    use serde_json::json;

    #[test]
    fn test_build_apply_line() {
        let line = CommandLine::builder("terraform")
            .subcommands("apply")
            .option(CliOption::boolean("-auto-approve", true))
            .option(CliOption::standard(
                "-var",
                OptionValue::mapping([("first", json!(1)), ("second", json!("two"))]),
            ))
            .arguments("some/path")
            .build();

        assert_eq!(
            line.to_string(),
            "terraform apply -auto-approve=true -var 'first=1' -var 'second=two' some/path"
        );
        assert_eq!(
            line.to_argv(),
            vec![
                "terraform",
                "apply",
                "-auto-approve=true",
                "-var",
                "first=1",
                "-var",
                "second=two",
                "some/path"
            ]
        );
    }

    #[test]
    fn test_nested_subcommands_take_options_last() {
        let line = CommandLine::builder("terraform")
            .subcommands(vec!["workspace", "select"])
            .option(CliOption::standard("-state", "x.tfstate"))
            .arguments(vec![Some("staging".to_string())])
            .build();

        assert_eq!(line.subcommands(), &["workspace".to_string(), "select".to_string()]);
        assert_eq!(line.to_string(), "terraform workspace select -state=x.tfstate staging");
    }

    #[test]
    fn test_nil_arguments_dropped() {
        let line = CommandLine::builder("terraform")
            .subcommands("state")
            .subcommands("mv")
            .arguments(vec![Some("a.b".to_string()), None, Some("c.d".to_string())])
            .build();

        assert_eq!(line.arguments(), &["a.b".to_string(), "c.d".to_string()]);
        assert_eq!(line.to_string(), "terraform state mv a.b c.d");
    }

    #[test]
    fn test_empty_options_and_arguments() {
        let line = CommandLine::builder("terraform").subcommands("version").build();
        assert_eq!(line.to_string(), "terraform version");
        assert_eq!(line.to_argv(), vec!["terraform", "version"]);
    }

    #[test]
    fn test_global_placement() {
        let line = CommandLine::builder("terraform")
            .subcommands("plan")
            .option(CliOption::standard("-chdir", "infra/dev").with_placement(Placement::Global))
            .option(CliOption::flag("-no-color", true))
            .build();

        assert_eq!(line.to_string(), "terraform -chdir=infra/dev plan -no-color");
    }

    #[test]
    fn test_custom_default_separator() {
        let line = CommandLine::builder("terraform")
            .subcommands("plan")
            .separator(" ")
            .option(CliOption::standard("-out", "plan.out"))
            .build();
        assert_eq!(line.to_argv(), vec!["terraform", "plan", "-out", "plan.out"]);
    }

    #[test]
    fn test_shell_quoting() {
        assert_eq!(shell_word("simple/path"), "simple/path");
        assert_eq!(shell_word("has space"), "'has space'");
        assert_eq!(shell_word(""), "''");
        assert_eq!(single_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_build_is_deterministic() {
        let build = || {
            CommandLine::builder("terraform")
                .subcommands("plan")
                .option(CliOption::standard(
                    "-var",
                    OptionValue::from(json!({"b": 2, "a": 1, "c": [1, 2]})),
                ))
                .build()
                .to_string()
        };
        assert_eq!(build(), build());
    }
}
