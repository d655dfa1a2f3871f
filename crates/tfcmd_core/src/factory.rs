//! Turns accepted switches plus user values into ordered options.

use tracing::debug;

use crate::definitions::Definitions;
use crate::error::OptionResult;
use crate::option::CliOption;
use crate::switch::Switch;
use crate::value::OptionValues;

/// Resolves options for one subcommand against a definition table.
#[derive(Debug, Clone, Copy)]
pub struct OptionsFactory<'a> {
    definitions: &'a Definitions,
}

impl Default for OptionsFactory<'static> {
    fn default() -> Self {
        Self::new(Definitions::builtin())
    }
}

impl<'a> OptionsFactory<'a> {
    pub fn new(definitions: &'a Definitions) -> Self {
        Self { definitions }
    }

    /// Resolve `values` for the accepted `switches`.
    ///
    /// Output follows the order of `switches`; a plural switch contributes its
    /// singular value first, then its plural values. Switches without a value
    /// contribute nothing.
    pub fn resolve<S>(&self, switches: &[S], values: &OptionValues) -> OptionResult<Vec<CliOption>>
    where
        S: Clone + Into<Switch>,
    {
        let mut options = Vec::new();
        for switch in switches {
            let switch: Switch = switch.clone().into();
            let definition = self.definitions.resolve(&switch);
            options.extend(
                definition
                    .build(values)?
                    .into_iter()
                    .filter(|option| !option.is_suppressed()),
            );
        }
        debug!(
            "Resolved {} option(s) from {} accepted switch(es)",
            options.len(),
            switches.len()
        );
        Ok(options)
    }
}
