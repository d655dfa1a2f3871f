//! Parsed terraform JSON plans.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path as FsPath;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::change::{null_as_default, Change, ChangeKind};
use crate::error::{PlanError, PlanResult};
use crate::resource_change::{OutputChange, ResourceChange, ResourceFilter};

/// An input variable as recorded in the plan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    #[serde(default)]
    pub value: Value,
}

/// A terraform plan, as produced by `terraform show -json <planfile>`.
///
/// Only the parts needed to inspect planned changes are modelled; unknown
/// keys are ignored and missing ones default to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub format_version: Option<String>,
    pub terraform_version: Option<String>,
    pub variables: BTreeMap<String, Variable>,
    pub resource_changes: Vec<ResourceChange>,
    pub resource_drift: Vec<ResourceChange>,
    pub output_changes: Vec<OutputChange>,
    pub errored: bool,
}

#[derive(Deserialize)]
struct RawPlan {
    #[serde(default)]
    format_version: Option<String>,
    #[serde(default)]
    terraform_version: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    variables: BTreeMap<String, Variable>,
    #[serde(default, deserialize_with = "null_as_default")]
    resource_changes: Vec<ResourceChange>,
    #[serde(default, deserialize_with = "null_as_default")]
    resource_drift: Vec<ResourceChange>,
    #[serde(default, deserialize_with = "null_as_default")]
    output_changes: Map<String, Value>,
    #[serde(default)]
    errored: bool,
}

impl Plan {
    /// Parse plan JSON text.
    pub fn parse(json: &str) -> PlanResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Read and parse a plan JSON file.
    pub fn from_file(path: impl AsRef<FsPath>) -> PlanResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Build a plan from an already decoded JSON value.
    pub fn from_value(value: Value) -> PlanResult<Self> {
        if !value.is_object() {
            return Err(PlanError::NotAnObject(json_type_name(&value).to_string()));
        }

        let raw: RawPlan = serde_json::from_value(value)?;

        // Output changes are keyed by name; keep their document order.
        let output_changes = raw
            .output_changes
            .into_iter()
            .map(|(name, change)| -> PlanResult<OutputChange> {
                let change: Change = if change.is_null() {
                    Change::default()
                } else {
                    serde_json::from_value(change)?
                };
                Ok(OutputChange::new(name, change))
            })
            .collect::<PlanResult<Vec<_>>>()?;

        let plan = Self {
            format_version: raw.format_version,
            terraform_version: raw.terraform_version,
            variables: raw.variables,
            resource_changes: raw.resource_changes,
            resource_drift: raw.resource_drift,
            output_changes,
            errored: raw.errored,
        };

        for change in &plan.resource_changes {
            if change.kind() == ChangeKind::Other {
                warn!(
                    "Unrecognised actions {:?} for {}",
                    change.change.actions, change.address
                );
            }
        }

        debug!(
            "Parsed plan with {} resource change(s) and {} output change(s)",
            plan.resource_changes.len(),
            plan.output_changes.len()
        );

        Ok(plan)
    }

    /// Variable name to value.
    pub fn variable_values(&self) -> BTreeMap<String, Value> {
        self.variables
            .iter()
            .map(|(name, variable)| (name.clone(), variable.value.clone()))
            .collect()
    }

    pub fn resource_changes_with_type(&self, resource_type: &str) -> Vec<&ResourceChange> {
        self.resource_changes_matching(&ResourceFilter::new().resource_type(resource_type))
    }

    pub fn resource_changes_matching(&self, filter: &ResourceFilter) -> Vec<&ResourceChange> {
        self.resource_changes
            .iter()
            .filter(|change| filter.matches(change))
            .collect()
    }

    pub fn resource_change_with_address(&self, address: &str) -> Option<&ResourceChange> {
        self.resource_changes.iter().find(|change| change.address == address)
    }

    pub fn output_change_with_name(&self, name: &str) -> Option<&OutputChange> {
        self.output_changes.iter().find(|change| change.name == name)
    }

    /// Counts of resource changes per classification.
    pub fn summary(&self) -> PlanSummary {
        let mut summary = PlanSummary::default();
        for change in &self.resource_changes {
            summary.record(change.kind());
        }
        summary
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Summary statistics for a plan's resource changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub to_add: usize,
    pub to_change: usize,
    pub to_destroy: usize,
    pub to_replace: usize,
    pub to_read: usize,
    pub unchanged: usize,
    pub unrecognised: usize,
}

impl PlanSummary {
    pub fn record(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Create => self.to_add += 1,
            ChangeKind::Update => self.to_change += 1,
            ChangeKind::Delete => self.to_destroy += 1,
            ChangeKind::ReplaceDeleteCreate | ChangeKind::ReplaceCreateDelete => self.to_replace += 1,
            ChangeKind::Read => self.to_read += 1,
            ChangeKind::NoOp => self.unchanged += 1,
            ChangeKind::Other => self.unrecognised += 1,
        }
    }

    pub fn has_changes(&self) -> bool {
        self.total_changes() > 0
    }

    pub fn total_changes(&self) -> usize {
        self.to_add + self.to_change + self.to_destroy + self.to_replace
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} to add, {} to change, {} to replace, {} to destroy",
            self.to_add, self.to_change, self.to_replace, self.to_destroy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object() {
        assert!(matches!(Plan::parse("[1, 2]"), Err(PlanError::NotAnObject(ref t)) if t == "array"));
        assert!(matches!(Plan::parse("{not json"), Err(PlanError::Json(_))));
    }

    #[test]
    fn test_empty_object_is_an_empty_plan() {
        let plan = Plan::parse("{}").unwrap();
        assert_eq!(plan, Plan::default());
        assert!(!plan.summary().has_changes());
    }

    #[test]
    fn test_null_sections_default() {
        let plan = Plan::from_value(json!({
            "resource_changes": null,
            "output_changes": {"ip": null}
        }))
        .unwrap();
        assert!(plan.resource_changes.is_empty());
        assert_eq!(plan.output_changes, vec![OutputChange::new("ip", Change::default())]);
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = PlanSummary::default();
        for kind in [
            ChangeKind::Create,
            ChangeKind::Create,
            ChangeKind::ReplaceCreateDelete,
            ChangeKind::NoOp,
            ChangeKind::Other,
        ] {
            summary.record(kind);
        }
        assert_eq!(summary.to_add, 2);
        assert_eq!(summary.to_replace, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.unrecognised, 1);
        assert_eq!(summary.total_changes(), 3);
        assert_eq!(summary.to_string(), "2 to add, 0 to change, 1 to replace, 0 to destroy");
    }
}
