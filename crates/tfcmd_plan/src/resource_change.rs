//! Resource and output changes.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::change::{null_as_default, Change, ChangeKind};
use crate::hashing::hash_optional_json;

/// Whether a resource is managed or a data source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceMode {
    #[default]
    Managed,
    Data,
    #[serde(other)]
    Unknown,
}

/// A planned change to one resource instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    #[serde(default)]
    pub address: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_address: Option<String>,

    #[serde(default)]
    pub mode: ResourceMode,

    #[serde(rename = "type", default)]
    pub resource_type: String,

    #[serde(default)]
    pub name: String,

    /// Instance key: an integer for `count`, a string for `for_each`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Value>,

    #[serde(default)]
    pub provider_name: String,

    /// Set when this change concerns a deposed object.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposed: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_reason: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub change: Change,
}

impl ResourceChange {
    pub fn new(address: impl Into<String>, change: Change) -> Self {
        Self {
            address: address.into(),
            change,
            ..Self::default()
        }
    }

    pub fn is_managed(&self) -> bool {
        self.mode == ResourceMode::Managed
    }

    pub fn is_data(&self) -> bool {
        self.mode == ResourceMode::Data
    }

    pub fn kind(&self) -> ChangeKind {
        self.change.kind()
    }

    pub fn is_no_op(&self) -> bool {
        self.change.is_no_op()
    }

    pub fn is_create(&self) -> bool {
        self.change.is_create()
    }

    pub fn is_read(&self) -> bool {
        self.change.is_read()
    }

    pub fn is_update(&self) -> bool {
        self.change.is_update()
    }

    pub fn is_replace_delete_before_create(&self) -> bool {
        self.change.is_replace_delete_before_create()
    }

    pub fn is_replace_create_before_delete(&self) -> bool {
        self.change.is_replace_create_before_delete()
    }

    pub fn is_replace(&self) -> bool {
        self.change.is_replace()
    }

    pub fn is_delete(&self) -> bool {
        self.change.is_delete()
    }
}

impl Hash for ResourceChange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.address.hash(state);
        self.previous_address.hash(state);
        self.module_address.hash(state);
        self.mode.hash(state);
        self.resource_type.hash(state);
        self.name.hash(state);
        hash_optional_json(&self.index, state);
        self.provider_name.hash(state);
        self.deposed.hash(state);
        self.action_reason.hash(state);
        self.change.hash(state);
    }
}

/// A planned change to a root module output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputChange {
    pub name: String,
    pub change: Change,
}

impl OutputChange {
    pub fn new(name: impl Into<String>, change: Change) -> Self {
        Self {
            name: name.into(),
            change,
        }
    }
}

/// Criteria for selecting resource changes. Unset criteria match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    resource_type: Option<String>,
    name: Option<String>,
    module_address: Option<String>,
    mode: Option<ResourceMode>,
    kind: Option<ChangeKind>,
}

impl ResourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn module_address(mut self, module_address: impl Into<String>) -> Self {
        self.module_address = Some(module_address.into());
        self
    }

    pub fn mode(mut self, mode: ResourceMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn kind(mut self, kind: ChangeKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn matches(&self, change: &ResourceChange) -> bool {
        self.resource_type.as_ref().map_or(true, |t| *t == change.resource_type)
            && self.name.as_ref().map_or(true, |n| *n == change.name)
            && self
                .module_address
                .as_ref()
                .map_or(true, |m| change.module_address.as_ref() == Some(m))
            && self.mode.map_or(true, |m| m == change.mode)
            && self.kind.map_or(true, |k| k == change.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_resource_change() {
        let change: ResourceChange = serde_json::from_value(json!({
            "address": "module.net.aws_subnet.private[\"a\"]",
            "module_address": "module.net",
            "mode": "managed",
            "type": "aws_subnet",
            "name": "private",
            "index": "a",
            "provider_name": "registry.terraform.io/hashicorp/aws",
            "action_reason": "replace_because_tainted",
            "change": {"actions": ["delete", "create"]}
        }))
        .unwrap();

        assert!(change.is_managed());
        assert_eq!(change.index, Some(json!("a")));
        assert_eq!(change.module_address.as_deref(), Some("module.net"));
        assert!(change.is_replace());
        assert_eq!(change.action_reason.as_deref(), Some("replace_because_tainted"));
    }

    #[test]
    fn test_unknown_mode_is_tolerated() {
        let change: ResourceChange =
            serde_json::from_value(json!({"address": "x.y", "mode": "ephemeral"})).unwrap();
        assert_eq!(change.mode, ResourceMode::Unknown);
        assert!(!change.is_managed());
        assert!(!change.is_data());
    }

    #[test]
    fn test_filter() {
        let mut subnet = ResourceChange::new("aws_subnet.a", Change::new(["create"]));
        subnet.resource_type = "aws_subnet".to_string();
        subnet.name = "a".to_string();

        assert!(ResourceFilter::new().matches(&subnet));
        assert!(ResourceFilter::new().resource_type("aws_subnet").kind(ChangeKind::Create).matches(&subnet));
        assert!(!ResourceFilter::new().kind(ChangeKind::Delete).matches(&subnet));
        assert!(!ResourceFilter::new().module_address("module.net").matches(&subnet));
        assert!(!ResourceFilter::new().mode(ResourceMode::Data).matches(&subnet));
    }
}
