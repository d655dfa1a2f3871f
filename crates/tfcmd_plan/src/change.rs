//! Planned changes and their classification.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::boxing::box_value;
use crate::hashing::hash_json;
use crate::values::BoxedValue;

/// A single action token from a change's `actions` list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    NoOp,
    Create,
    Read,
    Update,
    Delete,
    /// An action this library does not know about.
    Other(String),
}

impl Action {
    pub fn as_str(&self) -> &str {
        match self {
            Action::NoOp => "no-op",
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Other(other) => other,
        }
    }
}

impl From<String> for Action {
    fn from(token: String) -> Self {
        match token.as_str() {
            "no-op" | "no_op" => Action::NoOp,
            "create" => Action::Create,
            "read" => Action::Read,
            "update" => Action::Update,
            "delete" => Action::Delete,
            _ => Action::Other(token),
        }
    }
}

impl From<&str> for Action {
    fn from(token: &str) -> Self {
        Action::from(token.to_string())
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.as_str().to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutually exclusive classification of an action sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    NoOp,
    Create,
    Read,
    Update,
    ReplaceDeleteCreate,
    ReplaceCreateDelete,
    Delete,
    Other,
}

impl ChangeKind {
    /// Classify an action sequence by exact match. Anything unrecognised is
    /// `Other`.
    pub fn from_actions(actions: &[Action]) -> Self {
        use Action::*;
        match actions {
            [NoOp] => ChangeKind::NoOp,
            [Create] => ChangeKind::Create,
            [Read] => ChangeKind::Read,
            [Update] => ChangeKind::Update,
            [Delete, Create] => ChangeKind::ReplaceDeleteCreate,
            [Create, Delete] => ChangeKind::ReplaceCreateDelete,
            [Delete] => ChangeKind::Delete,
            _ => ChangeKind::Other,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self, ChangeKind::ReplaceDeleteCreate | ChangeKind::ReplaceCreateDelete)
    }

    /// Symbol used in plan listings.
    pub fn symbol(&self) -> &'static str {
        match self {
            ChangeKind::NoOp => " ",
            ChangeKind::Create => "+",
            ChangeKind::Read => "<=",
            ChangeKind::Update => "~",
            ChangeKind::ReplaceDeleteCreate => "-/+",
            ChangeKind::ReplaceCreateDelete => "+/-",
            ChangeKind::Delete => "-",
            ChangeKind::Other => "?",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::NoOp => "no changes",
            ChangeKind::Create => "will be created",
            ChangeKind::Read => "will be read",
            ChangeKind::Update => "will be updated in-place",
            ChangeKind::ReplaceDeleteCreate => "must be replaced",
            ChangeKind::ReplaceCreateDelete => "must be replaced (create before destroy)",
            ChangeKind::Delete => "will be destroyed",
            ChangeKind::Other => "has an unrecognised change",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Deserialize an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A planned change to a resource or output.
///
/// The raw `before`/`after` trees are kept as decoded; `before_object` and
/// `after_object` give the boxed view. Equality is structural: map key order
/// does not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<Action>,

    #[serde(default)]
    pub before: Value,

    #[serde(default)]
    pub before_sensitive: Value,

    #[serde(default)]
    pub after: Value,

    #[serde(default)]
    pub after_unknown: Value,

    #[serde(default)]
    pub after_sensitive: Value,

    /// Attribute paths that force replacement.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub replace_paths: Vec<Value>,
}

impl Change {
    pub fn new<A: Into<Action>>(actions: impl IntoIterator<Item = A>) -> Self {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_before(mut self, before: Value, sensitive: Value) -> Self {
        self.before = before;
        self.before_sensitive = sensitive;
        self
    }

    pub fn with_after(mut self, after: Value, unknown: Value, sensitive: Value) -> Self {
        self.after = after;
        self.after_unknown = unknown;
        self.after_sensitive = sensitive;
        self
    }

    pub fn kind(&self) -> ChangeKind {
        ChangeKind::from_actions(&self.actions)
    }

    pub fn is_no_op(&self) -> bool {
        self.kind() == ChangeKind::NoOp
    }

    pub fn is_create(&self) -> bool {
        self.kind() == ChangeKind::Create
    }

    pub fn is_read(&self) -> bool {
        self.kind() == ChangeKind::Read
    }

    pub fn is_update(&self) -> bool {
        self.kind() == ChangeKind::Update
    }

    pub fn is_replace_delete_before_create(&self) -> bool {
        self.kind() == ChangeKind::ReplaceDeleteCreate
    }

    pub fn is_replace_create_before_delete(&self) -> bool {
        self.kind() == ChangeKind::ReplaceCreateDelete
    }

    pub fn is_replace(&self) -> bool {
        self.kind().is_replace()
    }

    pub fn is_delete(&self) -> bool {
        self.kind() == ChangeKind::Delete
    }

    /// Whether the object exists before the change.
    pub fn present_before(&self) -> bool {
        !self.before.is_null()
    }

    /// Whether the object exists after the change, even if entirely unknown.
    pub fn present_after(&self) -> bool {
        !self.after.is_null() || self.after_unknown == Value::Bool(true)
    }

    /// The prior state as a boxed tree. Nothing is unknown before a change.
    pub fn before_object(&self) -> BoxedValue {
        box_value(&self.before, &Value::Bool(false), &self.before_sensitive)
    }

    /// The planned state as a boxed tree.
    pub fn after_object(&self) -> BoxedValue {
        box_value(&self.after, &self.after_unknown, &self.after_sensitive)
    }
}

impl Hash for Change {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.actions.hash(state);
        hash_json(&self.before, state);
        hash_json(&self.before_sensitive, state);
        hash_json(&self.after, state);
        hash_json(&self.after_unknown, state);
        hash_json(&self.after_sensitive, state);
        self.replace_paths.len().hash(state);
        for path in &self.replace_paths {
            hash_json(path, state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SEQUENCES: &[&[&str]] = &[
        &["no-op"],
        &["create"],
        &["read"],
        &["update"],
        &["delete", "create"],
        &["create", "delete"],
        &["delete"],
    ];

    fn predicates(change: &Change) -> [bool; 7] {
        [
            change.is_no_op(),
            change.is_create(),
            change.is_read(),
            change.is_update(),
            change.is_replace_delete_before_create(),
            change.is_replace_create_before_delete(),
            change.is_delete(),
        ]
    }

    #[test]
    fn test_classification_is_exclusive() {
        for (position, actions) in SEQUENCES.iter().enumerate() {
            let change = Change::new(actions.iter().copied());
            let flags = predicates(&change);
            assert_eq!(flags.iter().filter(|f| **f).count(), 1, "{:?}", actions);
            assert!(flags[position], "{:?}", actions);
            assert_eq!(
                change.is_replace(),
                change.is_replace_delete_before_create() || change.is_replace_create_before_delete()
            );
        }
    }

    #[test]
    fn test_delete_then_create_is_replace() {
        let change = Change::new(["delete", "create"]);
        assert!(change.is_replace_delete_before_create());
        assert!(change.is_replace());
        assert!(!change.is_create());
        assert!(!change.is_delete());
    }

    #[test]
    fn test_unrecognised_sequences_are_other() {
        assert_eq!(Change::new(["update", "delete"]).kind(), ChangeKind::Other);
        assert_eq!(Change::new(["forget"]).kind(), ChangeKind::Other);
        assert_eq!(Change::new(Vec::<Action>::new()).kind(), ChangeKind::Other);
        assert_eq!(predicates(&Change::new(["forget"])), [false; 7]);
    }

    #[test]
    fn test_action_tokens() {
        assert_eq!(Action::from("no-op"), Action::NoOp);
        assert_eq!(Action::from("no_op"), Action::NoOp);
        assert_eq!(Action::from("import"), Action::Other("import".to_string()));
        assert_eq!(serde_json::to_value(Action::NoOp).unwrap(), json!("no-op"));
    }

    #[test]
    fn test_deserialize_tolerates_missing_and_null_fields() {
        let change: Change = serde_json::from_value(json!({
            "actions": ["create"],
            "before": null,
            "replace_paths": null,
            "importing": {"id": "i-123"}
        }))
        .unwrap();

        assert!(change.is_create());
        assert!(!change.present_before());
        assert!(change.replace_paths.is_empty());
        assert_eq!(change.after_unknown, Value::Null);
    }

    #[test]
    fn test_present_after_when_wholly_unknown() {
        let change = Change::new(["create"]).with_after(Value::Null, json!(true), json!(false));
        assert!(change.present_after());
        assert_eq!(change.after_object(), BoxedValue::unknown(false));
    }

    #[test]
    fn test_boxed_views() {
        let change = Change::new(["update"])
            .with_before(json!({"size": 1, "token": "old"}), json!({"token": true}))
            .with_after(json!({"size": 2}), json!({"id": true}), json!({}));

        let before = change.before_object();
        assert!(before.get("token").unwrap().is_sensitive());
        assert_eq!(before.get("size"), Some(&BoxedValue::known(1, false)));

        let after = change.after_object();
        assert!(after.get("id").unwrap().is_unknown());
        assert_eq!(after.unbox(), json!({"id": null, "size": 2}));
    }
}
