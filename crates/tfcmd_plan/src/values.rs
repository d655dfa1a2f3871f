//! Boxed attribute values.
//!
//! A boxed value records, at every level of a nested attribute, whether the
//! value is known, unknown until apply, or omitted, and whether it is
//! sensitive.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::Value;

use crate::hashing::hash_json;

pub const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";
pub const OMITTED_PLACEHOLDER: &str = "...";
pub const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";

/// A tagged attribute value tree.
///
/// A container marked sensitive is sensitive as a whole, whatever its
/// children say. Children keep their own flags either way.
#[derive(Debug, Clone, PartialEq)]
pub enum BoxedValue {
    Known { value: Value, sensitive: bool },
    Unknown { sensitive: bool },
    Omitted { sensitive: bool },
    List { items: Vec<BoxedValue>, sensitive: bool },
    Map { entries: BTreeMap<String, BoxedValue>, sensitive: bool },
}

impl BoxedValue {
    pub fn known(value: impl Into<Value>, sensitive: bool) -> Self {
        BoxedValue::Known {
            value: value.into(),
            sensitive,
        }
    }

    pub fn unknown(sensitive: bool) -> Self {
        BoxedValue::Unknown { sensitive }
    }

    pub fn omitted(sensitive: bool) -> Self {
        BoxedValue::Omitted { sensitive }
    }

    pub fn list(items: Vec<BoxedValue>, sensitive: bool) -> Self {
        BoxedValue::List { items, sensitive }
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, BoxedValue)>, sensitive: bool) -> Self {
        BoxedValue::Map {
            entries: entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            sensitive,
        }
    }

    pub fn is_sensitive(&self) -> bool {
        match self {
            BoxedValue::Known { sensitive, .. }
            | BoxedValue::Unknown { sensitive }
            | BoxedValue::Omitted { sensitive }
            | BoxedValue::List { sensitive, .. }
            | BoxedValue::Map { sensitive, .. } => *sensitive,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, BoxedValue::Known { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, BoxedValue::Unknown { .. })
    }

    pub fn is_omitted(&self) -> bool {
        matches!(self, BoxedValue::Omitted { .. })
    }

    pub fn is_container(&self) -> bool {
        matches!(self, BoxedValue::List { .. } | BoxedValue::Map { .. })
    }

    /// Whether anything in this tree is unknown.
    pub fn has_unknown(&self) -> bool {
        match self {
            BoxedValue::Unknown { .. } => true,
            BoxedValue::List { items, .. } => items.iter().any(BoxedValue::has_unknown),
            BoxedValue::Map { entries, .. } => entries.values().any(BoxedValue::has_unknown),
            _ => false,
        }
    }

    /// Whether anything in this tree is sensitive.
    pub fn has_sensitive(&self) -> bool {
        self.is_sensitive()
            || match self {
                BoxedValue::List { items, .. } => items.iter().any(BoxedValue::has_sensitive),
                BoxedValue::Map { entries, .. } => entries.values().any(BoxedValue::has_sensitive),
                _ => false,
            }
    }

    /// Map entry by key.
    pub fn get(&self, key: &str) -> Option<&BoxedValue> {
        match self {
            BoxedValue::Map { entries, .. } => entries.get(key),
            _ => None,
        }
    }

    /// List item by index.
    pub fn index(&self, index: usize) -> Option<&BoxedValue> {
        match self {
            BoxedValue::List { items, .. } => items.get(index),
            _ => None,
        }
    }

    /// Strip the boxing. Unknown and omitted values become `null`.
    pub fn unbox(&self) -> Value {
        match self {
            BoxedValue::Known { value, .. } => value.clone(),
            BoxedValue::Unknown { .. } | BoxedValue::Omitted { .. } => Value::Null,
            BoxedValue::List { items, .. } => Value::Array(items.iter().map(BoxedValue::unbox).collect()),
            BoxedValue::Map { entries, .. } => Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.unbox()))
                    .collect(),
            ),
        }
    }

    /// Human-readable rendering with placeholders for what cannot be shown.
    pub fn render(&self) -> String {
        if self.is_sensitive() {
            return SENSITIVE_PLACEHOLDER.to_string();
        }
        match self {
            BoxedValue::Known { value, .. } => value.to_string(),
            BoxedValue::Unknown { .. } => UNKNOWN_PLACEHOLDER.to_string(),
            BoxedValue::Omitted { .. } => OMITTED_PLACEHOLDER.to_string(),
            BoxedValue::List { items, .. } => {
                let items: Vec<String> = items.iter().map(BoxedValue::render).collect();
                format!("[{}]", items.join(", "))
            }
            BoxedValue::Map { entries, .. } => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{} = {}", k, v.render()))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
        }
    }
}

impl fmt::Display for BoxedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Eq for BoxedValue {}

impl Hash for BoxedValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        self.is_sensitive().hash(state);
        match self {
            BoxedValue::Known { value, .. } => hash_json(value, state),
            BoxedValue::Unknown { .. } | BoxedValue::Omitted { .. } => {}
            BoxedValue::List { items, .. } => items.hash(state),
            BoxedValue::Map { entries, .. } => entries.hash(state),
        }
    }
}
