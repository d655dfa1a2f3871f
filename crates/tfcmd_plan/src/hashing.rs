//! Structural hashing for JSON values.

use std::hash::{Hash, Hasher};

use serde_json::Value;

/// Hash a JSON value consistently with its `PartialEq`: object keys are
/// hashed in sorted order, so insertion order does not matter.
pub(crate) fn hash_json<H: Hasher>(value: &Value, state: &mut H) {
    match value {
        Value::Null => 0u8.hash(state),
        Value::Bool(b) => {
            1u8.hash(state);
            b.hash(state);
        }
        Value::Number(n) => {
            2u8.hash(state);
            n.to_string().hash(state);
        }
        Value::String(s) => {
            3u8.hash(state);
            s.hash(state);
        }
        Value::Array(items) => {
            4u8.hash(state);
            items.len().hash(state);
            for item in items {
                hash_json(item, state);
            }
        }
        Value::Object(map) => {
            5u8.hash(state);
            map.len().hash(state);
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (key, value) in entries {
                key.hash(state);
                hash_json(value, state);
            }
        }
    }
}

pub(crate) fn hash_optional_json<H: Hasher>(value: &Option<Value>, state: &mut H) {
    match value {
        None => 0u8.hash(state),
        Some(value) => {
            1u8.hash(state);
            hash_json(value, state);
        }
    }
}
