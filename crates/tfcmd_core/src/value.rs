//! User-supplied option values.
//!
//! Raw input is classified once, at the boundary, into scalar, sequence or
//! key/value mapping. Everything downstream matches on [`OptionValue`].

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

/// A single scalar option value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    /// Render the scalar as a command-line token.
    pub fn render(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Number(n) => n.to_string(),
            Scalar::String(s) => s.clone(),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// A value supplied for an option key.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum OptionValue {
    /// Absent. Suppresses the option.
    #[default]
    Null,
    Scalar(Scalar),
    /// Rendered as a repeated option, one occurrence per element.
    Sequence(Vec<OptionValue>),
    /// Rendered as one `'key=value'` occurrence per entry, in insertion order.
    Mapping(Vec<(String, Value)>),
}

impl OptionValue {
    pub fn is_null(&self) -> bool {
        matches!(self, OptionValue::Null)
    }

    /// Build a mapping value from key/value pairs, keeping their order.
    pub fn mapping<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        OptionValue::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Split a value into the individual values it contributes.
    ///
    /// Sequences yield their elements, mappings yield one single-entry
    /// mapping per pair, scalars yield themselves and null yields nothing.
    pub fn listify(&self) -> Vec<OptionValue> {
        match self {
            OptionValue::Null => Vec::new(),
            OptionValue::Sequence(items) => items.iter().filter(|v| !v.is_null()).cloned().collect(),
            OptionValue::Mapping(entries) => entries
                .iter()
                .map(|entry| OptionValue::Mapping(vec![entry.clone()]))
                .collect(),
            scalar => vec![scalar.clone()],
        }
    }

    /// Number of values this contributes to a single option.
    pub fn count(&self) -> usize {
        match self {
            OptionValue::Null => 0,
            OptionValue::Sequence(items) => items.iter().filter(|v| !v.is_null()).count(),
            OptionValue::Mapping(entries) => entries.len(),
            OptionValue::Scalar(_) => 1,
        }
    }

    /// Render as a single token; containers render as JSON.
    pub fn render(&self) -> String {
        match self {
            OptionValue::Null => String::new(),
            OptionValue::Scalar(s) => s.render(),
            other => render_json(&other.to_json()),
        }
    }

    /// Convert back into JSON.
    pub fn to_json(&self) -> Value {
        match self {
            OptionValue::Null => Value::Null,
            OptionValue::Scalar(Scalar::Bool(b)) => Value::Bool(*b),
            OptionValue::Scalar(Scalar::Number(n)) => Value::Number(n.clone()),
            OptionValue::Scalar(Scalar::String(s)) => Value::String(s.clone()),
            OptionValue::Sequence(items) => Value::Array(items.iter().map(|v| v.to_json()).collect()),
            OptionValue::Mapping(entries) => Value::Object(entries.iter().cloned().collect()),
        }
    }
}

/// Render a JSON value as an option payload: strings verbatim, the rest as JSON.
pub fn render_json(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<Value> for OptionValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => OptionValue::Null,
            Value::Bool(b) => OptionValue::Scalar(Scalar::Bool(b)),
            Value::Number(n) => OptionValue::Scalar(Scalar::Number(n)),
            Value::String(s) => OptionValue::Scalar(Scalar::String(s)),
            Value::Array(items) => OptionValue::Sequence(items.into_iter().map(OptionValue::from).collect()),
            Value::Object(map) => OptionValue::Mapping(map.into_iter().collect()),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Scalar(Scalar::String(value))
    }
}

macro_rules! impl_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for OptionValue {
                fn from(value: $t) -> Self {
                    OptionValue::Scalar(Scalar::Number(value.into()))
                }
            }
        )*
    };
}

impl_from_number!(i32, i64, u16, u32, u64, usize);

impl<T: Into<OptionValue>> From<Option<T>> for OptionValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(OptionValue::Null)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        OptionValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

/// User-supplied values keyed by option key (`auto_approve`, `vars`, ...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionValues {
    values: HashMap<String, OptionValue>,
}

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, builder style.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Look up a value. Null entries read as absent.
    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    /// Build from a JSON object. Non-object input yields no values.
    pub fn from_json(value: Value) -> Self {
        let mut values = Self::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                values.insert(key, OptionValue::from(value));
            }
        }
        values
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for OptionValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (k, v) in iter {
            values.insert(k, v);
        }
        values
    }
}
