//! Boolean coercion for option values.
//!
//! terraform only understands the literal tokens `true` and `false`, while
//! callers hand in real booleans, strings from the environment and so on.
//! A single policy is used everywhere: a string is true only when it equals
//! `"true"` ignoring ASCII case.

use crate::value::{OptionValue, Scalar};

/// Coerce a value to a boolean, preserving absence.
///
/// - null → `None`
/// - boolean → itself
/// - string → `true` iff case-insensitively `"true"`
/// - anything else → `false`
pub fn coerce_boolean(value: &OptionValue) -> Option<bool> {
    match value {
        OptionValue::Null => None,
        OptionValue::Scalar(Scalar::Bool(b)) => Some(*b),
        OptionValue::Scalar(Scalar::String(s)) => Some(coerce_str(s)),
        _ => Some(false),
    }
}

/// String half of [`coerce_boolean`].
pub fn coerce_str(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

/// Render a coerced boolean as the token terraform expects.
pub fn boolean_token(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}
