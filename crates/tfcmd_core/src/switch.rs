//! Option switch names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A normalized option identifier, e.g. `-auto-approve`.
///
/// Always carries exactly one leading `-`, so `"var"`, `"-var"` and `"--var"`
/// all name the same switch. Equality and hashing use the normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Switch {
    name: String,
}

impl Switch {
    pub fn new(name: impl AsRef<str>) -> Self {
        let trimmed = name.as_ref().trim().trim_start_matches('-');
        Self {
            name: format!("-{}", trimmed),
        }
    }

    /// The switch as rendered on the command line.
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// The key under which callers supply a value: `-var-file` → `var_file`.
    pub fn as_key(&self) -> String {
        self.name[1..].replace('-', "_")
    }

    pub fn as_singular_key(&self) -> String {
        self.as_key()
    }

    /// Plural key: `-var` → `vars`, `-target` → `targets`.
    pub fn as_plural_key(&self) -> String {
        format!("{}s", self.as_key())
    }

    /// Recover a switch from a value key: `auto_approve` → `-auto-approve`.
    pub fn from_key(key: &str) -> Self {
        Self::new(key.replace('_', "-"))
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Switch {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Switch {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Switch> for String {
    fn from(switch: Switch) -> Self {
        switch.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_normalizes_leading_dashes() {
        assert_eq!(Switch::new("var").as_str(), "-var");
        assert_eq!(Switch::new("-var").as_str(), "-var");
        assert_eq!(Switch::new("--var").as_str(), "-var");
    }

    #[test]
    fn test_equality_by_value() {
        let a = Switch::new("-auto-approve");
        let b = Switch::new("auto-approve");
        assert_eq!(a, b);

        let set: HashSet<Switch> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_keys() {
        let switch = Switch::new("-var-file");
        assert_eq!(switch.as_key(), "var_file");
        assert_eq!(switch.as_singular_key(), "var_file");
        assert_eq!(switch.as_plural_key(), "var_files");
        assert_eq!(Switch::from_key("var_file"), switch);
    }
}
