//! Multi-valued request parameters.

use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;

/// A mapping from parameter name to an ordered list of string values.
///
/// Multi-valued parameters keep their values in arrival order. The map
/// itself carries no ordering guarantee; components that need a stable view
/// (diagnostics, tests) should sort the names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: HashMap<String, Vec<String>>,
}

impl ParameterMap {
    /// Creates an empty parameter map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no parameter is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of distinct parameter names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when a parameter with the given name is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the ordered values for a parameter, if present.
    #[must_use]
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    /// Returns the first value for a parameter, if present.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Replaces the values registered under a name.
    pub fn set(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.entries.insert(name.into(), values);
    }

    /// Appends a value to a parameter, creating it when absent.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Iterates over parameter names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over parameters and their ordered values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = hash_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<(String, Vec<String>)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Renders `{name=[a, b], other=[c]}` with names sorted for stable output.
///
/// Used by resolution diagnostics, which must carry the full parameter map.
impl fmt::Display for ParameterMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.write_str("{")?;
        for (index, name) in names.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}=[")?;
            if let Some(values) = self.entries.get(*name) {
                for (value_index, value) in values.iter().enumerate() {
                    if value_index > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(value)?;
                }
            }
            f.write_str("]")?;
        }
        f.write_str("}")
    }
}
