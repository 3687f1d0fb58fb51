//! Ordered response properties.

/// Well-known property key for ordered stylesheet contributions.
pub const STYLESHEET: &str = "stylesheet";

/// Well-known property key for ordered script contributions.
pub const SCRIPT: &str = "script";

/// An ordered multimap attached to render responses.
///
/// Keys keep their insertion order and each key holds an ordered value list,
/// so framework contributions (stylesheets, scripts) can be appended without
/// disturbing application-supplied values. The map is a plain value: filters
/// that augment a response clone the map, extend the clone, and build a new
/// response around it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyMap {
    entries: Vec<(String, Vec<String>)>,
}

impl PropertyMap {
    /// Creates an empty property map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when no property is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns the first value registered under a key, if any.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values(key).first().map(String::as_str)
    }

    /// Returns the ordered values registered under a key.
    ///
    /// Missing keys yield an empty slice.
    #[must_use]
    pub fn values(&self, key: &str) -> &[String] {
        self.entry(key).map_or(&[], |values| values.as_slice())
    }

    /// Replaces the values under a key with a single value.
    pub fn set_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entry_mut(&key) {
            Some(values) => {
                values.clear();
                values.push(value);
            }
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Appends a value to a key, creating the key when absent.
    pub fn add_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entry_mut(&key) {
            Some(values) => values.push(value),
            None => self.entries.push((key, vec![value])),
        }
    }

    /// Appends several values to a key, preserving their order.
    pub fn add_values<I>(&mut self, key: impl Into<String>, values: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let key = key.into();
        for value in values {
            self.add_value(key.clone(), value);
        }
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    fn entry(&self, key: &str) -> Option<&Vec<String>> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, values)| values)
    }

    fn entry_mut(&mut self, key: &str) -> Option<&mut Vec<String>> {
        self.entries
            .iter_mut()
            .find(|(existing, _)| existing == key)
            .map(|(_, values)| values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_preserve_caller_values() {
        let mut properties = PropertyMap::new();
        properties.add_value(STYLESHEET, "app.css");
        properties.add_values(STYLESHEET, ["framework.css", "theme.css"]);

        assert_eq!(
            properties.values(STYLESHEET),
            &["app.css", "framework.css", "theme.css"]
        );
    }

    #[test]
    fn set_value_replaces() {
        let mut properties = PropertyMap::new();
        properties.add_value("title", "draft");
        properties.set_value("title", "final");

        assert_eq!(properties.value("title"), Some("final"));
        assert_eq!(properties.values("title").len(), 1);
    }

    #[test]
    fn keys_keep_insertion_order() {
        let mut properties = PropertyMap::new();
        properties.add_value("title", "t");
        properties.add_value(SCRIPT, "a.js");
        properties.add_value(STYLESHEET, "a.css");

        let keys: Vec<&str> = properties.keys().collect();
        assert_eq!(keys, vec!["title", SCRIPT, STYLESHEET]);
    }

    #[test]
    fn missing_key_yields_empty_slice() {
        let properties = PropertyMap::new();
        assert!(properties.values("absent").is_empty());
        assert_eq!(properties.value("absent"), None);
    }
}
