//! Named parameter container.
//!
//! One `Params` instance backs each request source (query, post, cookies,
//! files) as well as the parameter set attached to a matched route.
//! Insertion order is preserved so callers can rely on declaration order
//! when iterating.

use serde_json::Value;

/// Ordered name/value parameter container.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    /// Create an empty container.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Set a parameter, replacing an existing value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style variant of [`set`](Self::set).
    #[inline]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Get a parameter value by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Get a parameter as a string slice, when it is a string.
    #[inline]
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    /// Check whether a parameter exists.
    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == name)
    }

    /// Remove a parameter by name.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        let idx = self.entries.iter().position(|(k, _)| k == name)?;
        Some(self.entries.remove(idx).1)
    }

    /// Iterate over all entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Get all parameter names in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Number of parameters.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the container is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy every entry of `other` into this container, overwriting
    /// same-named entries.
    pub fn extend_from(&mut self, other: &Params) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (name, value) in iter {
            params.set(name, value);
        }
        params
    }
}

/// Render a parameter value as plain text, without JSON quoting.
///
/// Used for URL substitution and view interpolation, where a string value
/// must appear verbatim and `null` collapses to nothing.
pub fn plain_str(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let mut params = Params::new();
        params.set("name", "value");
        params.set("count", 3);

        assert_eq!(params.str("name"), Some("value"));
        assert_eq!(params.get("count"), Some(&json!(3)));
        assert_eq!(params.get("missing"), None);
        assert!(params.has("name"));
        assert!(!params.has("missing"));
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut params = Params::new().with("a", 1).with("b", 2);
        params.set("a", 10);

        assert_eq!(params.get("a"), Some(&json!(10)));
        // replacing must not change the entry's position
        assert_eq!(params.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut params = Params::new().with("a", 1).with("b", 2);

        assert_eq!(params.remove("a"), Some(json!(1)));
        assert_eq!(params.remove("a"), None);
        assert_eq!(params.keys(), vec!["b"]);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let params = Params::new().with("z", 1).with("a", 2).with("m", 3);
        assert_eq!(params.keys(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_extend_from_overwrites() {
        let mut base = Params::new().with("keep", "x").with("shadow", "old");
        let over = Params::new().with("shadow", "new").with("extra", 1);

        base.extend_from(&over);

        assert_eq!(base.str("keep"), Some("x"));
        assert_eq!(base.str("shadow"), Some("new"));
        assert_eq!(base.get("extra"), Some(&json!(1)));
    }

    #[test]
    fn test_plain_str() {
        assert_eq!(plain_str(&json!("text")), "text");
        assert_eq!(plain_str(&json!(123)), "123");
        assert_eq!(plain_str(&json!(true)), "true");
        assert_eq!(plain_str(&Value::Null), "");
    }
}
