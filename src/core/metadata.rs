//! String-keyed values that travel alongside an event.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Metadata attached to an event.
///
/// Used to pass identifiers (typically the entity id) through to guards,
/// actions and the persistence interceptor.
///
/// # Example
///
/// ```rust
/// use waypoint::core::Metadata;
///
/// let metadata = Metadata::new().with("payment_id", 42);
///
/// assert!(metadata.contains_key("payment_id"));
/// assert_eq!(metadata.get_as::<u64>("payment_id"), Some(42));
/// assert_eq!(metadata.get_as::<u64>("missing"), None);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata(BTreeMap<String, Value>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value, returning the updated metadata.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Decode a value into a concrete type.
    ///
    /// Returns `None` when the key is absent or the value has a different shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key)
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }

    /// A key is present only if it maps to a non-null value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some_and(|value| !value.is_null())
    }

    /// Copy a single key into a fresh metadata map, if present.
    pub fn project(&self, key: &str) -> Metadata {
        let mut projected = Metadata::new();
        if let Some(value) = self.get(key) {
            projected.insert(key, value.clone());
        }
        projected
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.insert(key, value);
        }
        metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_values_do_not_count_as_present() {
        let metadata = Metadata::new().with("entity_id", Value::Null);

        assert!(!metadata.contains_key("entity_id"));
        assert_eq!(metadata.len(), 1);
    }

    #[test]
    fn get_as_rejects_mismatched_types() {
        let metadata = Metadata::new().with("entity_id", "not-a-number");

        assert_eq!(metadata.get_as::<u64>("entity_id"), None);
        assert_eq!(
            metadata.get_as::<String>("entity_id").as_deref(),
            Some("not-a-number")
        );
    }

    #[test]
    fn project_keeps_only_the_requested_key() {
        let metadata = Metadata::new().with("entity_id", 7).with("trace", "abc");

        let projected = metadata.project("entity_id");
        assert_eq!(projected.len(), 1);
        assert_eq!(projected.get_as::<u64>("entity_id"), Some(7));

        assert!(metadata.project("missing").is_empty());
    }

    #[test]
    fn collects_from_pairs() {
        let metadata: Metadata = vec![("a", 1), ("b", 2)].into_iter().collect();

        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata.get_as::<i32>("b"), Some(2));
    }
}
