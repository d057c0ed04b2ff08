//! Multi-criteria entity search filters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::metadata::Metadata;

/// Conversion into a list of strings, where a single string becomes a one-element list.
pub trait IntoStringList {
    /// Converts `self` into an owned list.
    fn into_string_list(self) -> Vec<String>;
}

impl IntoStringList for &str {
    fn into_string_list(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoStringList for String {
    fn into_string_list(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: Into<String>> IntoStringList for Vec<S> {
    fn into_string_list(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String> + Clone> IntoStringList for &[S] {
    fn into_string_list(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoStringList for [S; N] {
    fn into_string_list(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

/// A search query combining free text, entity types and metadata criteria.
///
/// Attribute names are not validated locally; an unknown attribute surfaces as a backend
/// error. Overlapping keys in `must_have_values` and `must_not_have_values` are passed
/// through as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    /// Free text to search for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Entity types to restrict the search to, for example `TimeSeries` or `Security`.
    pub entity_types: Vec<String>,
    /// Metadata values an entity must have.
    pub must_have_values: BTreeMap<String, Value>,
    /// Metadata values an entity must not have.
    pub must_not_have_values: BTreeMap<String, Value>,
    /// Metadata attributes an entity must have.
    pub must_have_attributes: Vec<String>,
    /// Metadata attributes an entity must not have.
    pub must_not_have_attributes: Vec<String>,
}

impl SearchFilter {
    /// Creates an empty filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free text.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Sets the entity types.
    #[must_use]
    pub fn with_entity_types(mut self, entity_types: impl IntoStringList) -> Self {
        self.entity_types = entity_types.into_string_list();
        self
    }

    /// Adds a metadata value the entity must have.
    #[must_use]
    pub fn with_must_have_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.must_have_values.insert(name.into(), value.into());
        self
    }

    /// Adds a metadata value the entity must not have.
    #[must_use]
    pub fn with_must_not_have_value(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.must_not_have_values.insert(name.into(), value.into());
        self
    }

    /// Sets the attributes the entity must have.
    #[must_use]
    pub fn with_must_have_attributes(mut self, attributes: impl IntoStringList) -> Self {
        self.must_have_attributes = attributes.into_string_list();
        self
    }

    /// Sets the attributes the entity must not have.
    #[must_use]
    pub fn with_must_not_have_attributes(mut self, attributes: impl IntoStringList) -> Self {
        self.must_not_have_attributes = attributes.into_string_list();
        self
    }

    /// Evaluates the filter against a normalized metadata map.
    ///
    /// Text matches case-insensitively against `Name`, `PrimName` and `FullDescription`.
    /// A value criterion matches a multi-valued attribute if any of its values is equal.
    #[must_use]
    pub fn matches(&self, metadata: &Metadata) -> bool {
        if let Some(text) = self.text.as_deref().filter(|t| !t.is_empty()) {
            let needle = text.to_lowercase();
            let found = ["Name", "PrimName", "FullDescription"].iter().any(|key| {
                metadata
                    .get(*key)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&needle))
            });
            if !found {
                return false;
            }
        }

        if !self.entity_types.is_empty() {
            let entity_type = metadata.get("EntityType").and_then(Value::as_str);
            if !entity_type.is_some_and(|t| self.entity_types.iter().any(|e| e == t)) {
                return false;
            }
        }

        let has_value = |name: &String, expected: &Value| match metadata.get(name) {
            Some(Value::Array(values)) => values.contains(expected),
            Some(actual) => actual == expected,
            None => false,
        };

        self.must_have_values.iter().all(|(k, v)| has_value(k, v))
            && !self.must_not_have_values.iter().any(|(k, v)| has_value(k, v))
            && self.must_have_attributes.iter().all(|a| metadata.contains_key(a))
            && !self
                .must_not_have_attributes
                .iter()
                .any(|a| metadata.contains_key(a))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn metadata(value: Value) -> Metadata {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_single_string_normalized() {
        let single = SearchFilter::new().with_entity_types("Security");
        let list = SearchFilter::new().with_entity_types(vec!["Security"]);
        let array = SearchFilter::new().with_entity_types(["Security"]);

        assert_eq!(single, list);
        assert_eq!(single, array);
        assert_eq!(single.entity_types, vec!["Security".to_string()]);

        let attributes = SearchFilter::new()
            .with_must_have_attributes("MoveBase")
            .with_must_not_have_attributes(String::from("Currency"));
        assert_eq!(attributes.must_have_attributes, vec!["MoveBase".to_string()]);
        assert_eq!(attributes.must_not_have_attributes, vec!["Currency".to_string()]);
    }

    #[test]
    fn test_defaults_are_empty() {
        let filter = SearchFilter::new();
        assert!(filter.text.is_none());
        assert!(filter.entity_types.is_empty());
        assert!(filter.must_have_values.is_empty());
        assert!(filter.must_not_have_values.is_empty());
        assert!(filter.must_have_attributes.is_empty());
        assert!(filter.must_not_have_attributes.is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let filter = SearchFilter::new()
            .with_text("usgdp")
            .with_must_have_value("MoveBase", "pp100");
        let value = serde_json::to_value(&filter).unwrap();

        assert_eq!(value["text"], "usgdp");
        assert_eq!(value["mustHaveValues"]["MoveBase"], "pp100");
        assert_eq!(value["entityTypes"], json!([]));
    }

    #[test]
    fn test_matches_values_and_attributes() {
        let entity = metadata(json!({
            "Name": "usgdp",
            "FullDescription": "United States, Gross Domestic Product",
            "EntityType": "TimeSeries",
            "MoveBase": "pp100",
            "Region": ["us", "world"],
        }));

        assert!(SearchFilter::new().with_text("GROSS").matches(&entity));
        assert!(!SearchFilter::new().with_text("inflation").matches(&entity));
        assert!(SearchFilter::new().with_must_have_value("MoveBase", "pp100").matches(&entity));
        assert!(!SearchFilter::new().with_must_not_have_value("MoveBase", "pp100").matches(&entity));
        assert!(SearchFilter::new().with_must_have_value("Region", "us").matches(&entity));
        assert!(SearchFilter::new().with_must_have_attributes("MoveBase").matches(&entity));
        assert!(!SearchFilter::new().with_must_not_have_attributes("MoveBase").matches(&entity));
        assert!(!SearchFilter::new().with_entity_types("Security").matches(&entity));
        assert!(SearchFilter::new().with_entity_types(["Security", "TimeSeries"]).matches(&entity));
    }
}
