//! Metadata normalization.
//!
//! Backends expose metadata as a container of named attributes, each backed by one or
//! more values. Normalization flattens a container into a [`Metadata`] map where a single
//! value is stored as a scalar and several values as an array, and guarantees that a
//! `FullDescription` is always present.

use serde_json::Value;

/// A normalized metadata map.
pub type Metadata = serde_json::Map<String, Value>;

/// Key of the full description attribute.
pub const FULL_DESCRIPTION: &str = "FullDescription";

/// Prefix of namespaced metadata keys.
pub const NAMESPACE_PREFIX: &str = "MetaData.";

/// A source of named metadata attributes.
pub trait MetadataContainer {
    /// Names of the attributes present, in backend order.
    fn list_names(&self) -> Vec<String>;

    /// Values backing an attribute. Empty if the attribute is absent.
    fn get_values(&self, name: &str) -> Vec<Value>;
}

impl MetadataContainer for Metadata {
    fn list_names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }

    fn get_values(&self, name: &str) -> Vec<Value> {
        match self.get(name) {
            Some(Value::Array(values)) => values.clone(),
            Some(value) => vec![value.clone()],
            None => Vec::new(),
        }
    }
}

fn collapse(mut values: Vec<Value>) -> Value {
    if values.len() == 1 {
        values.remove(0)
    } else {
        Value::Array(values)
    }
}

/// Flattens a container into a map of plain keys.
///
/// `FullDescription` is filled from `title` if the container lacks it.
#[must_use]
pub fn fill_metadata(container: &(impl MetadataContainer + ?Sized), title: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for name in container.list_names() {
        let values = container.get_values(&name);
        metadata.insert(name, collapse(values));
    }

    if !metadata.contains_key(FULL_DESCRIPTION) {
        metadata.insert(FULL_DESCRIPTION.to_string(), Value::String(title.to_string()));
    }

    metadata
}

/// Copies a container into `destination` under `MetaData.`-prefixed keys.
///
/// The prefix keeps metadata apart from other fields merged into the same map.
/// `MetaData.FullDescription` is filled from `title` if the container lacks it.
pub fn copy_metadata_namespaced(
    container: &(impl MetadataContainer + ?Sized),
    title: &str,
    destination: &mut Metadata,
) {
    for name in container.list_names() {
        let values = container.get_values(&name);
        destination.insert(format!("{NAMESPACE_PREFIX}{name}"), collapse(values));
    }

    let key = format!("{NAMESPACE_PREFIX}{FULL_DESCRIPTION}");
    if !destination.contains_key(&key) {
        destination.insert(key, Value::String(title.to_string()));
    }
}
