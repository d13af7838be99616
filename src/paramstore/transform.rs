//! Key transform and materialization into a nested mapping.
//!
//! Each record's name goes through the optional caller-supplied transform,
//! the resulting flat `{key -> value}` map is then expanded on the delimiter
//! into nested JSON objects.

use serde_json::{Map, Value};
use std::sync::Arc;

use super::types::ParameterRecord;
use crate::error::{ParamResult, ParamStoreError};

/// Nested configuration mapping handed to callers. Leaves are JSON strings.
pub type NestedConfig = Map<String, Value>;

/// Pure name-to-key rewrite applied before nesting.
pub type KeyTransform = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Wrap a closure as a [`KeyTransform`].
pub fn key_transform<F>(f: F) -> KeyTransform
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Transform that removes `prefix` from the front of every name.
///
/// Names not starting with the prefix pass through unchanged. A name equal
/// to the prefix becomes the empty key, which `materialize` rejects.
pub fn strip_prefix(prefix: impl Into<String>) -> KeyTransform {
    let prefix = prefix.into();
    Arc::new(move |name: &str| {
        name.strip_prefix(prefix.as_str())
            .unwrap_or(name)
            .to_string()
    })
}

/// Build the nested mapping for a set of records.
///
/// # Errors
///
/// `ParamStoreError::EmptyKey` if any transformed key is `""`; no partial
/// mapping is returned.
pub fn materialize(
    records: &[ParameterRecord],
    transform: Option<&KeyTransform>,
    delimiter: &str,
) -> ParamResult<NestedConfig> {
    let mut flat: Vec<(String, String)> = Vec::with_capacity(records.len());

    for record in records {
        let key = match transform {
            Some(transform) => transform(&record.name),
            None => record.name.clone(),
        };

        if key.is_empty() {
            return Err(ParamStoreError::EmptyKey {
                name: record.name.clone(),
            });
        }

        flat.push((key, record.value.clone()));
    }

    Ok(unflatten(flat, delimiter))
}

/// Expand delimiter-separated keys into nested objects.
///
/// Entries are applied in order and the last write wins: a later leaf
/// replaces an earlier branch at the same key, and a later key that needs a
/// branch where a leaf sits replaces that leaf. An empty delimiter disables
/// splitting.
pub fn unflatten<I>(entries: I, delimiter: &str) -> NestedConfig
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = Map::new();

    for (key, value) in entries {
        let segments: Vec<&str> = if delimiter.is_empty() {
            vec![key.as_str()]
        } else {
            key.split(delimiter).collect()
        };
        insert_path(&mut root, &segments, Value::String(value));
    }

    root
}

fn insert_path(node: &mut Map<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [leaf] => {
            node.insert((*leaf).to_string(), value);
        }
        [head, rest @ ..] => {
            let child = node
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                insert_path(map, rest, value);
            }
        }
    }
}

/// Collapse a nested mapping back into delimiter-joined keys.
///
/// Non-string leaves are rendered as their JSON text.
pub fn flatten(config: &NestedConfig, delimiter: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into(config, delimiter, None, &mut out);
    out
}

fn flatten_into(
    node: &Map<String, Value>,
    delimiter: &str,
    prefix: Option<&str>,
    out: &mut Vec<(String, String)>,
) {
    for (key, value) in node {
        let full = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, delimiter, key),
            None => key.clone(),
        };
        match value {
            Value::Object(child) => flatten_into(child, delimiter, Some(&full), out),
            Value::String(s) => out.push((full, s.clone())),
            other => out.push((full, other.to_string())),
        }
    }
}
