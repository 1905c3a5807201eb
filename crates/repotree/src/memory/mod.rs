// SPDX-FileCopyrightText: 2025 The repotree authors
//
// SPDX-License-Identifier: Apache-2.0

//! In-memory data for tree nodes.
//!
//! A [`Value`] is a nested mapping of named entries. [`MappingSource`] turns
//! one level of it into child nodes on demand, so a large document is only
//! materialized as far as the tree is expanded.

mod mapping;

pub use mapping::MappingSource;

use crate::attributes::AttrValue;

/// Nested in-memory data
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Scalar(AttrValue),
    Mapping(Vec<(String, Value)>),
    List(Vec<Value>),
}

impl Value {
    /// Builds a mapping from `(key, value)` pairs
    pub fn mapping<K: Into<String>, I: IntoIterator<Item = (K, Value)>>(entries: I) -> Self {
        Value::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn scalar<V: Into<AttrValue>>(v: V) -> Self {
        Value::Scalar(v.into())
    }

    /// Entries of a mapping or list, keyed by name or index
    pub fn entries(&self) -> Vec<(String, Value)> {
        match self {
            Value::Scalar(_) => Vec::new(),
            Value::Mapping(entries) => entries.clone(),
            Value::List(items) => items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect(),
        }
    }

    /// Wraps a list of items: all-scalar lists collapse into one list value
    fn from_items(items: Vec<Value>) -> Self {
        let scalars: Option<Vec<AttrValue>> = items
            .iter()
            .map(|item| match item {
                Value::Scalar(v) => Some(v.clone()),
                _ => None,
            })
            .collect();
        match scalars {
            Some(list) => Value::Scalar(AttrValue::List(list)),
            None => Value::List(items),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as Json;
        match v {
            Json::Null => Value::scalar("null"),
            Json::Bool(b) => Value::scalar(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::scalar(i),
                None => Value::scalar(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::scalar(s),
            Json::Array(items) => Value::from_items(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Mapping(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<serde_yaml_ng::Value> for Value {
    fn from(v: serde_yaml_ng::Value) -> Self {
        use serde_yaml_ng::Value as Yaml;
        match v {
            Yaml::Null => Value::scalar("null"),
            Yaml::Bool(b) => Value::scalar(b),
            Yaml::Number(n) => match n.as_i64() {
                Some(i) => Value::scalar(i),
                None => Value::scalar(n.as_f64().unwrap_or(f64::NAN)),
            },
            Yaml::String(s) => Value::scalar(s),
            Yaml::Sequence(items) => Value::from_items(items.into_iter().map(Value::from).collect()),
            Yaml::Mapping(map) => Value::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Value::from(v)))
                    .collect(),
            ),
            Yaml::Tagged(tagged) => Value::from(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml_ng::Value) -> String {
    match key {
        serde_yaml_ng::Value::String(s) => s,
        other => match Value::from(other) {
            Value::Scalar(v) => v.to_string(),
            _ => "?".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json: serde_json::Value = serde_json::json!({
            "name": "sst",
            "dims": [180, 360],
            "groups": [{"a": 1}, {"b": 2.5}],
        });
        let value = Value::from(json);
        let entries = value.entries();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["dims", "groups", "name"]);
        assert_eq!(
            entries[0].1,
            Value::Scalar(AttrValue::List(vec![AttrValue::Int(180), AttrValue::Int(360)]))
        );
        assert!(matches!(entries[1].1, Value::List(_)));
        assert_eq!(entries[1].1.entries()[1].0, "1");
    }

    #[test]
    fn test_from_yaml() {
        let yaml: serde_yaml_ng::Value =
            serde_yaml_ng::from_str("title: demo\n1: one\nnested:\n  x: true\n").unwrap();
        let entries = Value::from(yaml).entries();
        let keys: Vec<_> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["title", "1", "nested"]);
        assert_eq!(entries[2].1.entries()[0].1, Value::scalar(true));
    }
}
