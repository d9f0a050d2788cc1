//! Configuration properties exposed to expressions.
//!
//! Nested YAML mappings are flattened into dotted keys, so
//! `{{Properties.current.api.host}}` reads `api: { host: ... }`.

use super::PathValue;
use crate::error::{AssayError, Result};
use crate::value::Value;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties {
    values: BTreeMap<String, Value>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatten a YAML mapping into dotted keys.
    pub fn from_yaml(mapping: &serde_yaml::Mapping) -> Self {
        let mut properties = Self::new();
        properties.flatten("", mapping);
        properties
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn flatten(&mut self, prefix: &str, mapping: &serde_yaml::Mapping) {
        for (key, value) in mapping {
            let Some(key) = yaml_key(key) else {
                continue;
            };
            let full_key = if prefix.is_empty() {
                key
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                serde_yaml::Value::Mapping(nested) => self.flatten(&full_key, nested),
                leaf => {
                    self.values.insert(full_key, yaml_to_value(leaf));
                }
            }
        }
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_to_value(yaml: &serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(*b),
        serde_yaml::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        serde_yaml::Value::String(s) => Value::String(s.clone()),
        serde_yaml::Value::Sequence(items) => Value::Array(items.iter().map(yaml_to_value).collect()),
        serde_yaml::Value::Mapping(map) => Value::Object(
            map.iter()
                .filter_map(|(k, v)| yaml_key(k).map(|k| (k, yaml_to_value(v))))
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

impl PathValue for Properties {
    fn path_value(&self, path: &str) -> Result<Value> {
        self.values
            .get(path)
            .cloned()
            .ok_or_else(|| AssayError::UnknownPath {
                component: super::PROPERTIES,
                path: path.to_string(),
            })
    }
}
