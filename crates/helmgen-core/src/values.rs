//! Values handling: values documents, deep merge and `--set` assignments

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::release::ReleaseInfo;

/// Key holding the release name in a values document
pub const RELEASE_NAME_KEY: &str = "releaseName";

/// Key holding the target namespace in a values document
pub const NAMESPACE_KEY: &str = "namespace";

/// Values container with deep merge capability
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub JsonValue);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(JsonValue::Object(serde_json::Map::new()))
    }

    /// Load values from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse values from YAML string
    ///
    /// An empty document yields empty values. Anything other than a mapping
    /// at the top level is rejected. Merge keys (`<<: *anchor`) are resolved.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let invalid = |e: serde_yaml::Error| CoreError::InvalidValues {
            message: e.to_string(),
        };

        let mut document: serde_yaml::Value = serde_yaml::from_str(yaml).map_err(invalid)?;
        document.apply_merge().map_err(invalid)?;
        let value: JsonValue = serde_yaml::from_value(document).map_err(invalid)?;

        match value {
            JsonValue::Null => Ok(Self::new()),
            JsonValue::Object(_) => Ok(Self(value)),
            other => Err(CoreError::InvalidValues {
                message: format!("expected a mapping at the top level, found {}", type_name(&other)),
            }),
        }
    }

    /// Deep merge another Values into this one
    ///
    /// Rules:
    /// - Scalars: overlay replaces base
    /// - Objects: recursive merge
    /// - Arrays: overlay replaces base (not appended)
    pub fn merge(&mut self, overlay: &Values) {
        deep_merge(&mut self.0, &overlay.0);
    }

    /// Set a top-level key, replacing any previous value
    pub fn insert(&mut self, key: &str, value: JsonValue) {
        if !self.0.is_object() {
            self.0 = JsonValue::Object(serde_json::Map::new());
        }
        if let JsonValue::Object(map) = &mut self.0 {
            map.insert(key.to_string(), value);
        }
    }

    /// Apply `--set` assignments as top-level string values
    pub fn apply_assignments(&mut self, assignments: &KeyValueAssignments) {
        for (key, value) in assignments.iter() {
            self.insert(key, JsonValue::String(value.to_string()));
        }
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let parts: Vec<&str> = path.split('.').collect();
        get_nested(&self.0, &parts)
    }

    /// Extract the release name and namespace every chart render needs
    ///
    /// Both keys must be present as non-empty strings. All missing keys are
    /// reported together.
    pub fn release_info(&self) -> Result<ReleaseInfo> {
        let name = self.required_string(RELEASE_NAME_KEY);
        let namespace = self.required_string(NAMESPACE_KEY);

        match (name, namespace) {
            (Some(name), Some(namespace)) => Ok(ReleaseInfo::for_install(name, namespace)),
            (name, namespace) => {
                let mut fields = Vec::new();
                if name.is_none() {
                    fields.push(RELEASE_NAME_KEY.to_string());
                }
                if namespace.is_none() {
                    fields.push(NAMESPACE_KEY.to_string());
                }
                Err(CoreError::MissingValues { fields })
            }
        }
    }

    fn required_string(&self, key: &str) -> Option<&str> {
        match &self.0 {
            JsonValue::Object(map) => map
                .get(key)
                .and_then(JsonValue::as_str)
                .filter(|s| !s.is_empty()),
            _ => None,
        }
    }

    /// Get the inner JSON value
    pub fn inner(&self) -> &JsonValue {
        &self.0
    }

    /// Check if values are empty
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            JsonValue::Object(map) => map.is_empty(),
            JsonValue::Null => true,
            _ => false,
        }
    }

    /// Serialize back to a YAML document
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(&self.0).map_err(|e| CoreError::InvalidValues {
            message: e.to_string(),
        })
    }
}

/// Deep merge two JSON values
fn deep_merge(base: &mut JsonValue, overlay: &JsonValue) {
    match (base, overlay) {
        (JsonValue::Object(base_map), JsonValue::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => {
                        base_map.insert(key.clone(), overlay_value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Get a nested value by path
fn get_nested<'a>(value: &'a JsonValue, path: &[&str]) -> Option<&'a JsonValue> {
    let Some((key, remaining)) = path.split_first() else {
        return Some(value);
    };

    match value {
        JsonValue::Object(map) => map.get(*key).and_then(|v| get_nested(v, remaining)),
        _ => None,
    }
}

fn type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "a sequence",
        JsonValue::Object(_) => "a mapping",
    }
}

/// Parsed `--set key=value` assignments
///
/// Keys keep the order of their first appearance; a repeated key keeps the
/// last value given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyValueAssignments(IndexMap<String, String>);

impl KeyValueAssignments {
    /// Parse raw `key=value` strings
    ///
    /// Each string must contain exactly one `=` and a non-empty key.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let mut assignments = IndexMap::new();

        for arg in raw {
            let arg = arg.as_ref();
            let mut parts = arg.split('=');
            let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err(CoreError::MalformedAssignment {
                    assignment: arg.to_string(),
                });
            };

            if key.is_empty() {
                return Err(CoreError::EmptyAssignmentKey {
                    assignment: arg.to_string(),
                });
            }

            assignments.insert(key.to_string(), value.to_string());
        }

        Ok(Self(assignments))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
