//! Decoded Kubernetes manifests and multi-document YAML streams

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{CoreError, Result};
use crate::fingerprint::Fingerprint;

/// Document separator used when emitting a stream
pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// A single decoded document: an ordered mapping of keys to nested values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest(pub Mapping);

impl Manifest {
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    /// Parse a single YAML document into a manifest
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(yaml).map_err(|e| CoreError::Decode {
            message: e.to_string(),
        })?;
        Self::from_value(value, 0)
    }

    fn from_value(mut value: Value, index: usize) -> Result<Self> {
        value.apply_merge().map_err(|e| CoreError::Decode {
            message: format!("document {}: {}", index + 1, e),
        })?;

        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(mapping) => Ok(Self(mapping)),
            _ => Err(CoreError::Decode {
                message: format!("document {} is not a mapping", index + 1),
            }),
        }
    }

    /// Empty manifests come from templates that rendered nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.0.insert(Value::String(key.to_string()), value);
    }

    /// Resource kind, if declared
    pub fn kind(&self) -> Option<&str> {
        self.get("kind").and_then(Value::as_str)
    }

    /// Structural fingerprint of this manifest
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_mapping(&self.0)
    }

    pub fn inner(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for Manifest {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// Decode a multi-document YAML stream
///
/// Documents that are empty or hold only comments decode to empty manifests.
/// A document that is neither empty nor a mapping is a decode error. Merge
/// keys are resolved, so a manifest written with `<<: *anchor` equals its
/// expanded form.
pub fn decode_manifests(text: &str) -> Result<Vec<Manifest>> {
    let mut manifests = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(text).enumerate() {
        let value = Value::deserialize(document).map_err(|e| CoreError::Decode {
            message: e.to_string(),
        })?;
        manifests.push(Manifest::from_value(value, index)?);
    }

    Ok(manifests)
}

/// Serialize manifests as one multi-document YAML stream
pub fn encode_manifests<'a, I>(manifests: I) -> Result<String>
where
    I: IntoIterator<Item = &'a Manifest>,
{
    let mut out = String::new();

    for (index, manifest) in manifests.into_iter().enumerate() {
        if index > 0 {
            out.push_str(DOCUMENT_SEPARATOR);
        }
        let document = serde_yaml::to_string(manifest).map_err(|e| CoreError::Decode {
            message: e.to_string(),
        })?;
        out.push_str(&document);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_multiple_documents() {
        let text = r#"---
# Source: app/templates/service.yaml
apiVersion: v1
kind: Service
metadata:
  name: web
---
# Source: app/templates/deployment.yaml
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
"#;

        let manifests = decode_manifests(text).unwrap();

        assert_eq!(manifests.len(), 2);
        assert_eq!(manifests[0].kind(), Some("Service"));
        assert_eq!(manifests[1].kind(), Some("Deployment"));
    }

    #[test]
    fn test_decode_empty_documents() {
        let text = "---\n# Source: app/templates/disabled.yaml\n---\nkind: ConfigMap\nmetadata: {}\n";

        let manifests = decode_manifests(text).unwrap();

        assert_eq!(manifests.len(), 2);
        assert!(manifests[0].is_empty());
        assert_eq!(manifests[1].kind(), Some("ConfigMap"));
    }

    #[test]
    fn test_decode_rejects_scalar_document() {
        let err = decode_manifests("kind: Service\n---\njust a string\n").unwrap_err();

        assert!(matches!(err, CoreError::Decode { .. }));
        assert!(err.to_string().contains("document 2"));
    }

    #[test]
    fn test_decode_invalid_yaml() {
        let err = decode_manifests("kind: [Service\n").unwrap_err();
        assert!(matches!(err, CoreError::Decode { .. }));
    }

    #[test]
    fn test_decode_resolves_merge_keys() {
        let merged = decode_manifests(
            "kind: Deployment\nbase: &base\n  replicas: 2\nspec:\n  <<: *base\n  paused: false\n",
        )
        .unwrap();
        let expanded = decode_manifests(
            "kind: Deployment\nbase:\n  replicas: 2\nspec:\n  replicas: 2\n  paused: false\n",
        )
        .unwrap();

        let spec = merged[0].get("spec").unwrap();
        assert_eq!(spec["replicas"], Value::from(2));
        assert!(spec.get("<<").is_none());
        assert_eq!(merged[0].fingerprint(), expanded[0].fingerprint());
        assert!(!encode_manifests(&merged).unwrap().contains("<<"));
    }

    #[test]
    fn test_encode_stream() {
        let manifests = vec![
            Manifest::from_yaml("kind: A\n").unwrap(),
            Manifest::new(),
            Manifest::from_yaml("kind: B\n").unwrap(),
        ];

        let out = encode_manifests(&manifests).unwrap();

        insta::assert_snapshot!(out, @r###"
        kind: A
        ---
        {}
        ---
        kind: B
        "###);
    }

    #[test]
    fn test_encode_nothing() {
        let out = encode_manifests(&Vec::<Manifest>::new()).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_encode_preserves_key_order() {
        let manifest = Manifest::from_yaml("kind: Service\napiVersion: v1\n").unwrap();
        let out = encode_manifests([&manifest]).unwrap();

        assert_eq!(out, "kind: Service\napiVersion: v1\n");
    }
}
