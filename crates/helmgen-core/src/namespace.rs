//! Namespace synthesis and injection
//!
//! Rendered charts don't create their own namespace and rely on the
//! namespace being passed to the client at apply time. Every batch therefore
//! gets a `Namespace` manifest prepended, and every rendered manifest gets
//! `metadata.namespace` set explicitly.

use indexmap::IndexMap;
use serde_yaml::{Mapping, Value};

use crate::error::{CoreError, Result};
use crate::manifest::Manifest;

/// Annotation telling the GitOps operator to only sync, never garbage-collect, the namespace
pub const SYNC_ONLY_ANNOTATION: &str = "fluxcd.io/sync_only";

/// Label always set to the namespace name
pub const NAME_LABEL: &str = "name";

/// Builder for a synthesized `Namespace` manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceSpec {
    name: String,
    labels: IndexMap<String, String>,
    annotations: IndexMap<String, String>,
}

impl NamespaceSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: IndexMap::new(),
            annotations: IndexMap::new(),
        }
    }

    /// Add a label. The `name` label is always overwritten with the namespace name.
    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    /// Add an annotation. An explicit sync marker value wins over the default.
    pub fn annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.insert(key.into(), value.into());
        self
    }

    /// Build the manifest (`apiVersion`, `kind`, `metadata` in that order)
    pub fn build(self) -> Manifest {
        let mut labels = self.labels;
        labels.insert(NAME_LABEL.to_string(), self.name.clone());

        let mut annotations = self.annotations;
        let sync_only = annotations
            .entry(SYNC_ONLY_ANNOTATION.to_string())
            .or_default();
        if sync_only.is_empty() {
            *sync_only = "true".to_string();
        }

        let mut metadata = Mapping::new();
        metadata.insert("name".into(), Value::String(self.name));
        metadata.insert("labels".into(), string_mapping(labels));
        metadata.insert("annotations".into(), string_mapping(annotations));

        let mut manifest = Manifest::new();
        manifest.insert("apiVersion", Value::String("v1".to_string()));
        manifest.insert("kind", Value::String("Namespace".to_string()));
        manifest.insert("metadata", Value::Mapping(metadata));
        manifest
    }
}

fn string_mapping(entries: IndexMap<String, String>) -> Value {
    Value::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (Value::String(k), Value::String(v)))
            .collect(),
    )
}

/// Namespace manifest with the default label and sync marker
pub fn create_namespace(namespace: &str) -> Manifest {
    NamespaceSpec::new(namespace).build()
}

/// Set `metadata.namespace` on every non-empty manifest
///
/// Existing namespaces are overwritten. Empty manifests are left untouched.
/// A non-empty manifest without a `metadata` mapping is rejected.
pub fn inject_namespace(manifests: &mut [Manifest], namespace: &str) -> Result<()> {
    for (index, manifest) in manifests.iter_mut().enumerate() {
        if manifest.is_empty() {
            continue;
        }

        match manifest.get_mut("metadata") {
            Some(Value::Mapping(metadata)) => {
                metadata.insert("namespace".into(), Value::String(namespace.to_string()));
            }
            Some(_) => {
                return Err(CoreError::Structural {
                    message: format!("metadata of manifest {} is not a mapping", index + 1),
                });
            }
            None => {
                return Err(CoreError::Structural {
                    message: format!("manifest {} has no metadata", index + 1),
                });
            }
        }
    }

    Ok(())
}

/// Turn rendered manifests into a batch: namespace manifest first, then the
/// rendered manifests with their namespace injected
pub fn namespaced_batch(namespace: &str, mut manifests: Vec<Manifest>) -> Result<Vec<Manifest>> {
    if manifests.is_empty() {
        return Err(CoreError::Structural {
            message: "chart rendered no manifests".to_string(),
        });
    }

    inject_namespace(&mut manifests, namespace)?;

    let mut batch = Vec::with_capacity(manifests.len() + 1);
    batch.push(create_namespace(namespace));
    batch.extend(manifests);
    Ok(batch)
}
