//! Run-wide configuration and per-directory render request resolution
//!
//! A [`BaseConfig`] is built once from the command line. For every discovered
//! values file, the optional override document sitting next to it is merged
//! on top of the base to produce a [`RenderRequest`]. The base is never
//! mutated, so nothing leaks from one directory to the next.

use serde::Deserialize;
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::values::KeyValueAssignments;

/// Default name of the per-directory values document
pub const DEFAULT_VALUES_FILENAME: &str = "values.yaml";

/// Default name of the per-directory override document
pub const DEFAULT_OVERRIDE_FILENAME: &str = ".helm.yaml";

/// Configuration supplied once for the whole run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseConfig {
    /// Chart used when no override document names one
    pub chart: String,

    /// Version of the default chart
    pub chart_version: String,

    /// Post-render hook applied to every directory unless overridden
    pub post_render_binary: Option<String>,

    /// Filename of the override document
    pub override_filename: String,

    /// Filename of the values document
    pub values_filename: String,

    /// `--set` assignments applied on top of every values document
    pub assignments: KeyValueAssignments,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            chart: String::new(),
            chart_version: String::new(),
            post_render_binary: None,
            override_filename: DEFAULT_OVERRIDE_FILENAME.to_string(),
            values_filename: DEFAULT_VALUES_FILENAME.to_string(),
            assignments: KeyValueAssignments::default(),
        }
    }
}

/// Contents of a per-directory override document (`.helm.yaml`)
///
/// Every field is optional; a field left out inherits the base value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideDocument {
    #[serde(default)]
    pub chart: Option<String>,

    /// Accepts unquoted versions such as `chartVersion: 1.2`
    #[serde(default, deserialize_with = "scalar_as_string")]
    pub chart_version: Option<String>,

    #[serde(default)]
    pub post_render_binary: Option<String>,
}

fn scalar_as_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_yaml::Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(D::Error::custom("expected a scalar version string")),
    }
}

impl OverrideDocument {
    /// Parse an override document. An empty document overrides nothing.
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        let document: Option<Self> = serde_yaml::from_str(yaml)?;
        Ok(document.unwrap_or_default())
    }

    /// Load the override document at `path`
    ///
    /// Returns `Ok(None)` when the file does not exist. Any other read
    /// failure, or a document that does not parse, is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        Self::from_yaml(&content)
            .map(Some)
            .map_err(|source| CoreError::InvalidOverride {
                path: path.to_path_buf(),
                source,
            })
    }
}

/// Fully resolved configuration for rendering one directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub chart: String,
    pub chart_version: String,
    pub values_filename: String,
    pub override_filename: String,
    pub post_render_binary: Option<String>,
    pub assignments: KeyValueAssignments,
}

impl BaseConfig {
    /// Merge an optional override document into this configuration
    ///
    /// Fails when the resulting chart name or chart version is empty.
    pub fn resolve(&self, document: Option<&OverrideDocument>) -> Result<RenderRequest> {
        let document = document.cloned().unwrap_or_default();

        let chart = document.chart.unwrap_or_else(|| self.chart.clone());
        let chart_version = document
            .chart_version
            .unwrap_or_else(|| self.chart_version.clone());
        let post_render_binary = document
            .post_render_binary
            .or_else(|| self.post_render_binary.clone())
            .filter(|hook| !hook.is_empty());

        if chart.is_empty() {
            return Err(CoreError::MissingConfig { field: "chart" });
        }
        if chart_version.is_empty() {
            return Err(CoreError::MissingConfig {
                field: "chart version",
            });
        }

        Ok(RenderRequest {
            chart,
            chart_version,
            values_filename: self.values_filename.clone(),
            override_filename: self.override_filename.clone(),
            post_render_binary,
            assignments: self.assignments.clone(),
        })
    }
}
