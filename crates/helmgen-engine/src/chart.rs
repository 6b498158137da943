//! Local chart directories
//!
//! A chart directory holds `Chart.yaml`, an optional `values.yaml` with
//! defaults and a `templates/` directory.

use std::path::{Path, PathBuf};

use helmgen_core::Values;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

pub const CHART_FILENAME: &str = "Chart.yaml";
pub const CHART_VALUES_FILENAME: &str = "values.yaml";
pub const TEMPLATES_DIR: &str = "templates";

/// Metadata read from `Chart.yaml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartMetadata {
    pub name: String,

    #[serde(default, deserialize_with = "scalar_as_string")]
    pub version: Option<String>,

    #[serde(default, deserialize_with = "scalar_as_string")]
    pub app_version: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
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
        Some(_) => Err(D::Error::custom("expected a scalar version")),
    }
}

/// A chart directory loaded from disk
#[derive(Debug, Clone)]
pub struct LocalChart {
    pub metadata: ChartMetadata,

    /// Root directory of the chart
    pub root: PathBuf,

    pub templates_dir: PathBuf,
}

impl LocalChart {
    /// Load a chart from a directory
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let root = path.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(EngineError::ChartNotFound { path: root });
        }

        let chart_file = root.join(CHART_FILENAME);
        if !chart_file.is_file() {
            return Err(EngineError::InvalidChart {
                message: format!("{} not found in {}", CHART_FILENAME, root.display()),
            });
        }

        let content = std::fs::read_to_string(&chart_file)?;
        let metadata: ChartMetadata = serde_yaml::from_str(&content)?;

        if metadata.name.trim().is_empty() {
            return Err(EngineError::InvalidChart {
                message: format!("{} has an empty name", chart_file.display()),
            });
        }

        let templates_dir = root.join(TEMPLATES_DIR);

        Ok(Self {
            metadata,
            root,
            templates_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Check the chart against a requested version
    ///
    /// A requested version that parses as semver must match exactly,
    /// otherwise it is treated as a range such as `^1.2`. Charts that
    /// declare no version accept any request.
    pub fn check_version(&self, requested: &str) -> Result<()> {
        let Some(found) = self.metadata.version.as_deref() else {
            return Ok(());
        };

        let mismatch = || EngineError::VersionMismatch {
            name: self.metadata.name.clone(),
            requested: requested.to_string(),
            found: found.to_string(),
        };

        let Ok(found_version) = Version::parse(found.trim_start_matches('v')) else {
            return if found == requested { Ok(()) } else { Err(mismatch()) };
        };

        let requested_trimmed = requested.trim().trim_start_matches('v');
        if let Ok(exact) = Version::parse(requested_trimmed) {
            return if exact == found_version { Ok(()) } else { Err(mismatch()) };
        }

        let req = VersionReq::parse(requested.trim())
            .map_err(|_| EngineError::InvalidVersion(requested.to_string()))?;
        if req.matches(&found_version) {
            Ok(())
        } else {
            Err(mismatch())
        }
    }

    /// Default values shipped with the chart
    pub fn default_values(&self) -> Result<Values> {
        let path = self.root.join(CHART_VALUES_FILENAME);
        if !path.is_file() {
            return Ok(Values::new());
        }

        let content = std::fs::read_to_string(&path)?;
        Values::from_yaml(&content).map_err(|e| EngineError::InvalidChart {
            message: format!("{}: {}", path.display(), e),
        })
    }

    /// Template files under `templates/`, sorted by path
    pub fn template_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        if !self.templates_dir.is_dir() {
            return Ok(files);
        }

        for entry in walkdir::WalkDir::new(&self.templates_dir) {
            let entry = entry.map_err(|e| EngineError::InvalidChart {
                message: format!("failed to list templates: {e}"),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(ext) = path.extension() {
                let ext = ext.to_string_lossy().to_lowercase();
                if matches!(ext.as_str(), "yaml" | "yml" | "tpl" | "txt" | "json") {
                    files.push(path.to_path_buf());
                }
            }
        }

        files.sort();
        Ok(files)
    }
}
