//! Release information derived from a directory's values

use serde::{Deserialize, Serialize};

/// Release identity handed to the chart renderer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseInfo {
    /// Release name
    pub name: String,

    /// Target namespace
    pub namespace: String,

    /// Revision number (always 1, nothing is ever upgraded)
    pub revision: u32,

    /// Service rendering the release
    pub service: String,
}

impl ReleaseInfo {
    /// Create release info for a fresh, client-only install
    pub fn for_install(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            revision: 1,
            service: "Helm".to_string(),
        }
    }
}
