//! Cluster version discovery through `kubectl`

use helmgen_core::{CoreError, ServerVersionDiscovery};
use serde::Deserialize;

use crate::error::{EngineError, Result};
use crate::process::run_with_input;

/// Default kubectl executable, looked up on `PATH`
pub const DEFAULT_KUBECTL_BINARY: &str = "kubectl";

/// Queries the current kubeconfig context with `kubectl version -o json`
#[derive(Debug, Clone)]
pub struct KubectlDiscovery {
    binary: String,
}

impl Default for KubectlDiscovery {
    fn default() -> Self {
        Self::new(DEFAULT_KUBECTL_BINARY)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionOutput {
    server_version: Option<VersionInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VersionInfo {
    git_version: String,
}

impl KubectlDiscovery {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn args() -> Vec<String> {
        ["version", "--output", "json", "--request-timeout", "10s"]
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Extract `serverVersion.gitVersion` from `kubectl version` output
    pub fn parse_server_version(output: &str) -> Result<String> {
        let parsed: VersionOutput =
            serde_json::from_str(output).map_err(|e| EngineError::Discovery {
                message: e.to_string(),
            })?;

        parsed
            .server_version
            .map(|server| server.git_version)
            .ok_or_else(|| EngineError::Discovery {
                message: "no serverVersion in kubectl output".to_string(),
            })
    }

    fn query(&self) -> Result<String> {
        let output = run_with_input(&self.binary, &Self::args(), "")?;
        Self::parse_server_version(&output)
    }
}

impl ServerVersionDiscovery for KubectlDiscovery {
    fn server_version(&self) -> helmgen_core::Result<String> {
        tracing::debug!(kubectl = %self.binary, "querying cluster version");

        self.query().map_err(|e| CoreError::Discovery {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_version() {
        let output = r#"{
  "clientVersion": {"major": "1", "minor": "30", "gitVersion": "v1.30.1"},
  "kustomizeVersion": "v5.0.4",
  "serverVersion": {"major": "1", "minor": "29+", "gitVersion": "v1.29.4-eks-036c24b", "platform": "linux/amd64"}
}"#;

        let version = KubectlDiscovery::parse_server_version(output).unwrap();
        assert_eq!(version, "v1.29.4-eks-036c24b");
    }

    #[test]
    fn test_parse_client_only_output() {
        let output = r#"{"clientVersion": {"gitVersion": "v1.30.1"}}"#;

        let err = KubectlDiscovery::parse_server_version(output).unwrap_err();
        assert!(matches!(err, EngineError::Discovery { .. }));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(KubectlDiscovery::parse_server_version("Unable to connect").is_err());
    }

    #[test]
    fn test_missing_kubectl_is_discovery_error() {
        let err = KubectlDiscovery::new("/nonexistent/kubectl")
            .server_version()
            .unwrap_err();
        assert!(matches!(err, CoreError::Discovery { .. }));
    }

    #[test]
    fn test_missing_kubectl_falls_back_to_default() {
        let discovery = KubectlDiscovery::new("/nonexistent/kubectl");
        let caps = helmgen_core::Capabilities::resolve(None, &discovery);

        assert_eq!(caps.known_kube_version(), None);
    }
}
