//! Rendering through the `helm template` CLI

use helmgen_core::{Capabilities, ChartRenderer, CoreError, ReleaseInfo, RenderRequest, Values};

use crate::process::run_with_input;

/// Default helm executable, looked up on `PATH`
pub const DEFAULT_HELM_BINARY: &str = "helm";

/// Renders charts by running `helm template` out of process
///
/// Values are passed as a YAML document on stdin (`--values -`), so nothing
/// is written to disk. Hooks are left out of the output, as they are for an
/// install.
#[derive(Debug, Clone)]
pub struct HelmRenderer {
    binary: String,
}

impl Default for HelmRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_HELM_BINARY)
    }
}

impl HelmRenderer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Arguments for one `helm template` invocation
    ///
    /// `--kube-version` is only passed when the version was detected, so
    /// helm otherwise falls back to its own default.
    pub fn args(
        request: &RenderRequest,
        release: &ReleaseInfo,
        capabilities: &Capabilities,
    ) -> Vec<String> {
        let mut args = vec![
            "template".to_string(),
            release.name.clone(),
            request.chart.clone(),
            "--version".to_string(),
            request.chart_version.clone(),
            "--namespace".to_string(),
            release.namespace.clone(),
            "--no-hooks".to_string(),
        ];

        if let Some(version) = capabilities.known_kube_version() {
            args.push("--kube-version".to_string());
            args.push(version.to_string());
        }

        args.push("--values".to_string());
        args.push("-".to_string());
        args
    }
}

impl ChartRenderer for HelmRenderer {
    fn render(
        &self,
        request: &RenderRequest,
        release: &ReleaseInfo,
        values: &Values,
        capabilities: &Capabilities,
    ) -> helmgen_core::Result<String> {
        let args = Self::args(request, release, capabilities);
        let input = values.to_yaml()?;

        tracing::debug!(
            helm = %self.binary,
            chart = %request.chart,
            version = %request.chart_version,
            release = %release.name,
            "running helm template"
        );

        run_with_input(&self.binary, &args, &input).map_err(|e| CoreError::Render {
            chart: request.chart.clone(),
            message: e.to_string(),
        })
    }
}
