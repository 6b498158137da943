//! Generate command - render a tree of values files into one stream

use std::path::PathBuf;

use clap::ValueEnum;
use helmgen_core::{Aggregator, BaseConfig, Capabilities, ChartRenderer, KeyValueAssignments};
use helmgen_engine::{ExecPostRenderer, HelmRenderer, KubectlDiscovery, LocalChartRenderer};

use crate::error::Result;

/// Which renderer expands charts
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// Run `helm template`
    Helm,
    /// Render local chart directories with the built-in template engine
    Local,
}

/// Everything a run needs, as collected from flags and environment
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub root: PathBuf,
    pub default_chart: String,
    pub default_chart_version: String,
    pub override_filename: String,
    pub values_filename: String,
    pub post_render_binary: Option<String>,
    pub set: Vec<String>,
    pub engine: EngineKind,
    pub helm_binary: String,
    pub kubectl_binary: String,
}

impl GenerateOptions {
    /// Build the run-wide base configuration
    ///
    /// Malformed `--set` pairs fail here, before any directory is rendered.
    pub fn base_config(&self) -> Result<BaseConfig> {
        let assignments = KeyValueAssignments::parse(&self.set)?;

        Ok(BaseConfig {
            chart: self.default_chart.clone(),
            chart_version: self.default_chart_version.clone(),
            post_render_binary: self.post_render_binary.clone(),
            override_filename: self.override_filename.clone(),
            values_filename: self.values_filename.clone(),
            assignments,
        })
    }

    fn renderer(&self) -> Box<dyn ChartRenderer> {
        match self.engine {
            EngineKind::Helm => Box::new(HelmRenderer::new(self.helm_binary.clone())),
            EngineKind::Local => Box::new(LocalChartRenderer::default()),
        }
    }
}

/// Run the pipeline and return the serialized manifest stream
pub fn run(options: &GenerateOptions) -> Result<String> {
    let config = options.base_config()?;

    tracing::debug!(
        root = %options.root.display(),
        engine = ?options.engine,
        chart = %config.chart,
        version = %config.chart_version,
        assignments = config.assignments.len(),
        "starting run"
    );

    let discovery = KubectlDiscovery::new(options.kubectl_binary.clone());
    let aggregator = Aggregator::new(config, options.renderer(), ExecPostRenderer)
        .with_capabilities(Capabilities::from_env(&discovery));

    Ok(aggregator.generate(&options.root)?)
}
