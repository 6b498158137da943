//! Local chart renderer based on MiniJinja

use std::path::{Path, PathBuf};

use helmgen_core::{
    Capabilities, ChartRenderer, CoreError, ReleaseInfo, RenderRequest, Values,
};
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use crate::chart::LocalChart;
use crate::error::{EngineError, Result};
use crate::filters;

/// Chart fields exposed to templates as `chart`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChartContext<'a> {
    name: &'a str,
    version: &'a str,
    app_version: Option<&'a str>,
}

/// Builder for [`LocalChartRenderer`]
pub struct LocalChartRendererBuilder {
    strict_mode: bool,
    chart_root: Option<PathBuf>,
}

impl Default for LocalChartRendererBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalChartRendererBuilder {
    pub fn new() -> Self {
        Self {
            strict_mode: true,
            chart_root: None,
        }
    }

    /// Set strict mode (fail on undefined variables)
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict_mode = strict;
        self
    }

    /// Resolve relative chart references against `root` instead of the working directory
    pub fn chart_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.chart_root = Some(root.into());
        self
    }

    pub fn build(self) -> LocalChartRenderer {
        LocalChartRenderer {
            strict_mode: self.strict_mode,
            chart_root: self.chart_root,
        }
    }
}

/// Renders charts that live in local directories
#[derive(Debug, Clone)]
pub struct LocalChartRenderer {
    strict_mode: bool,
    chart_root: Option<PathBuf>,
}

impl Default for LocalChartRenderer {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LocalChartRenderer {
    pub fn builder() -> LocalChartRendererBuilder {
        LocalChartRendererBuilder::new()
    }

    fn create_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();

        if self.strict_mode {
            env.set_undefined_behavior(UndefinedBehavior::Strict);
        } else {
            env.set_undefined_behavior(UndefinedBehavior::Lenient);
        }
        // Keep the trailing newline of each template
        env.set_keep_trailing_newline(true);

        filters::register(&mut env);
        env
    }

    fn chart_path(&self, chart: &str) -> PathBuf {
        let path = Path::new(chart);
        match &self.chart_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Render every template of `chart` into one multi-document stream
    pub fn render_chart(
        &self,
        chart: &LocalChart,
        version: &str,
        release: &ReleaseInfo,
        values: &Values,
        capabilities: &Capabilities,
    ) -> Result<String> {
        chart.check_version(version)?;

        let mut merged = chart.default_values()?;
        merged.merge(values);

        let mut env = self.create_environment();
        let template_files = chart.template_files()?;

        let mut names = Vec::with_capacity(template_files.len());
        for file_path in &template_files {
            let name = file_path
                .strip_prefix(&chart.templates_dir)
                .unwrap_or(file_path)
                .to_string_lossy()
                .replace('\\', "/");
            let content = std::fs::read_to_string(file_path)?;

            env.add_template_owned(name.clone(), content)
                .map_err(|e| EngineError::template(&name, e))?;
            names.push(name);
        }

        let ctx = minijinja::context! {
            values => merged.inner(),
            release => release,
            chart => ChartContext {
                name: chart.name(),
                version: chart.metadata.version.as_deref().unwrap_or(version),
                app_version: chart.metadata.app_version.as_deref(),
            },
            capabilities => capabilities,
        };

        let mut output = String::new();
        for name in &names {
            let file_name = name.rsplit('/').next().unwrap_or(name);
            if file_name.starts_with('_') || file_name.eq_ignore_ascii_case("NOTES.txt") {
                continue;
            }

            let tmpl = env
                .get_template(name)
                .map_err(|e| EngineError::template(name, e))?;
            let rendered = tmpl
                .render(&ctx)
                .map_err(|e| EngineError::template(name, e))?;

            let trimmed = rendered.trim();
            if trimmed.is_empty() || trimmed == "---" {
                continue;
            }

            output.push_str("---\n");
            output.push_str(&format!("# Source: {}/templates/{}\n", chart.name(), name));
            output.push_str(rendered.trim_start_matches("---\n"));
            if !output.ends_with('\n') {
                output.push('\n');
            }
        }

        tracing::debug!(
            chart = chart.name(),
            templates = names.len(),
            "rendered local chart"
        );

        Ok(output)
    }
}

impl ChartRenderer for LocalChartRenderer {
    fn render(
        &self,
        request: &RenderRequest,
        release: &ReleaseInfo,
        values: &Values,
        capabilities: &Capabilities,
    ) -> helmgen_core::Result<String> {
        let to_core = |e: EngineError| CoreError::Render {
            chart: request.chart.clone(),
            message: e.to_string(),
        };

        let chart = LocalChart::load(self.chart_path(&request.chart)).map_err(to_core)?;
        self.render_chart(&chart, &request.chart_version, release, values, capabilities)
            .map_err(to_core)
    }
}
