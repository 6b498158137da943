//! Engine error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while rendering a chart or running an external process
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Chart not found: {}", path.display())]
    ChartNotFound { path: PathBuf },

    #[error("Invalid Chart.yaml: {message}")]
    InvalidChart { message: String },

    #[error("Chart {name} has version {found}, requested {requested}")]
    VersionMismatch {
        name: String,
        requested: String,
        found: String,
    },

    #[error("Invalid version constraint '{0}'")]
    InvalidVersion(String),

    #[error("Template error in {template}: {message}")]
    Template { template: String, message: String },

    #[error("Failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    ProcessFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{program} produced non UTF-8 output")]
    InvalidOutput { program: String },

    #[error("Unexpected kubectl output: {message}")]
    Discovery { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl EngineError {
    pub(crate) fn template(template: &str, err: minijinja::Error) -> Self {
        Self::Template {
            template: template.to_string(),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
