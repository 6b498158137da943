//! CLI error types with exit code handling

use helmgen_core::{CoreError, ErrorKind};
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI error type that carries its exit code
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// Bad flags, missing chart configuration or an unparseable override file
    #[error("Configuration error: {message}")]
    #[diagnostic(code(helm_generate::config))]
    Configuration {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Missing required values or a manifest without metadata
    #[error("Validation failed: {message}")]
    #[diagnostic(code(helm_generate::validation))]
    Validation {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Chart rendering, post-render hook or decoding failed
    #[error("Render error: {message}")]
    #[diagnostic(code(helm_generate::render))]
    Render {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("IO error: {message}")]
    #[diagnostic(code(helm_generate::io))]
    Io { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Configuration { .. } => exit_codes::CONFIG_ERROR,
            CliError::Validation { .. } => exit_codes::VALIDATION_ERROR,
            CliError::Render { .. } => exit_codes::RENDER_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
        }
    }
}

fn help_for(err: &CoreError) -> Option<String> {
    let inner = match err {
        CoreError::Directory { error, .. } => error.as_ref(),
        other => other,
    };

    match inner {
        CoreError::MissingConfig { .. } => Some(
            "pass --default-chart and --default-chart-version, or set chart and chartVersion in the directory's override file"
                .to_string(),
        ),
        CoreError::MissingValues { .. } => Some(
            "every values file must define releaseName and namespace, or pass them with --set"
                .to_string(),
        ),
        CoreError::MalformedAssignment { .. } | CoreError::EmptyAssignmentKey { .. } => {
            Some("use --set key=value".to_string())
        }
        CoreError::Structural { .. } => {
            Some("every rendered manifest needs a metadata mapping".to_string())
        }
        _ => None,
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let help = help_for(&err);
        let message = err.to_string();

        match err.kind() {
            ErrorKind::Configuration => CliError::Configuration { message, help },
            ErrorKind::Validation | ErrorKind::Structural => {
                CliError::Validation { message, help }
            }
            ErrorKind::Render | ErrorKind::Decode => CliError::Render { message, help },
            ErrorKind::Io => CliError::Io { message },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let cases = [
            (
                CoreError::MissingConfig { field: "chart" },
                exit_codes::CONFIG_ERROR,
            ),
            (
                CoreError::MissingValues {
                    fields: vec!["namespace".to_string()],
                },
                exit_codes::VALIDATION_ERROR,
            ),
            (
                CoreError::Structural {
                    message: "metadata".to_string(),
                },
                exit_codes::VALIDATION_ERROR,
            ),
            (
                CoreError::Decode {
                    message: "bad".to_string(),
                },
                exit_codes::RENDER_ERROR,
            ),
            (
                CoreError::Render {
                    chart: "web".to_string(),
                    message: "boom".to_string(),
                },
                exit_codes::RENDER_ERROR,
            ),
            (
                CoreError::RootNotFound {
                    path: "missing".into(),
                },
                exit_codes::IO_ERROR,
            ),
        ];

        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn test_directory_context_keeps_help() {
        let err = CoreError::MissingConfig { field: "chart" }.in_directory("apps/web");
        let cli = CliError::from(err);

        match cli {
            CliError::Configuration { message, help } => {
                assert!(message.starts_with("apps/web: "));
                assert!(help.is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
