//! Core error types

use std::path::PathBuf;
use thiserror::Error;

/// Broad category of a [`CoreError`], used to pick exit codes and help text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Io,
    Render,
    Decode,
    Validation,
    Structural,
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Key-value assignment is not of the form <key>=<value>: {assignment}")]
    MalformedAssignment { assignment: String },

    #[error("Key-value assignment cannot have an empty key: {assignment}")]
    EmptyAssignmentKey { assignment: String },

    #[error("Required configuration for default helm {field} missing")]
    MissingConfig { field: &'static str },

    #[error("Failed to parse {}: {source}", path.display())]
    InvalidOverride {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Root path not found: {}", path.display())]
    RootNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to walk directory tree: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Read values: {message}")]
    InvalidValues { message: String },

    #[error("Missing required field {fields:?}")]
    MissingValues { fields: Vec<String> },

    #[error("Error generating manifests for chart {chart}: {message}")]
    Render { chart: String, message: String },

    #[error("Post-render hook {hook} failed: {message}")]
    PostRender { hook: String, message: String },

    #[error("Failed to query cluster version: {message}")]
    Discovery { message: String },

    #[error("Error decoding yaml: {message}")]
    Decode { message: String },

    #[error("Invalid manifest: {message}")]
    Structural { message: String },

    #[error("{}: {error}", path.display())]
    Directory {
        path: PathBuf,
        error: Box<CoreError>,
    },
}

impl CoreError {
    /// Attach the directory being processed to an error
    pub fn in_directory(self, path: impl Into<PathBuf>) -> Self {
        Self::Directory {
            path: path.into(),
            error: Box::new(self),
        }
    }

    /// Category of this error, looking through directory context
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MalformedAssignment { .. }
            | Self::EmptyAssignmentKey { .. }
            | Self::MissingConfig { .. }
            | Self::InvalidOverride { .. } => ErrorKind::Configuration,
            Self::RootNotFound { .. } | Self::Io(_) | Self::Walk(_) | Self::Discovery { .. } => {
                ErrorKind::Io
            }
            Self::Render { .. } | Self::PostRender { .. } => ErrorKind::Render,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidValues { .. } | Self::MissingValues { .. } => ErrorKind::Validation,
            Self::Structural { .. } => ErrorKind::Structural,
            Self::Directory { error, .. } => error.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_context_keeps_kind() {
        let err = CoreError::MissingValues {
            fields: vec!["namespace".to_string()],
        }
        .in_directory("apps/web");

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(
            err.to_string(),
            "apps/web: Missing required field [\"namespace\"]"
        );
    }
}
