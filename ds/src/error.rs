//! Error types for the on-disk stores

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading or writing a persisted artifact
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("IO error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SyncError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = SyncError::io(
            "/tmp/README.md",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );

        let msg = err.to_string();
        assert!(msg.contains("/tmp/README.md"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_invalid_config_message() {
        let err = SyncError::InvalidConfig("history-limit must be at least 1".to_string());
        assert!(err.to_string().contains("history-limit"));
    }
}
