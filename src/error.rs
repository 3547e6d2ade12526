//! Structured error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the configuration subsystem.
///
/// Load-time problems never surface as errors: a malformed persisted file or an
/// unreadable project file is logged and contributes an empty tree. Mutation-time
/// problems (`Persist`, `Json`) always propagate to the caller.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid config path: {0:?}")]
    InvalidPath(String),

    #[error("malformed config file {path}: {reason}")]
    MalformedPersistedConfig { path: PathBuf, reason: String },

    #[error("failed to persist config to {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub fn invalid_path(raw: impl Into<String>) -> Self {
        Self::InvalidPath(raw.into())
    }

    pub fn persist(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::MalformedPersistedConfig {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether this error must abort the invoking command.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::MalformedPersistedConfig { .. })
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
