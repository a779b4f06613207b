//! Error types for themesync core

use std::path::{Path, PathBuf};

use themesync_remote::StoreError;

/// Runtime configuration and bootstrap failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file unreadable
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for [`crate::SyncConfig`]
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field or environment override has an unusable value
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// Store client could not be constructed
    #[error("store client: {0}")]
    Store(#[from] StoreError),

    /// Global subscriber already installed or rejected
    #[error("logging: {0}")]
    Logging(String),
}

impl ConfigError {
    /// IO error at `path`
    pub fn io_error(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Invalid value for `key`
    pub fn invalid(key: &str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;
