//! Storage errors
//!
//! Every tier swallows these and treats the read as a miss; they are surfaced
//! only to callers that use a store directly.

use std::path::PathBuf;

/// Errors from a key-value store or a snapshot decode
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// IO error on the backing file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be decoded
    #[error("corrupt stored data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Stored timestamp is not an integer
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

impl StorageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_display() {
        let err = StorageError::io_error(
            "/tmp/store.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.to_string().starts_with("io error on /tmp/store.json"));
    }

    #[test]
    fn corrupt_from_json() {
        let json_err = serde_json::from_str::<u8>("nope").unwrap_err();
        let err: StorageError = json_err.into();
        assert!(matches!(err, StorageError::Corrupt(_)));
    }
}
