//! Resolver error taxonomy

use themesync_document::{ErrorInfo, FailureReason};

use crate::store::StoreError;

/// Load and save failures surfaced to callers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Store unreachable or returned a non-2xx status
    #[error("network error: {0}")]
    Network(String),

    /// Missing or rejected bearer token
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Nothing usable from the store and nothing cached
    #[error("validation failed: {0}")]
    Validation(String),

    /// System presets are read-only
    #[error("preset '{0}' is a system preset and cannot be modified")]
    SystemPreset(String),

    /// Anything else
    #[error("{0}")]
    Unknown(String),
}

impl SyncError {
    /// Classification carried in state
    #[must_use]
    pub const fn reason(&self) -> FailureReason {
        match self {
            Self::Network(_) => FailureReason::Network,
            Self::Auth(_) => FailureReason::Auth,
            Self::Validation(_) | Self::SystemPreset(_) => FailureReason::Validation,
            Self::Unknown(_) => FailureReason::Unknown,
        }
    }

    /// State representation
    #[must_use]
    pub fn to_info(&self) -> ErrorInfo {
        ErrorInfo::new(self.reason(), self.to_string())
    }
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unreachable(_) | StoreError::Status { .. } => Self::Network(err.to_string()),
            StoreError::Unauthorized(_) => Self::Auth(err.to_string()),
            StoreError::NotFound(_) | StoreError::Rejected(_) | StoreError::Decode(_) => {
                Self::Validation(err.to_string())
            }
        }
    }
}

/// Result alias for resolver operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_classified() {
        let cases = [
            (StoreError::Unreachable("refused".into()), FailureReason::Network),
            (
                StoreError::Status {
                    status: 503,
                    body: String::new(),
                },
                FailureReason::Network,
            ),
            (StoreError::Unauthorized(401), FailureReason::Auth),
            (StoreError::Decode("eof".into()), FailureReason::Validation),
            (StoreError::Rejected("system".into()), FailureReason::Validation),
        ];
        for (store_err, reason) in cases {
            assert_eq!(SyncError::from(store_err).reason(), reason);
        }
    }

    #[test]
    fn info_carries_message() {
        let info = SyncError::Auth("no bearer token".into()).to_info();
        assert_eq!(info.reason, FailureReason::Auth);
        assert_eq!(info.message, "authentication failed: no bearer token");
    }
}
