//! Error types shared across the workspace
//!
//! - [`DocumentError`]: structural problems in a configuration document
//! - [`CompareError`]: normalization failures (always recovered locally)
//! - [`FailureReason`] / [`ErrorInfo`]: the user-facing classification of a
//!   load or save failure, carried in state

use std::fmt;

use serde::{Deserialize, Serialize};

/// Structural document errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// A palette is missing one of the required shade keys
    #[error("palette '{palette}' is missing shade {shade}")]
    MissingShade { palette: String, shade: String },

    /// Document could not be decoded
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// Errors while normalizing a document for comparison
#[derive(Debug, thiserror::Error)]
pub enum CompareError {
    /// Serialization to JSON failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Why a load or save failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureReason {
    /// Store unreachable or non-2xx
    Network,
    /// Missing or rejected bearer token
    Auth,
    /// Store returned nothing usable and no cache exists
    Validation,
    /// Anything else
    Unknown,
}

impl FailureReason {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Validation => "validation",
            Self::Unknown => "unknown",
        }
    }

    /// Whether a retry affordance makes sense
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::Validation | Self::Unknown)
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure as recorded in state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub reason: FailureReason,
    pub message: String,
}

impl ErrorInfo {
    /// Create error info
    #[must_use]
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.reason, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_shade_display() {
        let err = DocumentError::MissingShade {
            palette: "primary".to_string(),
            shade: "500".to_string(),
        };
        assert_eq!(err.to_string(), "palette 'primary' is missing shade 500");
    }

    #[test]
    fn reason_names() {
        assert_eq!(FailureReason::Network.to_string(), "network");
        assert_eq!(
            serde_json::to_string(&FailureReason::Validation).unwrap(),
            "\"validation\""
        );
        assert!(!FailureReason::Auth.is_retryable());
    }

    #[test]
    fn error_info_display() {
        let info = ErrorInfo::new(FailureReason::Auth, "no token");
        assert_eq!(info.to_string(), "auth error: no token");
    }
}
