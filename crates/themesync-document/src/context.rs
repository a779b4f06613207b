//! Where the active configuration came from

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DocumentError;

/// Scope that produced the active document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Personal configuration of the signed-in user
    User,
    /// Configuration attached to one of the user's roles
    Role,
    /// Organization-wide configuration
    Organization,
    /// Global configuration
    #[default]
    Global,
    /// Pre-scoping configuration
    Legacy,
    /// Served from a local cache or built-in default
    Local,
}

impl ConfigSource {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Role => "role",
            Self::Organization => "organization",
            Self::Global => "global",
            Self::Legacy => "legacy",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigSource {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "user" | "personal" => Ok(Self::User),
            "role" => Ok(Self::Role),
            "organization" | "org" => Ok(Self::Organization),
            "global" => Ok(Self::Global),
            "legacy" => Ok(Self::Legacy),
            "local" => Ok(Self::Local),
            other => Err(DocumentError::Invalid(format!("unknown config source '{other}'"))),
        }
    }
}

/// Source of the active document and the actor's edit rights
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigContext {
    #[serde(default)]
    pub source: ConfigSource,
    #[serde(default)]
    pub is_global_admin: bool,
}

impl ConfigContext {
    /// Context for documents served without the store
    #[must_use]
    pub const fn local() -> Self {
        Self {
            source: ConfigSource::Local,
            is_global_admin: false,
        }
    }
}
