//! Named reference configurations

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::ConfigurationDocument;

/// A named, immutable reference configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub config: ConfigurationDocument,
    /// Shipped by the server; cannot be edited or deleted
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating a preset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPreset {
    pub name: String,
    pub description: String,
    pub config: ConfigurationDocument,
}

impl NewPreset {
    /// Preset snapshot of `config`
    #[must_use]
    pub fn from_config(
        name: impl Into<String>,
        description: impl Into<String>,
        config: &ConfigurationDocument,
    ) -> Self {
        let mut config = config.clone();
        config.id = None;
        config.created_at = None;
        config.updated_at = None;
        Self {
            name: name.into(),
            description: description.into(),
            config,
        }
    }
}

/// Body for a full preset update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetUpdate {
    pub name: String,
    pub description: String,
    pub config: ConfigurationDocument,
    pub is_default: bool,
}

impl From<&PresetDocument> for PresetUpdate {
    fn from(preset: &PresetDocument) -> Self {
        Self {
            name: preset.name.clone(),
            description: preset.description.clone(),
            config: preset.config.clone(),
            is_default: preset.is_default,
        }
    }
}
