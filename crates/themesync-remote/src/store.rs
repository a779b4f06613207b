//! Remote configuration store contract

use async_trait::async_trait;
use std::fmt::Debug;
use themesync_document::{
    ConfigContext, ConfigurationDocument, NewPreset, PresetDocument, PresetUpdate,
};

/// Transport-level store failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Request never produced a response
    #[error("store unreachable: {0}")]
    Unreachable(String),

    /// Token missing, expired or insufficient
    #[error("unauthorized (status {0})")]
    Unauthorized(u16),

    /// Addressed resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Store refused the request on its merits
    #[error("rejected: {0}")]
    Rejected(String),

    /// Any other non-2xx status
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not decode
    #[error("undecodable response: {0}")]
    Decode(String),
}

/// Current document plus the context it was resolved in
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteConfig {
    pub document: ConfigurationDocument,
    pub context: ConfigContext,
}

impl RemoteConfig {
    /// Document with an explicit context
    #[inline]
    #[must_use]
    pub fn new(document: ConfigurationDocument, context: ConfigContext) -> Self {
        Self { document, context }
    }
}

/// Authenticated document and preset endpoints
///
/// Every call carries the bearer token obtained from a
/// [`crate::TokenProvider`].
#[async_trait]
pub trait RemoteConfigStore: Send + Sync + Debug {
    /// Currently effective document; `Ok(None)` when the store has none
    async fn get_current_config(&self, token: &str) -> Result<Option<RemoteConfig>, StoreError>;

    /// Persist a document and return the stored version
    async fn save_config(
        &self,
        token: &str,
        document: &ConfigurationDocument,
    ) -> Result<ConfigurationDocument, StoreError>;

    /// All presets visible to the caller
    async fn get_presets(&self, token: &str) -> Result<Vec<PresetDocument>, StoreError>;

    /// Create a user preset
    async fn create_preset(
        &self,
        token: &str,
        preset: &NewPreset,
    ) -> Result<PresetDocument, StoreError>;

    /// Update a user preset
    async fn update_preset(
        &self,
        token: &str,
        id: &str,
        update: &PresetUpdate,
    ) -> Result<PresetDocument, StoreError>;

    /// Delete a user preset
    async fn delete_preset(&self, token: &str, id: &str) -> Result<(), StoreError>;
}
