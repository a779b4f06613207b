//! Persistent configuration cache
//!
//! Stores the last resolved document under one key and its write time
//! (epoch milliseconds) under another. The identity of the user who wrote it
//! is recorded under a third key so a different user never reads it.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use themesync_document::ConfigurationDocument;

use crate::error::{StorageError, StorageResult};
use crate::store::KeyValueStore;

/// Key holding the serialized document
pub const CONFIG_KEY: &str = "themesync.config";
/// Key holding the write time (epoch millis)
pub const TIMESTAMP_KEY: &str = "themesync.config.timestamp";
/// Key holding the identity the cache belongs to
pub const IDENTITY_KEY: &str = "themesync.config.identity";

/// Document cache over a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct PersistentConfigCache {
    store: Arc<dyn KeyValueStore>,
}

impl PersistentConfigCache {
    /// Wrap a store
    #[inline]
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Underlying store
    #[inline]
    #[must_use]
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Read the document if younger than `ttl`; stale data is removed.
    ///
    /// # Errors
    /// Returns error on storage failure or undecodable data
    pub fn load(&self, ttl: Duration) -> StorageResult<Option<ConfigurationDocument>> {
        let Some(written_at) = self.written_at_millis()? else {
            return Ok(None);
        };

        let age_ms = Utc::now().timestamp_millis().saturating_sub(written_at);
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        if age_ms > ttl_ms {
            tracing::debug!(age_ms, ttl_ms, "persistent configuration expired");
            self.clear()?;
            return Ok(None);
        }

        match self.store.get(CONFIG_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Raw serialized document, regardless of age
    ///
    /// # Errors
    /// Returns error on storage failure
    pub fn raw_document(&self) -> StorageResult<Option<String>> {
        self.store.get(CONFIG_KEY)
    }

    /// Write the document stamped with the current time
    ///
    /// # Errors
    /// Returns error on storage failure
    pub fn store_document(&self, doc: &ConfigurationDocument) -> StorageResult<()> {
        let json = serde_json::to_string(doc)?;
        self.store.set(CONFIG_KEY, &json)?;
        self.store
            .set(TIMESTAMP_KEY, &Utc::now().timestamp_millis().to_string())
    }

    /// Remove document and timestamp
    ///
    /// # Errors
    /// Returns error on storage failure
    pub fn clear(&self) -> StorageResult<()> {
        self.store.remove(CONFIG_KEY)?;
        self.store.remove(TIMESTAMP_KEY)
    }

    /// Record `user_id` as owner, clearing the cache if it belonged to
    /// someone else. Returns whether anything was cleared.
    ///
    /// # Errors
    /// Returns error on storage failure
    pub fn ensure_identity(&self, user_id: &str) -> StorageResult<bool> {
        let previous = self.store.get(IDENTITY_KEY)?;
        if previous.as_deref() == Some(user_id) {
            return Ok(false);
        }

        let had_document = self.store.get(CONFIG_KEY)?.is_some();
        self.clear()?;
        self.store.set(IDENTITY_KEY, user_id)?;
        if had_document {
            tracing::info!(
                previous = previous.as_deref().unwrap_or("<none>"),
                current = user_id,
                "identity changed, cleared persisted configuration"
            );
        }
        Ok(had_document)
    }

    fn written_at_millis(&self) -> StorageResult<Option<i64>> {
        match self.store.get(TIMESTAMP_KEY)? {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| StorageError::InvalidTimestamp(raw)),
            None => Ok(None),
        }
    }
}
