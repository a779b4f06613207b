//! The three-level read path
//!
//! ```text
//! preloaded snapshot → memory (TTL) → persistent store (TTL)
//! ```
//!
//! The preloaded snapshot is served once. Storage failures are logged and
//! treated as misses.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use themesync_document::{ConfigurationDocument, PresetDocument};
use tokio::task::JoinHandle;

use crate::memory::MemoryCache;
use crate::persistent::PersistentConfigCache;
use crate::preload::PreloadSlot;
use crate::store::KeyValueStore;

/// Default TTL for the configuration document
pub const CONFIG_TTL: Duration = Duration::from_secs(5 * 60);

/// Default TTL for geographically static reference data
pub const REFERENCE_DATA_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const CONFIG_CACHE_KEY: &str = "current-config";
const PRESETS_CACHE_KEY: &str = "presets";
const MEMORY_CAPACITY: u64 = 64;

/// Which level satisfied a read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheLevel {
    /// Snapshot embedded by the host
    Preloaded,
    /// Process memory
    Memory,
    /// Durable key-value store
    Persistent,
}

/// Preloaded snapshot, memory cache and persistent cache behind one API
#[derive(Debug, Clone)]
pub struct CacheTier {
    preload: Arc<Mutex<PreloadSlot>>,
    identity: Arc<Mutex<Option<String>>>,
    configs: MemoryCache<ConfigurationDocument>,
    presets: MemoryCache<Vec<PresetDocument>>,
    persistent: Option<PersistentConfigCache>,
    config_ttl: Duration,
}

impl CacheTier {
    /// Memory-only tier with the given document TTL
    #[must_use]
    pub fn new(config_ttl: Duration) -> Self {
        Self {
            preload: Arc::new(Mutex::new(PreloadSlot::empty())),
            identity: Arc::new(Mutex::new(None)),
            configs: MemoryCache::new(MEMORY_CAPACITY, config_ttl),
            presets: MemoryCache::new(MEMORY_CAPACITY, config_ttl),
            persistent: None,
            config_ttl,
        }
    }

    /// With a preloaded snapshot
    #[inline]
    #[must_use]
    pub fn with_preload(mut self, preload: PreloadSlot) -> Self {
        self.preload = Arc::new(Mutex::new(preload));
        self
    }

    /// With a persistent store
    #[inline]
    #[must_use]
    pub fn with_persistent(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.persistent = Some(PersistentConfigCache::new(store));
        self
    }

    /// Document TTL
    #[inline]
    #[must_use]
    pub fn config_ttl(&self) -> Duration {
        self.config_ttl
    }

    /// Persistent cache, if configured
    #[inline]
    #[must_use]
    pub fn persistent(&self) -> Option<&PersistentConfigCache> {
        self.persistent.as_ref()
    }

    /// The preloaded snapshot, if not yet consumed
    #[must_use]
    pub fn preloaded(&self) -> Option<ConfigurationDocument> {
        self.preload.lock().get().cloned()
    }

    /// Consume the preloaded snapshot; it is fresh for one load only
    #[must_use]
    pub fn take_preloaded(&self) -> Option<ConfigurationDocument> {
        self.preload.lock().take()
    }

    /// Live memory entry
    pub async fn memory_config(&self) -> Option<ConfigurationDocument> {
        let hit = self.configs.get(CONFIG_CACHE_KEY).await;
        tracing::debug!(hit = hit.is_some(), "memory cache lookup");
        hit
    }

    /// Live persistent entry
    #[must_use]
    pub fn persistent_config(&self) -> Option<ConfigurationDocument> {
        let persistent = self.persistent.as_ref()?;
        match persistent.load(self.config_ttl) {
            Ok(hit) => {
                tracing::debug!(hit = hit.is_some(), "persistent cache lookup");
                hit
            }
            Err(e) => {
                tracing::warn!(error = %e, "persistent cache unreadable");
                None
            }
        }
    }

    /// First hit among memory then persistent (the preload slot is separate)
    pub async fn cached_config(&self) -> Option<(ConfigurationDocument, CacheLevel)> {
        if let Some(doc) = self.memory_config().await {
            return Some((doc, CacheLevel::Memory));
        }
        let doc = self.persistent_config()?;
        // Promote so the next read is served from memory
        self.configs.set(CONFIG_CACHE_KEY, doc.clone(), None).await;
        Some((doc, CacheLevel::Persistent))
    }

    /// Write through to memory and persistent caches
    pub async fn store_config(&self, doc: &ConfigurationDocument) {
        self.configs.set(CONFIG_CACHE_KEY, doc.clone(), None).await;
        if let Some(persistent) = &self.persistent {
            if let Err(e) = persistent.store_document(doc) {
                tracing::warn!(error = %e, "failed to persist configuration");
            }
        }
    }

    /// Cached preset list
    pub async fn presets(&self) -> Option<Vec<PresetDocument>> {
        self.presets.get(PRESETS_CACHE_KEY).await
    }

    /// Cache the preset list
    pub async fn store_presets(&self, presets: &[PresetDocument]) {
        self.presets
            .set(PRESETS_CACHE_KEY, presets.to_vec(), None)
            .await;
    }

    /// Drop the cached preset list
    pub async fn invalidate_presets(&self) {
        self.presets.delete(PRESETS_CACHE_KEY).await;
    }

    /// Clear memory and persistent levels (the preload slot is untouched)
    pub fn clear(&self) {
        self.configs.clear();
        self.presets.clear();
        if let Some(persistent) = &self.persistent {
            if let Err(e) = persistent.clear() {
                tracing::warn!(error = %e, "failed to clear persisted configuration");
            }
        }
    }

    /// Clear cached data that belongs to another user.
    ///
    /// Memory levels are cleared whenever `user_id` differs from the last
    /// identity this tier saw; the persistent level compares against the
    /// identity recorded in the store. Must run before any read for the new
    /// identity. Returns whether anything was cleared.
    pub fn ensure_identity(&self, user_id: &str) -> bool {
        let previous = self.identity.lock().replace(user_id.to_string());
        let switched = previous.as_deref().is_some_and(|prev| prev != user_id);
        if switched {
            self.configs.clear();
            self.presets.clear();
            tracing::debug!(current = user_id, "identity changed, cleared memory cache");
        }

        let Some(persistent) = &self.persistent else {
            return switched;
        };
        match persistent.ensure_identity(user_id) {
            Ok(cleared) => {
                if cleared {
                    self.configs.clear();
                    self.presets.clear();
                }
                switched || cleared
            }
            Err(e) => {
                tracing::warn!(error = %e, "identity check failed, clearing cache");
                self.clear();
                true
            }
        }
    }

    /// Evict stale memory entries
    pub async fn sweep(&self) -> usize {
        self.configs.sweep_expired().await + self.presets.sweep_expired().await
    }

    /// Periodic sweep task; abort the handle to stop it
    #[must_use]
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                self.sweep().await;
            }
        })
    }
}

impl Default for CacheTier {
    fn default() -> Self {
        Self::new(CONFIG_TTL)
    }
}
