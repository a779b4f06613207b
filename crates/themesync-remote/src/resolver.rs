//! Cache-aware configuration resolver
//!
//! # Source order
//!
//! | Strategy | Order |
//! |----------|-------|
//! | `BackendFirst` | preload → network → memory → persistent |
//! | `CacheFirst` | preload → memory → persistent → network |
//! | `BackendOnly` | network |
//!
//! The preloaded snapshot is consumed by the first resolution that reaches
//! it and written through to the caches like a network result.
//!
//! Authentication failures end the chain immediately. Any other network
//! failure falls through to the remaining cache levels and is raised only
//! if none of them has a document.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use themesync_cache::CacheTier;
use themesync_document::{
    ConfigContext, ConfigurationDocument, NewPreset, PresetDocument, PresetUpdate,
};

use crate::auth::TokenProvider;
use crate::error::{SyncError, SyncResult};
use crate::store::{RemoteConfig, RemoteConfigStore};

/// Cache/network precedence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchStrategy {
    /// Network first, caches as fallback
    #[default]
    BackendFirst,
    /// Caches first, network on miss
    CacheFirst,
    /// Network only, never substitutes cached data
    BackendOnly,
}

impl FetchStrategy {
    /// Kebab-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BackendFirst => "backend-first",
            Self::CacheFirst => "cache-first",
            Self::BackendOnly => "backend-only",
        }
    }

    const fn chain(self) -> &'static [Step] {
        match self {
            Self::BackendFirst => &[Step::Preload, Step::Network, Step::Memory, Step::Persistent],
            Self::CacheFirst => &[Step::Preload, Step::Memory, Step::Persistent, Step::Network],
            Self::BackendOnly => &[Step::Network],
        }
    }
}

impl fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchStrategy {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "backend-first" => Ok(Self::BackendFirst),
            "cache-first" => Ok(Self::CacheFirst),
            "backend-only" => Ok(Self::BackendOnly),
            other => Err(SyncError::Validation(format!(
                "unknown fetch strategy '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Preload,
    Network,
    Memory,
    Persistent,
}

/// Which source produced a resolved document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    /// Host-embedded snapshot
    Preloaded,
    /// In-memory cache
    Memory,
    /// Persistent cache
    Persistent,
    /// Remote store
    Network,
    /// Built-in emergency default
    EmergencyDefault,
}

impl ResolutionSource {
    /// Whether the document came from the remote store
    #[inline]
    #[must_use]
    pub const fn is_network(self) -> bool {
        matches!(self, Self::Network)
    }
}

/// A document and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub document: ConfigurationDocument,
    pub origin: ResolutionSource,
    pub context: ConfigContext,
}

impl ResolvedConfig {
    fn local(document: ConfigurationDocument, origin: ResolutionSource) -> Self {
        Self {
            document,
            origin,
            context: ConfigContext::local(),
        }
    }
}

/// Resolves, saves and manages configuration across caches and the store
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    store: Arc<dyn RemoteConfigStore>,
    auth: Arc<dyn TokenProvider>,
    cache: Arc<CacheTier>,
}

impl ConfigResolver {
    /// Create a resolver
    #[must_use]
    pub fn new(
        store: Arc<dyn RemoteConfigStore>,
        auth: Arc<dyn TokenProvider>,
        cache: Arc<CacheTier>,
    ) -> Self {
        Self { store, auth, cache }
    }

    /// Cache tier
    #[inline]
    #[must_use]
    pub fn cache(&self) -> &Arc<CacheTier> {
        &self.cache
    }

    /// Resolve the current document.
    ///
    /// # Errors
    /// - [`SyncError::Auth`] when the token is missing or rejected
    /// - [`SyncError::Network`] when the store fails and no cache level has
    ///   a document
    /// - [`SyncError::Validation`] when the store has no document and no
    ///   cache level has one either
    pub async fn get_current_config(&self, strategy: FetchStrategy) -> SyncResult<ResolvedConfig> {
        self.check_identity();

        let mut last_error: Option<SyncError> = None;
        for step in strategy.chain() {
            match step {
                Step::Preload => {
                    if let Some(doc) = self.cache.take_preloaded() {
                        tracing::debug!("using preloaded configuration");
                        self.cache.store_config(&doc).await;
                        return Ok(ResolvedConfig::local(doc, ResolutionSource::Preloaded));
                    }
                }
                Step::Memory => {
                    if let Some(doc) = self.cache.memory_config().await {
                        return Ok(ResolvedConfig::local(doc, ResolutionSource::Memory));
                    }
                }
                Step::Persistent => {
                    if let Some((doc, _)) = self.cache.cached_config().await {
                        return Ok(ResolvedConfig::local(doc, ResolutionSource::Persistent));
                    }
                }
                Step::Network => match self.fetch_remote().await {
                    Ok(Some(remote)) => {
                        self.cache.store_config(&remote.document).await;
                        return Ok(ResolvedConfig {
                            document: remote.document,
                            origin: ResolutionSource::Network,
                            context: remote.context,
                        });
                    }
                    Ok(None) => {
                        tracing::warn!(%strategy, "store returned no configuration");
                        last_error = Some(SyncError::Validation(
                            "store returned no configuration".to_string(),
                        ));
                    }
                    Err(e @ SyncError::Auth(_)) => {
                        tracing::warn!(error = %e, "configuration request not authorized");
                        return Err(e);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, %strategy, "configuration fetch failed");
                        last_error = Some(e);
                    }
                },
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SyncError::Validation("no configuration available".to_string())
        }))
    }

    /// Like [`get_current_config`](Self::get_current_config) but never fails:
    /// errors resolve to the emergency default.
    pub async fn resolve_or_default(&self, strategy: FetchStrategy) -> ResolvedConfig {
        match self.get_current_config(strategy).await {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to emergency default configuration");
                ResolvedConfig::local(
                    ConfigurationDocument::emergency_default(),
                    ResolutionSource::EmergencyDefault,
                )
            }
        }
    }

    /// Best local document without touching the network
    pub async fn cached_fallback(&self) -> Option<ResolvedConfig> {
        self.check_identity();
        let (doc, level) = self.cache.cached_config().await?;
        let origin = match level {
            themesync_cache::CacheLevel::Memory => ResolutionSource::Memory,
            _ => ResolutionSource::Persistent,
        };
        Some(ResolvedConfig::local(doc, origin))
    }

    /// Save `document`, writing the stored version through to the caches.
    ///
    /// # Errors
    /// Returns error if the token is missing or the store rejects the save
    pub async fn save_config(
        &self,
        document: &ConfigurationDocument,
    ) -> SyncResult<ConfigurationDocument> {
        let token = self.token().await?;
        match self.store.save_config(&token, document).await {
            Ok(saved) => {
                self.cache.store_config(&saved).await;
                tracing::info!(id = saved.id.as_deref().unwrap_or("-"), "configuration saved");
                Ok(saved)
            }
            Err(e) => {
                let err = SyncError::from(e);
                tracing::error!(error = %err, "configuration save failed");
                Err(err)
            }
        }
    }

    /// Preset list; falls back to the cached list on network failure.
    ///
    /// # Errors
    /// Returns error on auth failure, or on network failure with no cache
    pub async fn get_presets(&self) -> SyncResult<Vec<PresetDocument>> {
        self.check_identity();
        let token = self.token().await?;
        match self.store.get_presets(&token).await.map_err(SyncError::from) {
            Ok(presets) => {
                self.cache.store_presets(&presets).await;
                Ok(presets)
            }
            Err(e @ SyncError::Auth(_)) => Err(e),
            Err(e) => match self.cache.presets().await {
                Some(cached) => {
                    tracing::warn!(error = %e, count = cached.len(), "using cached presets");
                    Ok(cached)
                }
                None => Err(e),
            },
        }
    }

    /// Create a preset
    ///
    /// # Errors
    /// Returns error if the token is missing or the store rejects it
    pub async fn create_preset(&self, preset: &NewPreset) -> SyncResult<PresetDocument> {
        let token = self.token().await?;
        let created = self.store.create_preset(&token, preset).await?;
        self.cache.invalidate_presets().await;
        tracing::info!(id = %created.id, name = %created.name, "preset created");
        Ok(created)
    }

    /// Update a user preset
    ///
    /// # Errors
    /// [`SyncError::SystemPreset`] for system presets, otherwise store errors
    pub async fn update_preset(
        &self,
        id: &str,
        update: &PresetUpdate,
    ) -> SyncResult<PresetDocument> {
        self.guard_system_preset(id).await?;
        let token = self.token().await?;
        let updated = self.store.update_preset(&token, id, update).await?;
        self.cache.invalidate_presets().await;
        tracing::info!(id, "preset updated");
        Ok(updated)
    }

    /// Delete a user preset
    ///
    /// # Errors
    /// [`SyncError::SystemPreset`] for system presets, otherwise store errors
    pub async fn delete_preset(&self, id: &str) -> SyncResult<()> {
        self.guard_system_preset(id).await?;
        let token = self.token().await?;
        self.store.delete_preset(&token, id).await?;
        self.cache.invalidate_presets().await;
        tracing::info!(id, "preset deleted");
        Ok(())
    }

    async fn guard_system_preset(&self, id: &str) -> SyncResult<()> {
        self.check_identity();
        let is_system = self
            .cache
            .presets()
            .await
            .is_some_and(|presets| presets.iter().any(|p| p.id == id && p.is_system));
        if is_system {
            return Err(SyncError::SystemPreset(id.to_string()));
        }
        Ok(())
    }

    async fn fetch_remote(&self) -> SyncResult<Option<RemoteConfig>> {
        let token = self.token().await?;
        let remote = self.store.get_current_config(&token).await?;
        if let Some(remote) = &remote {
            if let Err(e) = remote.document.validate() {
                tracing::warn!(error = %e, "store returned an incomplete configuration");
            }
            for issue in remote.document.logo_issues() {
                tracing::warn!(issue = %issue, "logo configuration issue");
            }
        }
        Ok(remote)
    }

    async fn token(&self) -> SyncResult<String> {
        self.auth
            .get_token()
            .await
            .ok_or_else(|| SyncError::Auth("no bearer token available".to_string()))
    }

    fn check_identity(&self) {
        if let Some(user) = self.auth.user_id() {
            if self.cache.ensure_identity(&user) {
                tracing::info!(user = %user, "cache belonged to another identity and was cleared");
            }
        }
    }
}
