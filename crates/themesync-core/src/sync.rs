//! Orchestration hook
//!
//! [`ConfigSync`] wires the resolver, the state store and the apply
//! scheduler together and exposes the operations an editor needs.
//!
//! # Workflow
//! 1. `initialize()` resolves a document and applies it immediately
//! 2. `update()` / `replace()` edit the live document (debounced apply)
//! 3. `apply_preset()` / `discard()` / `reset_to_default()` apply at once
//! 4. `save()` persists and advances the baseline

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use themesync_apply::{ApplyScheduler, SharedSurface};
use themesync_cache::{CacheTier, FileKeyValueStore, KeyValueStore, PreloadSlot};
use themesync_document::{
    ConfigPatch, ConfigurationDocument, NewPreset, PresetDocument, PresetUpdate,
};
use themesync_remote::{
    ConfigResolver, FetchStrategy, HttpConfigStore, RemoteConfigStore, ResolutionSource,
    ResolvedConfig, SyncError, SyncResult, TokenProvider,
};
use themesync_state::{Action, Phase, StateStore, SyncState};
use tokio::sync::watch;

use crate::config::SyncConfig;
use crate::error::ConfigResult;
use crate::watch::ChangeWatcher;

/// Result of [`ConfigSync::initialize`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InitOutcome {
    /// A document was loaded from the given source
    Loaded(ResolutionSource),
    /// Another initialization is in flight; nothing was started
    AlreadyInitializing,
    /// Resolution failed; the error is recorded in state
    Failed(SyncError),
}

/// Clears its flag on drop so every exit path releases it
struct Latch<'a>(&'a AtomicBool);

impl<'a> Latch<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for Latch<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Builder for [`ConfigSync`]
#[derive(Debug)]
pub struct ConfigSyncBuilder {
    store: Arc<dyn RemoteConfigStore>,
    auth: Arc<dyn TokenProvider>,
    surface: SharedSurface,
    config: SyncConfig,
    preload: Option<PreloadSlot>,
    key_value_store: Option<Arc<dyn KeyValueStore>>,
}

impl ConfigSyncBuilder {
    /// With runtime configuration
    #[must_use]
    pub fn config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// With a preloaded snapshot
    #[must_use]
    pub fn preload(mut self, preload: PreloadSlot) -> Self {
        self.preload = Some(preload);
        self
    }

    /// With a persistent cache store (overrides `storage_path`)
    #[must_use]
    pub fn key_value_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.key_value_store = Some(store);
        self
    }

    /// Assemble the engine
    #[must_use]
    pub fn build(self) -> ConfigSync {
        let mut cache = CacheTier::new(self.config.config_ttl())
            .with_preload(self.preload.unwrap_or_else(PreloadSlot::from_env));

        let persistent = self.key_value_store.or_else(|| {
            self.config
                .storage_path
                .as_ref()
                .map(|path| Arc::new(FileKeyValueStore::new(path)) as Arc<dyn KeyValueStore>)
        });
        if let Some(store) = persistent {
            cache = cache.with_persistent(store);
        }

        let resolver = ConfigResolver::new(self.store, self.auth, Arc::new(cache));
        ConfigSync {
            resolver,
            state: Arc::new(StateStore::default()),
            scheduler: ApplyScheduler::new(self.surface, self.config.debounce()),
            strategy: self.config.strategy,
            poll_interval: self.config.poll_interval(),
            initializing: AtomicBool::new(false),
            saving: AtomicBool::new(false),
        }
    }
}

/// The configuration synchronization engine
#[derive(Debug)]
pub struct ConfigSync {
    resolver: ConfigResolver,
    state: Arc<StateStore>,
    scheduler: ApplyScheduler,
    strategy: FetchStrategy,
    poll_interval: Option<Duration>,
    initializing: AtomicBool,
    saving: AtomicBool,
}

impl ConfigSync {
    /// Start building an engine
    #[must_use]
    pub fn builder(
        store: Arc<dyn RemoteConfigStore>,
        auth: Arc<dyn TokenProvider>,
        surface: SharedSurface,
    ) -> ConfigSyncBuilder {
        ConfigSyncBuilder {
            store,
            auth,
            surface,
            config: SyncConfig::default(),
            preload: None,
            key_value_store: None,
        }
    }

    /// Engine talking HTTP to `config.base_url`
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built
    pub fn from_config(
        config: SyncConfig,
        auth: Arc<dyn TokenProvider>,
        surface: SharedSurface,
    ) -> ConfigResult<Self> {
        let store = HttpConfigStore::new(config.base_url.clone(), config.request_timeout())?;
        Ok(Self::builder(Arc::new(store), auth, surface)
            .config(config)
            .build())
    }

    /// Resolve and apply the current document.
    ///
    /// Returns [`InitOutcome::AlreadyInitializing`] without side effects
    /// while another call is in flight.
    pub async fn initialize(&self) -> InitOutcome {
        let Some(_latch) = Latch::acquire(&self.initializing) else {
            tracing::debug!("initialization already in progress");
            return InitOutcome::AlreadyInitializing;
        };

        self.state.dispatch(Action::SetLoading(true));
        self.state.dispatch(Action::SetError(None));

        match self.resolver.get_current_config(self.strategy).await {
            Ok(resolved) => {
                let origin = resolved.origin;
                self.adopt(resolved);
                InitOutcome::Loaded(origin)
            }
            Err(e) => {
                tracing::error!(error = %e, reason = %e.reason(), "failed to load configuration");
                let state = self.state.dispatch(Action::SetError(Some(e.to_info())));
                self.scheduler.apply_now(&state.config);
                InitOutcome::Failed(e)
            }
        }
    }

    /// Retry after a failed load
    pub async fn retry(&self) -> InitOutcome {
        tracing::info!("retrying configuration load");
        self.initialize().await
    }

    /// Dismiss a load failure and continue with the best local document
    pub async fn continue_offline(&self) -> ResolutionSource {
        let resolved = match self.resolver.cached_fallback().await {
            Some(resolved) => resolved,
            None => ResolvedConfig {
                document: ConfigurationDocument::emergency_default(),
                origin: ResolutionSource::EmergencyDefault,
                context: themesync_document::ConfigContext::local(),
            },
        };
        let origin = resolved.origin;
        tracing::warn!(?origin, "continuing offline");
        self.adopt(resolved);
        origin
    }

    /// Reload from the store when there are no local edits.
    ///
    /// Returns whether a new document was adopted.
    ///
    /// # Errors
    /// Returns error if the store cannot be reached
    pub async fn reload(&self) -> SyncResult<bool> {
        if self.state.read(|s| s.is_dirty) {
            tracing::info!("remote change ignored: local edits pending");
            return Ok(false);
        }
        let resolved = self.resolver.get_current_config(FetchStrategy::BackendOnly).await?;
        let unchanged = self.state.read(|s| {
            themesync_document::compare::are_equal(&s.saved_config, &resolved.document)
        });
        if unchanged {
            return Ok(false);
        }
        self.adopt(resolved);
        Ok(true)
    }

    /// Shallow-merge `patch` into the live document (debounced apply)
    pub fn update(&self, patch: ConfigPatch) -> SyncState {
        let state = self.state.dispatch(Action::UpdateConfig(patch));
        self.scheduler.schedule(state.config.clone());
        state
    }

    /// Replace the live document (debounced apply)
    pub fn replace(&self, doc: ConfigurationDocument) -> SyncState {
        let state = self.state.dispatch(Action::ReplaceConfig(doc));
        self.scheduler.schedule(state.config.clone());
        state
    }

    /// Make a preset's document the live document (applied at once)
    ///
    /// # Errors
    /// [`SyncError::Validation`] if no preset has this id
    pub fn apply_preset(&self, id: &str) -> SyncResult<SyncState> {
        let (preset, current) = self.state.read(|s| {
            (
                s.presets.iter().find(|p| p.id == id).cloned(),
                s.config.clone(),
            )
        });
        let preset = preset.ok_or_else(|| SyncError::Validation(format!("unknown preset '{id}'")))?;

        let mut doc = preset.config;
        doc.id = current.id;
        doc.created_at = current.created_at;
        doc.updated_at = current.updated_at;

        tracing::info!(preset = %preset.name, "applying preset");
        let state = self.state.dispatch(Action::ReplaceConfig(doc));
        self.scheduler.apply_forced(&state.config);
        Ok(state)
    }

    /// Revert the live document to the baseline (applied at once)
    pub fn discard(&self) -> SyncState {
        let state = self.state.dispatch(Action::DiscardChanges);
        self.scheduler.apply_forced(&state.config);
        state
    }

    /// Replace the live document with the emergency default (applied at once)
    pub fn reset_to_default(&self) -> SyncState {
        let state = self.state.dispatch(Action::ResetToDefault);
        self.scheduler.apply_forced(&state.config);
        state
    }

    /// Persist the live document; on success it becomes the baseline.
    ///
    /// # Errors
    /// Returns error if a save is already running, or the store fails (the
    /// baseline is left untouched and the error recorded in state)
    pub async fn save(&self) -> SyncResult<ConfigurationDocument> {
        let Some(_latch) = Latch::acquire(&self.saving) else {
            return Err(SyncError::Validation("a save is already in progress".to_string()));
        };

        let state = self.state.dispatch(Action::SetSaving(true));
        let result = self.resolver.save_config(&state.config).await;
        match &result {
            Ok(saved) => {
                self.state.dispatch(Action::SetSavedConfig(saved.clone()));
            }
            Err(e) => {
                self.state.dispatch(Action::SetError(Some(e.to_info())));
            }
        }
        self.state.dispatch(Action::SetSaving(false));
        result
    }

    /// Fetch presets into state
    ///
    /// # Errors
    /// Returns error if presets are unavailable from store and cache
    pub async fn refresh_presets(&self) -> SyncResult<Vec<PresetDocument>> {
        let presets = self.resolver.get_presets().await?;
        self.state.dispatch(Action::SetPresets(presets.clone()));
        Ok(presets)
    }

    /// Save the live document as a new preset
    ///
    /// # Errors
    /// Returns error if the store rejects the preset
    pub async fn create_preset_from_current(
        &self,
        name: &str,
        description: &str,
    ) -> SyncResult<PresetDocument> {
        let body = self
            .state
            .read(|s| NewPreset::from_config(name, description, &s.config));
        let created = self.resolver.create_preset(&body).await?;
        self.refresh_presets_quietly().await;
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
        self.ensure_user_preset(id)?;
        let updated = self.resolver.update_preset(id, update).await?;
        self.refresh_presets_quietly().await;
        Ok(updated)
    }

    /// Delete a user preset
    ///
    /// # Errors
    /// [`SyncError::SystemPreset`] for system presets, otherwise store errors
    pub async fn delete_preset(&self, id: &str) -> SyncResult<()> {
        self.ensure_user_preset(id)?;
        self.resolver.delete_preset(id).await?;
        self.refresh_presets_quietly().await;
        Ok(())
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state.snapshot()
    }

    /// Observe state changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.state.subscribe()
    }

    /// Lifecycle phase
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.read(Phase::of)
    }

    /// Whether the live document differs from the baseline
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.state.read(themesync_state::has_unsaved_changes)
    }

    /// Human-readable summary of pending changes
    #[must_use]
    pub fn changes_summary(&self) -> String {
        self.state.read(themesync_state::changes_summary)
    }

    /// Whether the current actor may edit the document
    #[must_use]
    pub fn can_modify_config(&self) -> bool {
        self.state.read(themesync_state::can_modify_config)
    }

    /// Wait for a pending debounced application
    pub async fn flush(&self) {
        self.scheduler.flush().await;
    }

    /// Cross-tab watcher bound to this engine's state
    #[must_use]
    pub fn watcher(&self) -> ChangeWatcher {
        ChangeWatcher::new(Arc::clone(&self.state), self.resolver.clone())
    }

    /// Configured polling interval
    #[must_use]
    pub fn poll_interval(&self) -> Option<Duration> {
        self.poll_interval
    }

    fn adopt(&self, resolved: ResolvedConfig) {
        let ResolvedConfig {
            document,
            origin,
            context,
        } = resolved;
        tracing::info!(
            ?origin,
            source = %context.source,
            theme = %document.theme.name,
            "configuration loaded"
        );

        self.state.dispatch(Action::SetConfig(document.clone()));
        self.state.dispatch(Action::SetContextualData {
            source: context.source,
            is_global_admin: context.is_global_admin,
        });
        self.scheduler.apply_forced(&document);
    }

    fn ensure_user_preset(&self, id: &str) -> SyncResult<()> {
        let is_system = self
            .state
            .read(|s| s.presets.iter().any(|p| p.id == id && p.is_system));
        if is_system {
            return Err(SyncError::SystemPreset(id.to_string()));
        }
        Ok(())
    }

    async fn refresh_presets_quietly(&self) {
        if let Err(e) = self.refresh_presets().await {
            tracing::warn!(error = %e, "preset list refresh failed");
        }
    }
}
