//! Cross-tab coordination
//!
//! Signals are advisory. Receivers decide whether to reload; nothing is
//! locked and the last write wins.

use std::sync::Arc;
use std::time::Duration;

use themesync_cache::CONFIG_KEY;
use themesync_document::{compare, ConfigurationDocument};
use themesync_remote::{ConfigResolver, FetchStrategy, SyncResult};
use themesync_state::StateStore;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

const SIGNAL_CAPACITY: usize = 16;

/// Why a refresh might be needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefreshSignal {
    /// Another instance wrote a different document to shared storage
    StorageChanged,
    /// The store holds a document different from the local baseline
    RemoteChanged,
}

/// Detects configuration changes made elsewhere
#[derive(Debug, Clone)]
pub struct ChangeWatcher {
    state: Arc<StateStore>,
    resolver: ConfigResolver,
    signals: broadcast::Sender<RefreshSignal>,
}

impl ChangeWatcher {
    /// Watcher comparing against `state`'s baseline
    #[must_use]
    pub fn new(state: Arc<StateStore>, resolver: ConfigResolver) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            state,
            resolver,
            signals,
        }
    }

    /// Receive refresh signals
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RefreshSignal> {
        self.signals.subscribe()
    }

    /// Handle a shared-storage change notification.
    ///
    /// Returns whether a [`RefreshSignal::StorageChanged`] was emitted.
    pub fn on_storage_change(&self, key: &str, new_value: Option<&str>) -> bool {
        if key != CONFIG_KEY {
            return false;
        }
        let Some(raw) = new_value else {
            return false;
        };
        let doc: ConfigurationDocument = match serde_json::from_str(raw) {
            Ok(doc) => doc,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable storage change");
                return false;
            }
        };
        if self.matches_baseline(&doc) {
            return false;
        }
        self.emit(RefreshSignal::StorageChanged);
        true
    }

    /// Fetch from the store and signal on divergence from the baseline
    ///
    /// # Errors
    /// Returns error if the store cannot be reached
    pub async fn check_remote(&self) -> SyncResult<bool> {
        let resolved = self
            .resolver
            .get_current_config(FetchStrategy::BackendOnly)
            .await?;
        if self.matches_baseline(&resolved.document) {
            return Ok(false);
        }
        self.emit(RefreshSignal::RemoteChanged);
        Ok(true)
    }

    /// Poll the store every `every`; abort the handle to stop
    #[must_use]
    pub fn spawn_poller(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(e) = self.check_remote().await {
                    tracing::debug!(error = %e, "remote poll failed");
                }
            }
        })
    }

    fn matches_baseline(&self, doc: &ConfigurationDocument) -> bool {
        self.state
            .read(|s| compare::are_equal(doc, &s.saved_config))
    }

    fn emit(&self, signal: RefreshSignal) {
        tracing::info!(?signal, "configuration changed elsewhere");
        // No receivers is fine
        let _ = self.signals.send(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themesync_cache::CacheTier;
    use themesync_remote::{InMemoryConfigStore, StaticTokenProvider};
    use themesync_state::Action;

    fn named(name: &str) -> ConfigurationDocument {
        let mut doc = ConfigurationDocument::emergency_default();
        doc.branding.app_name = name.to_string();
        doc
    }

    fn watcher(store: Arc<InMemoryConfigStore>) -> (ChangeWatcher, Arc<StateStore>) {
        let state = Arc::new(StateStore::default());
        state.dispatch(Action::SetConfig(named("baseline")));
        let resolver = ConfigResolver::new(
            store,
            Arc::new(StaticTokenProvider::new("t", "alice")),
            Arc::new(CacheTier::default()),
        );
        (ChangeWatcher::new(Arc::clone(&state), resolver), state)
    }

    #[test]
    fn storage_change_to_other_document_signals() {
        let (watcher, _) = watcher(Arc::new(InMemoryConfigStore::new()));
        let mut rx = watcher.subscribe();

        let same = serde_json::to_string(&named("baseline")).unwrap();
        assert!(!watcher.on_storage_change(CONFIG_KEY, Some(&same)));

        let other = serde_json::to_string(&named("other tab")).unwrap();
        assert!(watcher.on_storage_change(CONFIG_KEY, Some(&other)));
        assert_eq!(rx.try_recv().unwrap(), RefreshSignal::StorageChanged);
    }

    #[test]
    fn unrelated_or_invalid_changes_ignored() {
        let (watcher, _) = watcher(Arc::new(InMemoryConfigStore::new()));
        assert!(!watcher.on_storage_change("something.else", Some("{}")));
        assert!(!watcher.on_storage_change(CONFIG_KEY, None));
        assert!(!watcher.on_storage_change(CONFIG_KEY, Some("not json")));
    }

    #[tokio::test]
    async fn remote_divergence_signals() {
        let store = Arc::new(InMemoryConfigStore::new().with_config(named("baseline")));
        let (watcher, _) = watcher(Arc::clone(&store));
        let mut rx = watcher.subscribe();

        assert!(!watcher.check_remote().await.unwrap());
        store.set_config(named("edited elsewhere"));
        assert!(watcher.check_remote().await.unwrap());
        assert_eq!(rx.recv().await.unwrap(), RefreshSignal::RemoteChanged);
    }

    #[tokio::test(start_paused = true)]
    async fn poller_emits_on_interval() {
        let store = Arc::new(InMemoryConfigStore::new().with_config(named("remote")));
        let (watcher, _) = watcher(store);
        let watcher = Arc::new(watcher);
        let mut rx = watcher.subscribe();

        let handle = Arc::clone(&watcher).spawn_poller(Duration::from_secs(30));
        let signal = rx.recv().await.unwrap();
        assert_eq!(signal, RefreshSignal::RemoteChanged);
        handle.abort();
    }
}
