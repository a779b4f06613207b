//! Thread-safe holder for [`SyncState`]

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::state::{reduce, Action, SyncState};
use crate::transitions::{validate_transition, Phase};

/// Serializes dispatches and publishes every new state
#[derive(Debug)]
pub struct StateStore {
    state: Mutex<SyncState>,
    publisher: watch::Sender<SyncState>,
}

impl StateStore {
    /// Store seeded with `initial`
    #[must_use]
    pub fn new(initial: SyncState) -> Self {
        let (publisher, _) = watch::channel(initial.clone());
        Self {
            state: Mutex::new(initial),
            publisher,
        }
    }

    /// Reduce `action` and return the resulting state
    pub fn dispatch(&self, action: Action) -> SyncState {
        let name = action.name();
        let mut guard = self.state.lock();
        let next = reduce(&guard, action);

        let (from, to) = (Phase::of(&guard), Phase::of(&next));
        match validate_transition(from, to) {
            Ok(()) if from != to => tracing::debug!(action = name, ?from, ?to, "phase changed"),
            Ok(()) => tracing::trace!(action = name, dirty = next.is_dirty, "state updated"),
            Err(e) => tracing::warn!(action = name, error = %e, "unexpected phase change"),
        }

        *guard = next.clone();
        self.publisher.send_replace(next.clone());
        next
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> SyncState {
        self.state.lock().clone()
    }

    /// Read from the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&SyncState) -> R) -> R {
        f(&self.state.lock())
    }

    /// Receiver that observes every published state
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SyncState> {
        self.publisher.subscribe()
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(SyncState::initial())
    }
}
