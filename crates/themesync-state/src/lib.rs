//! themesync State Machine
//!
//! A pure reducer over [`SyncState`], lifecycle [`Phase`]s derived from it,
//! and a [`StateStore`] that serializes dispatches and publishes each new
//! state on a watch channel.
//!
//! ```rust
//! use themesync_document::ConfigurationDocument;
//! use themesync_state::{Action, StateStore};
//!
//! let store = StateStore::default();
//! store.dispatch(Action::SetConfig(ConfigurationDocument::emergency_default()));
//! store.dispatch(Action::ResetToDefault);
//! assert!(!store.snapshot().is_dirty);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod state;
pub mod store;
pub mod transitions;

pub use state::{can_modify_config, changes_summary, has_unsaved_changes, reduce, Action, SyncState};
pub use store::StateStore;
pub use transitions::{allowed_transitions, validate_transition, Phase, TransitionError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
