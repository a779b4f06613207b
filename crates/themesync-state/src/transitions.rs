//! Lifecycle phases derived from [`SyncState`]
//!
//! ```text
//! Uninitialized → Loading → ReadyClean ⇄ ReadyDirty → Saving → Ready*
//!                    ↓                                    ↓
//!                  Error ←────────────────────────────────┘
//! ```

use serde::Serialize;

use crate::state::SyncState;

/// Coarse lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    Loading,
    ReadyClean,
    ReadyDirty,
    Saving,
    Error,
}

impl Phase {
    /// Phase of `state`; flags take precedence in the order
    /// loading, saving, error, initialized, dirty.
    #[must_use]
    pub fn of(state: &SyncState) -> Self {
        if state.loading {
            Self::Loading
        } else if state.saving {
            Self::Saving
        } else if state.error.is_some() {
            Self::Error
        } else if !state.initialized {
            Self::Uninitialized
        } else if state.is_dirty {
            Self::ReadyDirty
        } else {
            Self::ReadyClean
        }
    }

    /// Whether a document is ready for editing
    #[inline]
    #[must_use]
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::ReadyClean | Self::ReadyDirty)
    }
}

/// A phase change outside [`allowed_transitions`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal phase transition {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: Phase,
    pub to: Phase,
}

/// Check a phase change; staying in the same phase is always legal
///
/// # Errors
/// Returns [`TransitionError`] if `to` is not reachable from `from`
pub fn validate_transition(from: Phase, to: Phase) -> Result<(), TransitionError> {
    if from == to || allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Phases reachable from `from` in one action
#[must_use]
pub fn allowed_transitions(from: Phase) -> Vec<Phase> {
    use Phase::{Error, Loading, ReadyClean, ReadyDirty, Saving, Uninitialized};
    match from {
        Uninitialized => vec![Loading, ReadyClean, Error],
        Loading => vec![ReadyClean, ReadyDirty, Error],
        ReadyClean => vec![ReadyDirty, Loading, Saving, Error],
        ReadyDirty => vec![ReadyClean, Loading, Saving, Error],
        Saving => vec![ReadyClean, ReadyDirty, Error],
        Error => vec![Loading, ReadyClean, ReadyDirty, Saving],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{reduce, Action};
    use themesync_document::{ConfigurationDocument, ErrorInfo, FailureReason};

    #[test]
    fn load_sequence_is_legal() {
        let s0 = SyncState::initial();
        let s1 = reduce(&s0, Action::SetLoading(true));
        let s2 = reduce(&s1, Action::SetConfig(ConfigurationDocument::emergency_default()));

        assert_eq!(Phase::of(&s0), Phase::Uninitialized);
        assert_eq!(Phase::of(&s1), Phase::Loading);
        assert_eq!(Phase::of(&s2), Phase::ReadyClean);
        assert!(validate_transition(Phase::of(&s0), Phase::of(&s1)).is_ok());
        assert!(validate_transition(Phase::of(&s1), Phase::of(&s2)).is_ok());
    }

    #[test]
    fn failed_load_enters_error() {
        let loading = reduce(&SyncState::initial(), Action::SetLoading(true));
        let failed = reduce(
            &loading,
            Action::SetError(Some(ErrorInfo::new(FailureReason::Auth, "expired"))),
        );
        assert_eq!(Phase::of(&failed), Phase::Error);
        assert!(validate_transition(Phase::Loading, Phase::Error).is_ok());
    }

    #[test]
    fn saving_cannot_jump_to_uninitialized() {
        assert_eq!(
            validate_transition(Phase::Saving, Phase::Uninitialized),
            Err(TransitionError {
                from: Phase::Saving,
                to: Phase::Uninitialized,
            })
        );
        assert!(validate_transition(Phase::Uninitialized, Phase::ReadyDirty).is_err());
    }

    #[test]
    fn self_transition_allowed() {
        for phase in [Phase::Loading, Phase::Error, Phase::ReadyDirty] {
            assert!(validate_transition(phase, phase).is_ok());
        }
    }

    #[test]
    fn no_phase_is_terminal() {
        for phase in [
            Phase::Uninitialized,
            Phase::Loading,
            Phase::ReadyClean,
            Phase::ReadyDirty,
            Phase::Saving,
            Phase::Error,
        ] {
            assert!(!allowed_transitions(phase).is_empty(), "{phase:?}");
        }
    }
}
