//! Synchronization state, actions and the reducer
//!
//! [`reduce`] is a pure function. After every action the dirty flag is
//! recomputed from the comparison engine, so `is_dirty` always equals
//! "config differs from saved_config".

use serde::Serialize;
use themesync_document::{
    compare, ConfigPatch, ConfigSource, ConfigurationDocument, ErrorInfo, PresetDocument,
};

/// Everything the interface needs to render the configuration editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// Live, possibly edited document
    pub config: ConfigurationDocument,
    /// Last loaded or saved baseline
    pub saved_config: ConfigurationDocument,
    pub presets: Vec<PresetDocument>,
    pub loading: bool,
    pub saving: bool,
    pub error: Option<ErrorInfo>,
    pub is_dirty: bool,
    pub config_source: ConfigSource,
    pub is_global_admin: bool,
    /// A document has been loaded (or accepted offline)
    pub initialized: bool,
}

impl SyncState {
    /// Pre-load state holding the emergency default as both documents
    #[must_use]
    pub fn initial() -> Self {
        let doc = ConfigurationDocument::emergency_default();
        Self {
            config: doc.clone(),
            saved_config: doc,
            presets: Vec::new(),
            loading: false,
            saving: false,
            error: None,
            is_dirty: false,
            config_source: ConfigSource::default(),
            is_global_admin: false,
            initialized: false,
        }
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::initial()
    }
}

/// State transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    SetLoading(bool),
    /// Record (`Some`) or clear (`None`) a failure
    SetError(Option<ErrorInfo>),
    /// A freshly loaded document becomes both live and baseline
    SetConfig(ConfigurationDocument),
    /// The stored document from a successful save becomes live and baseline
    SetSavedConfig(ConfigurationDocument),
    /// Shallow-merge a partial document into the live one
    UpdateConfig(ConfigPatch),
    /// Replace the live document
    ReplaceConfig(ConfigurationDocument),
    /// Confirm the dirty flag (the computed value always wins)
    SetDirty(bool),
    SetSaving(bool),
    /// Live document becomes the emergency default
    ResetToDefault,
    /// Live document reverts to the baseline
    DiscardChanges,
    SetPresets(Vec<PresetDocument>),
    SetContextualData {
        source: ConfigSource,
        is_global_admin: bool,
    },
}

impl Action {
    /// Stable name for logs
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SetLoading(_) => "SET_LOADING",
            Self::SetError(_) => "SET_ERROR",
            Self::SetConfig(_) => "SET_CONFIG",
            Self::SetSavedConfig(_) => "SET_SAVED_CONFIG",
            Self::UpdateConfig(_) => "UPDATE_CONFIG",
            Self::ReplaceConfig(_) => "REPLACE_CONFIG",
            Self::SetDirty(_) => "SET_DIRTY",
            Self::SetSaving(_) => "SET_SAVING",
            Self::ResetToDefault => "RESET_TO_DEFAULT",
            Self::DiscardChanges => "DISCARD_CHANGES",
            Self::SetPresets(_) => "SET_PRESETS",
            Self::SetContextualData { .. } => "SET_CONTEXTUAL_DATA",
        }
    }
}

/// Apply `action` to `state`
#[must_use]
pub fn reduce(state: &SyncState, action: Action) -> SyncState {
    let mut next = state.clone();

    match action {
        Action::SetLoading(loading) => next.loading = loading,
        Action::SetError(error) => {
            if error.is_some() {
                next.loading = false;
            }
            next.error = error;
        }
        Action::SetConfig(doc) => {
            next.saved_config = doc.clone();
            next.config = doc;
            next.loading = false;
            next.error = None;
            next.initialized = true;
        }
        Action::SetSavedConfig(doc) => {
            next.saved_config = doc.clone();
            next.config = doc;
            next.error = None;
        }
        Action::UpdateConfig(patch) => next.config = next.config.merged(patch),
        Action::ReplaceConfig(doc) => next.config = doc,
        Action::SetDirty(requested) => {
            let computed = compare::has_unsaved_changes(&next.config, &next.saved_config);
            if requested != computed {
                tracing::debug!(requested, computed, "ignoring dirty flag that contradicts documents");
            }
        }
        Action::SetSaving(saving) => next.saving = saving,
        Action::ResetToDefault => next.config = ConfigurationDocument::emergency_default(),
        Action::DiscardChanges => next.config = next.saved_config.clone(),
        Action::SetPresets(presets) => next.presets = presets,
        Action::SetContextualData {
            source,
            is_global_admin,
        } => {
            next.config_source = source;
            next.is_global_admin = is_global_admin;
        }
    }

    next.is_dirty = compare::has_unsaved_changes(&next.config, &next.saved_config);
    next
}

/// Whether the live document differs from the baseline
#[inline]
#[must_use]
pub fn has_unsaved_changes(state: &SyncState) -> bool {
    state.is_dirty
}

/// Human-readable summary of pending changes
#[must_use]
pub fn changes_summary(state: &SyncState) -> String {
    compare::changes_summary(&state.config, &state.saved_config)
}

/// Global admins may edit anything; others only their personal document
#[inline]
#[must_use]
pub fn can_modify_config(state: &SyncState) -> bool {
    state.is_global_admin || state.config_source == ConfigSource::User
}
