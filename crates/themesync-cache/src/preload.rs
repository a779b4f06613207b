//! Preloaded snapshot slot
//!
//! The hosting environment can embed a configuration document before the
//! first render. When present it is preferred over every other source for
//! that load.

use themesync_document::ConfigurationDocument;

use crate::error::StorageResult;

/// Environment variable the host uses to embed a snapshot (JSON)
pub const PRELOAD_ENV_VAR: &str = "THEMESYNC_PRELOADED_CONFIG";

/// The single well-known preload slot, read once at construction
#[derive(Debug, Clone, Default)]
pub struct PreloadSlot {
    snapshot: Option<ConfigurationDocument>,
}

impl PreloadSlot {
    /// Slot with nothing preloaded
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Slot holding `doc`
    #[inline]
    #[must_use]
    pub fn with_document(doc: ConfigurationDocument) -> Self {
        Self {
            snapshot: Some(doc),
        }
    }

    /// Decode a JSON snapshot
    ///
    /// # Errors
    /// Returns error if the JSON is not a configuration document
    pub fn from_json(json: &str) -> StorageResult<Self> {
        let doc: ConfigurationDocument = serde_json::from_str(json)?;
        Ok(Self::with_document(doc))
    }

    /// Read [`PRELOAD_ENV_VAR`]; a malformed snapshot is logged and ignored
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(PRELOAD_ENV_VAR) {
            Ok(json) if !json.trim().is_empty() => Self::from_json(&json).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring malformed preloaded configuration");
                Self::empty()
            }),
            _ => Self::empty(),
        }
    }

    /// The preloaded document, if any
    #[inline]
    #[must_use]
    pub fn get(&self) -> Option<&ConfigurationDocument> {
        self.snapshot.as_ref()
    }

    /// Remove and return the document; later reads see an empty slot
    #[inline]
    pub fn take(&mut self) -> Option<ConfigurationDocument> {
        self.snapshot.take()
    }

    /// Whether a snapshot was provided
    #[inline]
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.snapshot.is_some()
    }
}
