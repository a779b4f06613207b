//! In-process store for tests and offline demos

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use themesync_document::{
    ConfigContext, ConfigurationDocument, NewPreset, PresetDocument, PresetUpdate,
};

use crate::store::{RemoteConfig, RemoteConfigStore, StoreError};

#[derive(Debug)]
struct Inner {
    current: Option<RemoteConfig>,
    presets: Vec<PresetDocument>,
    reachable: bool,
    reject_saves: bool,
    accepted_token: Option<String>,
    next_id: u64,
    requests: usize,
}

/// [`RemoteConfigStore`] held in memory.
///
/// Can simulate outages ([`set_reachable`](Self::set_reachable)), failed
/// saves and token rejection.
#[derive(Debug)]
pub struct InMemoryConfigStore {
    inner: Mutex<Inner>,
}

impl Default for InMemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConfigStore {
    /// Empty, reachable store accepting any token
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                current: None,
                presets: Vec::new(),
                reachable: true,
                reject_saves: false,
                accepted_token: None,
                next_id: 1,
                requests: 0,
            }),
        }
    }

    /// Seed the current document
    #[must_use]
    pub fn with_config(self, document: ConfigurationDocument) -> Self {
        self.set_config(document);
        self
    }

    /// Seed presets
    #[must_use]
    pub fn with_presets(self, presets: Vec<PresetDocument>) -> Self {
        self.inner.lock().presets = presets;
        self
    }

    /// Only accept `token`
    #[must_use]
    pub fn with_accepted_token(self, token: impl Into<String>) -> Self {
        self.inner.lock().accepted_token = Some(token.into());
        self
    }

    /// Replace the current document (simulates a change from elsewhere)
    pub fn set_config(&self, document: ConfigurationDocument) {
        let mut inner = self.inner.lock();
        let context = inner
            .current
            .as_ref()
            .map_or_else(ConfigContext::default, |c| c.context);
        inner.current = Some(RemoteConfig::new(document, context));
    }

    /// Set the context reported with the current document
    pub fn set_context(&self, context: ConfigContext) {
        if let Some(current) = self.inner.lock().current.as_mut() {
            current.context = context;
        }
    }

    /// Toggle simulated outage
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.lock().reachable = reachable;
    }

    /// Make saves fail with a server error
    pub fn set_reject_saves(&self, reject: bool) {
        self.inner.lock().reject_saves = reject;
    }

    /// Stored document
    #[must_use]
    pub fn current(&self) -> Option<ConfigurationDocument> {
        self.inner.lock().current.as_ref().map(|c| c.document.clone())
    }

    /// Stored presets
    #[must_use]
    pub fn presets(&self) -> Vec<PresetDocument> {
        self.inner.lock().presets.clone()
    }

    /// Requests served or refused so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.inner.lock().requests
    }

    fn begin<'a>(
        &'a self,
        token: &str,
    ) -> Result<parking_lot::MutexGuard<'a, Inner>, StoreError> {
        let mut inner = self.inner.lock();
        inner.requests += 1;
        if !inner.reachable {
            return Err(StoreError::Unreachable("connection refused".to_string()));
        }
        if inner
            .accepted_token
            .as_deref()
            .is_some_and(|accepted| accepted != token)
        {
            return Err(StoreError::Unauthorized(401));
        }
        Ok(inner)
    }
}

fn find_user_preset<'a>(
    presets: &'a mut [PresetDocument],
    id: &str,
) -> Result<&'a mut PresetDocument, StoreError> {
    let preset = presets
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| StoreError::NotFound(format!("preset {id}")))?;
    if preset.is_system {
        return Err(StoreError::Rejected(format!("preset {id} is a system preset")));
    }
    Ok(preset)
}

#[async_trait]
impl RemoteConfigStore for InMemoryConfigStore {
    async fn get_current_config(&self, token: &str) -> Result<Option<RemoteConfig>, StoreError> {
        Ok(self.begin(token)?.current.clone())
    }

    async fn save_config(
        &self,
        token: &str,
        document: &ConfigurationDocument,
    ) -> Result<ConfigurationDocument, StoreError> {
        let mut inner = self.begin(token)?;
        if inner.reject_saves {
            return Err(StoreError::Status {
                status: 500,
                body: "save failed".to_string(),
            });
        }

        let mut stored = document.clone();
        if stored.id.is_none() {
            stored.id = Some(format!("config-{}", inner.next_id));
            inner.next_id += 1;
        }
        stored.updated_at = Some(Utc::now());

        let context = inner
            .current
            .as_ref()
            .map_or_else(ConfigContext::default, |c| c.context);
        inner.current = Some(RemoteConfig::new(stored.clone(), context));
        Ok(stored)
    }

    async fn get_presets(&self, token: &str) -> Result<Vec<PresetDocument>, StoreError> {
        Ok(self.begin(token)?.presets.clone())
    }

    async fn create_preset(
        &self,
        token: &str,
        preset: &NewPreset,
    ) -> Result<PresetDocument, StoreError> {
        let mut inner = self.begin(token)?;
        if inner.presets.iter().any(|p| p.name == preset.name) {
            return Err(StoreError::Rejected(format!(
                "preset named '{}' already exists",
                preset.name
            )));
        }

        let now = Utc::now();
        let created = PresetDocument {
            id: format!("preset-{}", inner.next_id),
            name: preset.name.clone(),
            description: preset.description.clone(),
            config: preset.config.clone(),
            is_system: false,
            is_default: false,
            created_at: Some(now),
            updated_at: Some(now),
        };
        inner.next_id += 1;
        inner.presets.push(created.clone());
        Ok(created)
    }

    async fn update_preset(
        &self,
        token: &str,
        id: &str,
        update: &PresetUpdate,
    ) -> Result<PresetDocument, StoreError> {
        let mut inner = self.begin(token)?;
        let preset = find_user_preset(&mut inner.presets, id)?;
        preset.name.clone_from(&update.name);
        preset.description.clone_from(&update.description);
        preset.config = update.config.clone();
        preset.is_default = update.is_default;
        preset.updated_at = Some(Utc::now());
        Ok(preset.clone())
    }

    async fn delete_preset(&self, token: &str, id: &str) -> Result<(), StoreError> {
        let mut inner = self.begin(token)?;
        find_user_preset(&mut inner.presets, id)?;
        inner.presets.retain(|p| p.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themesync_document::compare;

    #[tokio::test]
    async fn save_assigns_id_and_timestamps() {
        let store = InMemoryConfigStore::new();
        let doc = ConfigurationDocument::emergency_default();

        let saved = store.save_config("t", &doc).await.unwrap();
        assert_eq!(saved.id.as_deref(), Some("config-1"));
        assert!(saved.updated_at.is_some());
        assert!(compare::are_equal(&saved, &doc));
        assert_eq!(store.current(), Some(saved));
    }

    #[tokio::test]
    async fn outage_and_token_rejection() {
        let store = InMemoryConfigStore::new().with_accepted_token("good");
        assert_eq!(
            store.get_current_config("bad").await,
            Err(StoreError::Unauthorized(401))
        );

        store.set_reachable(false);
        assert!(matches!(
            store.get_current_config("good").await,
            Err(StoreError::Unreachable(_))
        ));
        assert_eq!(store.request_count(), 2);
    }

    #[tokio::test]
    async fn system_presets_are_read_only() {
        let system = PresetDocument {
            id: "sys".to_string(),
            name: "Default".to_string(),
            description: String::new(),
            config: ConfigurationDocument::emergency_default(),
            is_system: true,
            is_default: true,
            created_at: None,
            updated_at: None,
        };
        let store = InMemoryConfigStore::new().with_presets(vec![system.clone()]);

        assert!(matches!(
            store.delete_preset("t", "sys").await,
            Err(StoreError::Rejected(_))
        ));
        assert!(matches!(
            store.update_preset("t", "sys", &PresetUpdate::from(&system)).await,
            Err(StoreError::Rejected(_))
        ));
        assert_eq!(store.presets().len(), 1);
    }

    #[tokio::test]
    async fn preset_lifecycle() {
        let store = InMemoryConfigStore::new();
        let doc = ConfigurationDocument::emergency_default();
        let created = store
            .create_preset("t", &NewPreset::from_config("Mine", "", &doc))
            .await
            .unwrap();
        assert!(!created.is_system);

        let mut update = PresetUpdate::from(&created);
        update.name = "Renamed".to_string();
        let updated = store.update_preset("t", &created.id, &update).await.unwrap();
        assert_eq!(updated.name, "Renamed");

        store.delete_preset("t", &created.id).await.unwrap();
        assert!(store.presets().is_empty());
        assert!(matches!(
            store.delete_preset("t", &created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
