//! Persistent key-value stores
//!
//! The contract mirrors browser-local storage: string keys, string values,
//! synchronous access.

use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::error::{StorageError, StorageResult};

/// Durable string key-value store
pub trait KeyValueStore: Send + Sync + Debug {
    /// Read a value
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be read
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write a value
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove a value (no-op if absent)
    ///
    /// # Errors
    /// Returns error if the backing storage cannot be written
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Process-local store
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    inner: Mutex<BTreeMap<String, String>>,
}

impl MemoryKeyValueStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.inner.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.inner.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.inner.lock().remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Writes go to a sibling temp file that is renamed over the original.
#[derive(Debug)]
pub struct FileKeyValueStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Store at `path`; the file is created on first write
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::io_error(&self.path, e)),
        }
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::io_error(parent, e))?;
            }
        }
        let json = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| StorageError::io_error(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StorageError::io_error(&self.path, e))
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }
}
