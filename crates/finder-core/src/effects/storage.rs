//! Durable client storage
//!
//! The browser's local storage, abstracted: string keys map to string values
//! and survive reloads. Exactly one component, the session store, writes the
//! session keys.

use crate::errors::FinderError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;

/// Storage failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    /// Reading a key failed
    #[error("read failed: {0}")]
    ReadFailed(String),
    /// Writing a key failed
    #[error("write failed: {0}")]
    WriteFailed(String),
}

impl From<StorageError> for FinderError {
    fn from(err: StorageError) -> Self {
        FinderError::storage(err.to_string())
    }
}

/// Key/value durable storage.
#[async_trait]
pub trait StorageEffects: Send + Sync {
    /// Write `value` under `key`, replacing any previous value.
    async fn store(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read the value under `key`.
    async fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Delete `key`. Returns whether a value was present.
    async fn remove(&self, key: &str) -> Result<bool, StorageError>;
}

/// In-memory storage handler.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-populated with `entries`.
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Copy of every stored entry.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.entries.lock().clone()
    }

    /// Read a key synchronously.
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl StorageEffects for MemoryStorage {
    async fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.lock().remove(key).is_some())
    }
}
