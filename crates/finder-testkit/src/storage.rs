//! Storage that can be told to fail.

use async_trait::async_trait;
use finder_core::{MemoryStorage, StorageEffects, StorageError};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashSet};

/// [`MemoryStorage`] with per-key write failures.
#[derive(Debug, Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing_writes: Mutex<HashSet<String>>,
    failing_reads: Mutex<bool>,
}

impl FlakyStorage {
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
            inner: MemoryStorage::with_entries(entries),
            ..Self::default()
        }
    }

    /// Fail every write and remove of `key`.
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_writes.lock().insert(key.to_string());
    }

    /// Fail every read.
    pub fn fail_reads(&self, fail: bool) {
        *self.failing_reads.lock() = fail;
    }

    /// Current contents.
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.inner.entries()
    }

    fn check_write(&self, key: &str) -> Result<(), StorageError> {
        if self.failing_writes.lock().contains(key) {
            Err(StorageError::WriteFailed(format!("quota exceeded for {key}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl StorageEffects for FlakyStorage {
    async fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_write(key)?;
        self.inner.store(key, value).await
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError> {
        if *self.failing_reads.lock() {
            return Err(StorageError::ReadFailed(format!("storage unavailable for {key}")));
        }
        self.inner.retrieve(key).await
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        self.check_write(key)?;
        self.inner.remove(key).await
    }
}
