//! File-backed durable storage.
//!
//! One file per key under a base directory. Writes go to a temporary file
//! that is renamed over the target, so a crash never leaves a half-written
//! session value.

use async_trait::async_trait;
use finder_core::{StorageEffects, StorageError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem storage handler.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Store files under `base_path`, created on first write.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Base directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::WriteFailed(format!("invalid key: {key:?}")));
        }
        Ok(self.base_path.join(format!("{key}.dat")))
    }
}

#[async_trait]
impl StorageEffects for FileStorage {
    async fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.file_path(key)?;
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create directory: {e}"))
        })?;

        let tmp = path.with_extension("dat.tmp");
        fs::write(&tmp, value)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to write file: {e}")))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| StorageError::WriteFailed(format!("Failed to replace file: {e}")))?;
        Ok(())
    }

    async fn retrieve(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self
            .file_path(key)
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;
        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed(format!("Failed to read file: {e}"))),
        }
    }

    async fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.file_path(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::WriteFailed(format!("Failed to remove file: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_retrieve_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session"));

        assert_eq!(storage.retrieve("token").await.unwrap(), None);
        storage.store("token", "abc").await.unwrap();
        storage.store("token", "def").await.unwrap();
        assert_eq!(storage.retrieve("token").await.unwrap().as_deref(), Some("def"));

        assert!(storage.remove("token").await.unwrap());
        assert!(!storage.remove("token").await.unwrap());
        assert_eq!(storage.retrieve("token").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_values_survive_a_new_handle() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path())
            .store("isAuthenticated", "true")
            .await
            .unwrap();
        let reopened = FileStorage::new(dir.path());
        assert_eq!(
            reopened.retrieve("isAuthenticated").await.unwrap().as_deref(),
            Some("true")
        );
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.store("../escape", "x").await.is_err());
        assert!(storage.retrieve("").await.is_err());
    }
}
