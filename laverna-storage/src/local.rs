//! Local filesystem save target.
//!
//! This is the default target for desktop and CLI exports.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, instrument};

use crate::error::{Result, StorageError};
use crate::traits::{validate_filename, SaveTarget, SavedObject};

/// Saves payloads as files under a base directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    /// Create a new local save target.
    ///
    /// The base path is created on first save if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Get the base path for this target.
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    fn to_fs_path(&self, filename: &str) -> Result<PathBuf> {
        validate_filename(filename)?;
        Ok(self.base_path.join(filename))
    }

    async fn ensure_parent(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl SaveTarget for LocalStorage {
    #[instrument(skip(self, payload), fields(filename = %filename, size = payload.len()))]
    async fn save(&self, payload: Bytes, filename: &str) -> Result<SavedObject> {
        let fs_path = self.to_fs_path(filename)?;
        self.ensure_parent(&fs_path).await?;

        debug!("Writing {} bytes to {:?}", payload.len(), fs_path);
        match fs::write(&fs_path, &payload).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(StorageError::PermissionDenied(fs_path.display().to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(SavedObject {
            filename: filename.to_string(),
            size: payload.len() as u64,
        })
    }

    #[instrument(skip(self), fields(filename = %filename))]
    async fn load(&self, filename: &str) -> Result<Bytes> {
        let fs_path = self.to_fs_path(filename)?;
        debug!("Reading from {:?}", fs_path);

        match fs::read(&fs_path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_storage() -> (LocalStorage, TempDir) {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path());
        (storage, temp)
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (storage, _temp) = create_test_storage();
        let data = Bytes::from("zip bytes");

        let saved = storage.save(data.clone(), "laverna-backup.zip").await.unwrap();
        assert_eq!(saved.size, data.len() as u64);

        let read = storage.load("laverna-backup.zip").await.unwrap();
        assert_eq!(read, data);
    }

    #[tokio::test]
    async fn test_save_creates_base_dir() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path().join("nested/out"));

        storage
            .save(Bytes::from("key"), "lav-private-key.asc")
            .await
            .unwrap();

        assert!(temp.path().join("nested/out/lav-private-key.asc").exists());
    }

    #[tokio::test]
    async fn test_load_not_found() {
        let (storage, _temp) = create_test_storage();

        let result = storage.load("missing.zip").await;
        assert!(matches!(result.unwrap_err(), StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_rejects_escaping_name() {
        let (storage, _temp) = create_test_storage();

        let result = storage.save(Bytes::from("x"), "../outside.zip").await;
        assert!(matches!(result.unwrap_err(), StorageError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_overwrite() {
        let (storage, _temp) = create_test_storage();

        storage.save(Bytes::from("version 1"), "a.zip").await.unwrap();
        storage.save(Bytes::from("version 2"), "a.zip").await.unwrap();

        assert_eq!(storage.load("a.zip").await.unwrap(), Bytes::from("version 2"));
    }

    #[test]
    fn test_backend_name() {
        let (storage, temp) = create_test_storage();
        assert_eq!(storage.backend_name(), "local");
        assert_eq!(storage.base_path(), temp.path());
    }
}
