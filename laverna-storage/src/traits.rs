//! Core save trait definitions.
//!
//! The `SaveTarget` trait is the single seam through which finished backup
//! payloads leave the export engine.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Metadata about a saved payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedObject {
    /// File name the payload was saved under
    pub filename: String,
    /// Size in bytes
    pub size: u64,
}

/// Destination for exported payloads.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` so a target can be shared with
/// the async tasks that drive an export.
#[async_trait]
pub trait SaveTarget: Send + Sync {
    /// Persist `payload` under `filename`.
    ///
    /// Overwrites an existing object with the same name.
    async fn save(&self, payload: Bytes, filename: &str) -> Result<SavedObject>;

    /// Read back a saved payload.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if nothing was saved under `filename`.
    async fn load(&self, filename: &str) -> Result<Bytes>;

    /// Get a human-readable name for this target.
    fn backend_name(&self) -> &'static str;
}

/// Reject names that would escape the target (absolute paths, `..`, empty segments).
pub fn validate_filename(filename: &str) -> Result<()> {
    let invalid = filename.is_empty()
        || filename.starts_with('/')
        || filename.contains('\\')
        || filename
            .split('/')
            .any(|part| part.is_empty() || part == "." || part == "..");

    if invalid {
        return Err(StorageError::InvalidPath(filename.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStorage;

    #[test]
    fn test_validate_filename() {
        assert!(validate_filename("laverna-backup.zip").is_ok());
        assert!(validate_filename("backups/laverna-backup.zip").is_ok());
        assert!(validate_filename("").is_err());
        assert!(validate_filename("/etc/passwd").is_err());
        assert!(validate_filename("../up.zip").is_err());
        assert!(validate_filename("a//b").is_err());
        assert!(validate_filename("a\\b").is_err());
    }

    #[tokio::test]
    async fn test_save_then_load_through_trait_object() {
        let storage: Box<dyn SaveTarget> = Box::new(MemoryStorage::new());
        let saved = storage
            .save(Bytes::from_static(b"private key"), "lav-private-key.asc")
            .await
            .unwrap();

        assert_eq!(saved.filename, "lav-private-key.asc");
        assert_eq!(saved.size, 11);
        assert_eq!(
            storage.load("lav-private-key.asc").await.unwrap(),
            Bytes::from_static(b"private key")
        );
    }
}
