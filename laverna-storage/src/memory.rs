//! In-memory save target.
//!
//! Keeps every save in order, so callers can assert how often and under which
//! name a payload was handed over.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::error::{Result, StorageError};
use crate::traits::{validate_filename, SaveTarget, SavedObject};

/// A single recorded save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    pub filename: String,
    pub payload: Bytes,
}

/// Save target that records payloads in memory.
///
/// Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    saves: Arc<Mutex<Vec<SaveRecord>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// All saves in the order they happened.
    pub fn saves(&self) -> Vec<SaveRecord> {
        self.saves.lock().clone()
    }

    /// Number of saves performed.
    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    /// The most recent save, if any.
    pub fn last(&self) -> Option<SaveRecord> {
        self.saves.lock().last().cloned()
    }
}

#[async_trait]
impl SaveTarget for MemoryStorage {
    async fn save(&self, payload: Bytes, filename: &str) -> Result<SavedObject> {
        validate_filename(filename)?;
        debug!("Recording {} bytes as {}", payload.len(), filename);

        let size = payload.len() as u64;
        self.saves.lock().push(SaveRecord {
            filename: filename.to_string(),
            payload,
        });

        Ok(SavedObject {
            filename: filename.to_string(),
            size,
        })
    }

    async fn load(&self, filename: &str) -> Result<Bytes> {
        self.saves
            .lock()
            .iter()
            .rev()
            .find(|record| record.filename == filename)
            .map(|record| record.payload.clone())
            .ok_or_else(|| StorageError::NotFound(filename.to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
