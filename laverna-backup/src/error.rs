use laverna_storage::StorageError;
use thiserror::Error;

use crate::model::EntityKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Fetch failed for {kind} in profile '{profile}': {reason}")]
    Fetch {
        kind: EntityKind,
        profile: String,
        reason: String,
    },

    #[error("Config fetch failed for '{name}': {reason}")]
    ConfigFetch { name: String, reason: String },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Private key not found in config '{0}'")]
    KeyNotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

pub type Result<T> = std::result::Result<T, Error>;
