//! Filesystem data source.
//!
//! Layout: `data_dir/<profile>/<kind>.json`, each file a JSON array of
//! records. Configs are `{ "name": ..., "value": ... }` records read from
//! the config profile.

use async_trait::async_trait;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, instrument};

use super::DataSource;
use crate::error::{Error, Result};
use crate::model::{Collection, EntityKind};

#[derive(Debug, Clone)]
pub struct DirSource {
    data_dir: PathBuf,
    config_profile: String,
}

impl DirSource {
    pub fn new(data_dir: impl Into<PathBuf>, config_profile: impl Into<String>) -> Self {
        Self {
            data_dir: data_dir.into(),
            config_profile: config_profile.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn kind_path(&self, profile_id: &str, kind: EntityKind) -> PathBuf {
        self.data_dir
            .join(profile_id)
            .join(format!("{}.json", kind.name()))
    }

    /// A missing file is an empty collection, not an error.
    async fn read_array(&self, path: &Path) -> std::result::Result<Value, String> {
        match fs::read_to_string(path).await {
            Ok(content) => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Value::Array(Vec::new())),
            Err(e) => Err(e.to_string()),
        }
    }
}

#[async_trait]
impl DataSource for DirSource {
    #[instrument(skip(self, kind), fields(kind = %kind))]
    async fn find(&self, kind: EntityKind, profile_id: &str) -> Result<Collection> {
        if profile_id.is_empty() || profile_id.contains(['/', '\\']) || profile_id == ".." {
            return Err(Error::Fetch {
                kind,
                profile: profile_id.to_string(),
                reason: "invalid profile id".to_string(),
            });
        }

        let path = self.kind_path(profile_id, kind);
        debug!("Reading {:?}", path);

        let fetch_error = |reason: String| Error::Fetch {
            kind,
            profile: profile_id.to_string(),
            reason,
        };
        let value = self.read_array(&path).await.map_err(fetch_error)?;
        Collection::from_json(kind, value).map_err(|e| fetch_error(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn find_config(&self, name: &str) -> Result<Option<Value>> {
        let path = self.kind_path(&self.config_profile, EntityKind::Configs);
        let configs = self
            .read_array(&path)
            .await
            .map_err(|reason| Error::ConfigFetch {
                name: name.to_string(),
                reason,
            })?;

        let found = configs.as_array().and_then(|items| {
            items
                .iter()
                .find(|item| item.get("name").and_then(Value::as_str) == Some(name))
                .and_then(|item| item.get("value").cloned())
        });
        Ok(found)
    }

    fn source_name(&self) -> &str {
        "dir"
    }
}
