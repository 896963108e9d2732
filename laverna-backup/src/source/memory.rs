//! In-memory data source.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use super::DataSource;
use crate::error::Result;
use crate::model::{Collection, EntityKind};

/// Data source backed by in-process maps.
///
/// Kinds that were never registered for a profile come back as empty
/// collections, the same as an untouched profile in the app.
#[derive(Default)]
pub struct MemorySource {
    collections: RwLock<HashMap<(String, EntityKind), Collection>>,
    configs: RwLock<HashMap<String, Value>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, profile_id: &str, collection: Collection) -> Self {
        self.insert_collection(profile_id, collection);
        self
    }

    pub fn with_config(self, name: &str, value: Value) -> Self {
        self.set_config(name, value);
        self
    }

    /// Replace the collection of `collection.kind()` in a profile.
    pub fn insert_collection(&self, profile_id: &str, collection: Collection) {
        self.collections
            .write()
            .insert((profile_id.to_string(), collection.kind()), collection);
    }

    pub fn set_config(&self, name: &str, value: Value) {
        self.configs.write().insert(name.to_string(), value);
    }
}

#[async_trait]
impl DataSource for MemorySource {
    async fn find(&self, kind: EntityKind, profile_id: &str) -> Result<Collection> {
        let collection = self
            .collections
            .read()
            .get(&(profile_id.to_string(), kind))
            .cloned()
            .unwrap_or_else(|| Collection::empty(kind));
        debug!(%kind, profile_id, records = collection.len(), "memory fetch");
        Ok(collection)
    }

    async fn find_config(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.configs.read().get(name).cloned())
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use serde_json::json;

    #[tokio::test]
    async fn test_unknown_kind_is_empty() {
        let source = MemorySource::new();
        let tags = source.find(EntityKind::Tags, "default").await.unwrap();
        assert_eq!(tags.kind(), EntityKind::Tags);
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_profile_scoped() {
        let note = Record::from_value(json!({"id": "1", "content": "hi"})).unwrap();
        let source = MemorySource::new()
            .with_collection("work", Collection::new(EntityKind::Notes, vec![note]));

        assert_eq!(source.find(EntityKind::Notes, "work").await.unwrap().len(), 1);
        assert!(source.find(EntityKind::Notes, "default").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_configs() {
        let source = MemorySource::new().with_config("privateKey", json!("k"));
        assert_eq!(source.find_config("privateKey").await.unwrap(), Some(json!("k")));
        assert_eq!(source.find_config("other").await.unwrap(), None);
        assert_eq!(source.source_name(), "memory");
    }
}
