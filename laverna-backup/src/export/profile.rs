//! Fetch and export every collection of a profile.

use futures::future::try_join_all;
use tracing::{info, instrument};

use super::collection::{profile_base, CollectionExporter};
use crate::error::Result;
use crate::model::{Collection, EntityKind};
use crate::source::DataSource;

/// Fetch the full collection of every entity kind for `profile_id`.
///
/// All fetches run concurrently; the first failure aborts the rest.
pub async fn fetch_profile(source: &dyn DataSource, profile_id: &str) -> Result<Vec<Collection>> {
    let fetches = EntityKind::ALL
        .into_iter()
        .map(|kind| source.find(kind, profile_id));
    try_join_all(fetches).await
}

/// Export one profile under `{archive_root}/{profile_id}`.
///
/// Nothing is written unless every fetch succeeded.
#[instrument(skip(source, exporter))]
pub async fn export_profile(
    source: &dyn DataSource,
    exporter: &CollectionExporter<'_>,
    archive_root: &str,
    profile_id: &str,
) -> Result<usize> {
    let collections = fetch_profile(source, profile_id).await?;
    let written = exporter.export_collections(&profile_base(archive_root, profile_id), &collections)?;
    info!(profile_id, entries = written, "profile exported");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::export::{ArchiveBuilder, EntrySerializer};
    use crate::source::MemorySource;
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct FailingSource {
        inner: MemorySource,
        failing: EntityKind,
    }

    #[async_trait]
    impl DataSource for FailingSource {
        async fn find(&self, kind: EntityKind, profile_id: &str) -> Result<Collection> {
            if kind == self.failing {
                return Err(Error::Fetch {
                    kind,
                    profile: profile_id.to_string(),
                    reason: "database closed".to_string(),
                });
            }
            self.inner.find(kind, profile_id).await
        }

        async fn find_config(&self, name: &str) -> Result<Option<Value>> {
            self.inner.find_config(name).await
        }

        fn source_name(&self) -> &str {
            "failing"
        }
    }

    fn seeded() -> MemorySource {
        MemorySource::new()
            .with_collection(
                "test",
                Collection::from_json(EntityKind::Notes, json!([{"id": "1", "content": "hi"}]))
                    .unwrap(),
            )
            .with_collection(
                "test",
                Collection::from_json(EntityKind::Tags, json!([{"id": "t"}])).unwrap(),
            )
    }

    #[tokio::test]
    async fn test_fetch_profile_returns_every_kind() {
        let collections = fetch_profile(&seeded(), "test").await.unwrap();
        let kinds: Vec<EntityKind> = collections.iter().map(|c| c.kind()).collect();
        assert_eq!(kinds, EntityKind::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_export_profile_layout() {
        let builder = ArchiveBuilder::new();
        let exporter = CollectionExporter::new(&builder, EntrySerializer::default());

        export_profile(&seeded(), &exporter, "laverna-backups", "test")
            .await
            .unwrap();

        assert_eq!(
            builder.paths(),
            vec![
                "laverna-backups/test/configs.json",
                "laverna-backups/test/notebooks.json",
                "laverna-backups/test/notes/1.json",
                "laverna-backups/test/notes/1.md",
                "laverna-backups/test/tags.json",
                "laverna-backups/test/users.json",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_fetch_writes_nothing() {
        let source = FailingSource {
            inner: seeded(),
            failing: EntityKind::Files,
        };
        let builder = ArchiveBuilder::new();
        let exporter = CollectionExporter::new(&builder, EntrySerializer::default());

        let err = export_profile(&source, &exporter, "laverna-backups", "test")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Fetch { kind: EntityKind::Files, .. }));
        assert!(builder.is_empty());
    }
}
