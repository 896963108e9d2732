//! In-memory archive tree and its zip finalization.
//!
//! Entries accumulate in a path-ordered map, so finalizing the same set of
//! entries always yields the same bytes.

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use tracing::{debug, instrument};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// One file destined for the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub content: Bytes,
}

impl ArchiveEntry {
    pub fn new(path: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }
}

/// Accumulates archive entries for a single export run.
///
/// `insert` takes `&self` so concurrently running profile exports can share
/// one builder; their paths never overlap.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    entries: Mutex<BTreeMap<String, Bytes>>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. A later insert to the same path replaces the earlier one.
    pub fn insert(&self, path: impl Into<String>, content: impl Into<Bytes>) {
        let path = path.into();
        let content = content.into();
        if self.entries.lock().insert(path.clone(), content).is_some() {
            debug!(%path, "archive entry overwritten");
        }
    }

    pub fn insert_entry(&self, entry: ArchiveEntry) {
        self.insert(entry.path, entry.content);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Entry paths in archive order.
    pub fn paths(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }

    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.entries.lock().get(path).cloned()
    }

    /// Compress every entry into a deflate zip.
    ///
    /// Consumes the builder; compression runs on the blocking pool.
    #[instrument(skip(self), fields(entries = self.len()))]
    pub async fn finalize(self) -> Result<Bytes> {
        let entries = self.entries.into_inner();
        let payload = tokio::task::spawn_blocking(move || write_zip(&entries))
            .await
            .map_err(|e| Error::Archive(format!("Compression task failed: {}", e)))??;
        debug!(size = payload.len(), "archive finalized");
        Ok(payload)
    }
}

fn write_zip(entries: &BTreeMap<String, Bytes>) -> Result<Bytes> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = ZipWriter::new(&mut cursor);
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(0o644);

        for (path, content) in entries {
            writer.start_file(path.as_str(), options)?;
            writer.write_all(content)?;
        }

        writer.finish()?;
    }
    Ok(Bytes::from(cursor.into_inner()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn read_back(payload: &[u8]) -> BTreeMap<String, String> {
        let mut archive = ZipArchive::new(Cursor::new(payload)).unwrap();
        let mut files = BTreeMap::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            files.insert(entry.name().to_string(), content);
        }
        files
    }

    #[test]
    fn test_insert_overwrites_by_path() {
        let builder = ArchiveBuilder::new();
        builder.insert("a/tags.json", "[]");
        builder.insert("a/tags.json", "[{\"id\":\"1\"}]");

        assert_eq!(builder.len(), 1);
        assert_eq!(
            builder.get("a/tags.json").unwrap(),
            Bytes::from_static(b"[{\"id\":\"1\"}]")
        );
    }

    #[test]
    fn test_paths_are_sorted() {
        let builder = ArchiveBuilder::new();
        builder.insert("b/notes/2.md", "");
        builder.insert("a/tags.json", "[]");
        builder.insert_entry(ArchiveEntry::new("b/notes/1.md", "x"));

        assert_eq!(builder.paths(), vec!["a/tags.json", "b/notes/1.md", "b/notes/2.md"]);
    }

    #[tokio::test]
    async fn test_finalize_produces_zip() {
        let builder = ArchiveBuilder::new();
        builder.insert("laverna-backups/default/notes/1.md", "hello");
        builder.insert("laverna-backups/default/tags.json", "[]");
        builder.insert("laverna-backups/default/files/1.json", vec![0x7b_u8, 0x7d]);

        let payload = builder.finalize().await.unwrap();
        let files = read_back(&payload);

        assert_eq!(files.len(), 3);
        assert_eq!(files["laverna-backups/default/notes/1.md"], "hello");
        assert_eq!(files["laverna-backups/default/files/1.json"], "{}");
    }

    #[tokio::test]
    async fn test_finalize_is_deterministic() {
        let build = || {
            let builder = ArchiveBuilder::new();
            builder.insert("p/notes/2.md", "two");
            builder.insert("p/notes/1.md", "one");
            builder
        };

        let first = build().finalize().await.unwrap();
        let second = build().finalize().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_finalize_empty_builder() {
        let payload = ArchiveBuilder::new().finalize().await.unwrap();
        assert!(read_back(&payload).is_empty());
    }
}
