//! Per-collection export into an archive builder.

use tracing::debug;

use super::archive::ArchiveBuilder;
use super::serializer::EntrySerializer;
use crate::error::Result;
use crate::model::Collection;

/// Writes collections into one builder.
#[derive(Debug, Clone, Copy)]
pub struct CollectionExporter<'a> {
    builder: &'a ArchiveBuilder,
    serializer: EntrySerializer,
}

impl<'a> CollectionExporter<'a> {
    pub fn new(builder: &'a ArchiveBuilder, serializer: EntrySerializer) -> Self {
        Self {
            builder,
            serializer,
        }
    }

    /// Export one collection under `base`. Returns the number of entries written.
    ///
    /// Notes and files are written record by record from the full record set;
    /// every other kind becomes a single aggregate file, even when empty. Export
    /// shapers only apply to aggregate files.
    pub fn export_collection(&self, base: &str, collection: &Collection) -> Result<usize> {
        let kind = collection.kind();

        if !kind.is_per_record() {
            let entry = self.serializer.serialize_aggregate(base, collection)?;
            self.builder.insert_entry(entry);
            debug!(%kind, base, records = collection.len(), "aggregate exported");
            return Ok(1);
        }

        let mut written = 0;
        for record in collection.records() {
            for entry in self.serializer.serialize_record(base, kind, record)? {
                self.builder.insert_entry(entry);
                written += 1;
            }
        }
        debug!(%kind, base, records = collection.len(), entries = written, "records exported");
        Ok(written)
    }

    /// Export every collection in `collections` under `base`.
    pub fn export_collections(&self, base: &str, collections: &[Collection]) -> Result<usize> {
        let mut written = 0;
        for collection in collections {
            written += self.export_collection(base, collection)?;
        }
        Ok(written)
    }
}

/// Base path of a profile inside the archive.
pub fn profile_base(archive_root: &str, profile_id: &str) -> String {
    format!("{}/{}", archive_root, profile_id)
}
