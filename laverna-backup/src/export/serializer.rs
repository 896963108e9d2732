//! Turns records and aggregate collections into archive entries.
//!
//! Layout under a profile base path:
//! - `notes/{id}.md` text body, `notes/{id}.json` every other note attribute
//! - `files/{id}.json` every file attribute, payload included
//! - `{kind}.json` one array per aggregate kind

use serde::Serialize;
use serde_json::Value;

use super::archive::ArchiveEntry;
use crate::error::{Error, Result};
use crate::model::{Collection, EntityKind, Record};

/// Stateless entry serializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntrySerializer {
    pretty: bool,
}

impl EntrySerializer {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    fn to_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(json)
    }

    /// Serialize one record of a per-record kind.
    pub fn serialize_record(
        &self,
        base: &str,
        kind: EntityKind,
        record: &Record,
    ) -> Result<Vec<ArchiveEntry>> {
        match kind {
            EntityKind::Notes => self.serialize_note(base, record),
            EntityKind::Files => Ok(vec![self.serialize_file(base, record)?]),
            other => Err(Error::Serialize(format!(
                "{} records are exported as one aggregate file",
                other
            ))),
        }
    }

    /// Note body goes to `.md`; the remaining attributes go to `.json`.
    ///
    /// Only text content is split out. A note without it keeps its attributes
    /// as they are, `content` included when present, and gets no `.md` entry.
    pub fn serialize_note(&self, base: &str, record: &Record) -> Result<Vec<ArchiveEntry>> {
        let id = entry_id(EntityKind::Notes, record)?;
        let json_path = format!("{}/notes/{}.json", base, id);

        match record.content() {
            Some(content) => Ok(vec![
                ArchiveEntry::new(format!("{}/notes/{}.md", base, id), content.to_string()),
                ArchiveEntry::new(json_path, self.to_json(&record.without("content"))?),
            ]),
            None => Ok(vec![ArchiveEntry::new(
                json_path,
                self.to_json(record.attributes())?,
            )]),
        }
    }

    pub fn serialize_file(&self, base: &str, record: &Record) -> Result<ArchiveEntry> {
        let id = entry_id(EntityKind::Files, record)?;
        let attributes = self.to_json(record.attributes())?;
        Ok(ArchiveEntry::new(format!("{}/files/{}.json", base, id), attributes))
    }

    /// Whole collection as a single `{kind}.json` array.
    ///
    /// Uses the collection's export shaper when it has one.
    pub fn serialize_aggregate(&self, base: &str, collection: &Collection) -> Result<ArchiveEntry> {
        let data: Vec<Value> = collection.export_data();
        let json = self.to_json(&data)?;
        Ok(ArchiveEntry::new(
            format!("{}/{}.json", base, collection.kind().name()),
            json,
        ))
    }
}

/// Record id checked for use as a file name.
fn entry_id(kind: EntityKind, record: &Record) -> Result<String> {
    let id = record
        .id()
        .ok_or_else(|| Error::Serialize(format!("{} record without an id", kind)))?;
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(Error::Serialize(format!(
            "{} id '{}' cannot be used as a file name",
            kind, id
        )));
    }
    Ok(id)
}
