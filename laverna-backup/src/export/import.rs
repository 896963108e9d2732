//! Reads a backup archive back into profile collections.
//!
//! The mirror of the export layout: `notes/{id}.json` and `notes/{id}.md`
//! are merged back into one record, `files/{id}.json` become file records,
//! and `{kind}.json` arrays become aggregate collections. Notes and files
//! come back ordered by id.

use bytes::Bytes;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use tracing::{debug, instrument, warn};
use zip::ZipArchive;

use crate::error::{Error, Result};
use crate::model::{Collection, EntityKind, ProfileData, Record};

#[derive(Default)]
struct ProfileParts {
    note_attrs: BTreeMap<String, Map<String, Value>>,
    note_bodies: BTreeMap<String, String>,
    files: BTreeMap<String, Record>,
    aggregates: BTreeMap<EntityKind, Collection>,
}

/// Parse an archive produced by the exporter.
pub async fn read_archive(payload: Bytes, archive_root: &str) -> Result<ProfileData> {
    let root = archive_root.to_string();
    tokio::task::spawn_blocking(move || parse_archive(&payload, &root))
        .await
        .map_err(|e| Error::Import(format!("Archive read task failed: {}", e)))?
}

/// Names of every file entry in the archive, in stored order.
pub fn list_entries(payload: &[u8]) -> Result<Vec<String>> {
    let mut archive = ZipArchive::new(Cursor::new(payload))?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        let entry = archive.by_index(i)?;
        if !entry.is_dir() {
            names.push(entry.name().to_string());
        }
    }
    Ok(names)
}

#[instrument(skip(payload), fields(size = payload.len()))]
fn parse_archive(payload: &[u8], archive_root: &str) -> Result<ProfileData> {
    let mut archive = ZipArchive::new(Cursor::new(payload))?;
    let prefix = format!("{}/", archive_root);
    let mut parts: BTreeMap<String, ProfileParts> = BTreeMap::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let Some(relative) = name.strip_prefix(&prefix) else {
            warn!(%name, "entry outside archive root skipped");
            continue;
        };

        let mut content = String::new();
        entry
            .read_to_string(&mut content)
            .map_err(|e| Error::Import(format!("Cannot read '{}': {}", name, e)))?;

        let segments: Vec<&str> = relative.split('/').collect();
        match segments.as_slice() {
            [profile, "notes", file] => {
                let profile = parts.entry(profile.to_string()).or_default();
                if let Some(id) = file.strip_suffix(".md") {
                    profile.note_bodies.insert(id.to_string(), content);
                } else if let Some(id) = file.strip_suffix(".json") {
                    let record = parse_record(&name, &content)?;
                    profile.note_attrs.insert(id.to_string(), record.into_attributes());
                } else {
                    warn!(%name, "unrecognized note entry skipped");
                }
            }
            [profile, "files", file] => match file.strip_suffix(".json") {
                Some(id) => {
                    let record = parse_record(&name, &content)?;
                    parts
                        .entry(profile.to_string())
                        .or_default()
                        .files
                        .insert(id.to_string(), record);
                }
                None => warn!(%name, "unrecognized file entry skipped"),
            },
            [profile, file] => {
                let kind = file
                    .strip_suffix(".json")
                    .and_then(|stem| stem.parse::<EntityKind>().ok())
                    .filter(|kind| !kind.is_per_record());
                let Some(kind) = kind else {
                    warn!(%name, "unrecognized entry skipped");
                    continue;
                };
                let value: Value = serde_json::from_str(&content)
                    .map_err(|e| Error::Import(format!("Invalid JSON in '{}': {}", name, e)))?;
                let collection = Collection::from_json(kind, value)
                    .map_err(|e| Error::Import(format!("'{}': {}", name, e)))?;
                parts
                    .entry(profile.to_string())
                    .or_default()
                    .aggregates
                    .insert(kind, collection);
            }
            _ => warn!(%name, "unrecognized entry skipped"),
        }
    }

    let data: ProfileData = parts
        .into_iter()
        .map(|(profile, parts)| (profile, assemble(parts)))
        .collect();
    debug!(profiles = data.len(), "archive parsed");
    Ok(data)
}

fn parse_record(name: &str, content: &str) -> Result<Record> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| Error::Import(format!("Invalid JSON in '{}': {}", name, e)))?;
    Record::from_value(value).map_err(|e| Error::Import(format!("'{}': {}", name, e)))
}

/// Rebuild the collections of one profile in fetch order.
fn assemble(mut parts: ProfileParts) -> Vec<Collection> {
    let mut notes: BTreeMap<String, Record> = BTreeMap::new();
    for (id, attrs) in std::mem::take(&mut parts.note_attrs) {
        let mut record = Record::new(attrs);
        if let Some(body) = parts.note_bodies.remove(&id) {
            record.insert("content", Value::String(body));
        }
        notes.insert(id, record);
    }
    // A body without attributes still carries the note text.
    for (id, body) in std::mem::take(&mut parts.note_bodies) {
        let mut record = Record::default();
        record.insert("id", Value::String(id.clone()));
        record.insert("content", Value::String(body));
        notes.insert(id, record);
    }

    let mut collections = Vec::new();
    for kind in EntityKind::ALL {
        let collection = match kind {
            EntityKind::Notes if !notes.is_empty() => Some(Collection::new(
                kind,
                std::mem::take(&mut notes).into_values().collect(),
            )),
            EntityKind::Files if !parts.files.is_empty() => Some(Collection::new(
                kind,
                std::mem::take(&mut parts.files).into_values().collect(),
            )),
            _ => parts.aggregates.remove(&kind),
        };
        collections.extend(collection);
    }
    collections
}
