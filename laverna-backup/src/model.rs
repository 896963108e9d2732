//! Domain records handed to the export engine.
//!
//! Records are schemaless JSON objects. The engine only relies on `id` for
//! every kind, `content` for notes, and treats everything else as opaque
//! attributes that must survive the trip into the archive untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Mapping of profile id to the collections exported for it.
pub type ProfileData = BTreeMap<String, Vec<Collection>>;

/// The fixed set of stored entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Notebooks,
    Notes,
    Tags,
    Files,
    Configs,
    Users,
}

impl EntityKind {
    /// Every kind, in the order a profile is fetched.
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Notebooks,
        EntityKind::Notes,
        EntityKind::Tags,
        EntityKind::Files,
        EntityKind::Configs,
        EntityKind::Users,
    ];

    /// Name used for directories and aggregate file names.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Notebooks => "notebooks",
            EntityKind::Notes => "notes",
            EntityKind::Tags => "tags",
            EntityKind::Files => "files",
            EntityKind::Configs => "configs",
            EntityKind::Users => "users",
        }
    }

    /// Notes and files get one archive entry per record; every other kind is
    /// written as a single aggregate file.
    pub fn is_per_record(&self) -> bool {
        matches!(self, EntityKind::Notes | EntityKind::Files)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown entity kind '{}'", s))
    }
}

/// A single stored entity.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }

    /// Build a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::Serialize(format!(
                "Record must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Record id as text. Numeric ids are rendered in decimal.
    pub fn id(&self) -> Option<String> {
        match self.0.get("id")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Long-form note body.
    pub fn content(&self) -> Option<&str> {
        self.0.get("content").and_then(Value::as_str)
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_attributes(self) -> Map<String, Value> {
        self.0
    }

    /// Copy of the attributes with `key` removed.
    pub fn without(&self, key: &str) -> Map<String, Value> {
        let mut attrs = self.0.clone();
        attrs.remove(key);
        attrs
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }
}

impl From<Map<String, Value>> for Record {
    fn from(attributes: Map<String, Value>) -> Self {
        Self(attributes)
    }
}

/// Collection-level export shaping.
///
/// A collection that carries one of these is serialized through it instead
/// of the plain attribute dump, e.g. to strip fields that only make sense
/// inside the running app.
pub trait ExportShape: Send + Sync {
    fn export_data(&self, records: &[Record]) -> Vec<Value>;
}

/// Shaper that drops the named attributes from every record.
#[derive(Debug, Clone)]
pub struct StripFields {
    fields: Vec<String>,
}

impl StripFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExportShape for StripFields {
    fn export_data(&self, records: &[Record]) -> Vec<Value> {
        records
            .iter()
            .map(|record| {
                let mut attrs = record.attributes().clone();
                for field in &self.fields {
                    attrs.remove(field);
                }
                Value::Object(attrs)
            })
            .collect()
    }
}

/// Every record of one kind for one profile.
///
/// `records` is always the full set, trashed records included.
#[derive(Clone)]
pub struct Collection {
    kind: EntityKind,
    records: Vec<Record>,
    shaper: Option<Arc<dyn ExportShape>>,
}

impl Collection {
    pub fn new(kind: EntityKind, records: Vec<Record>) -> Self {
        Self {
            kind,
            records,
            shaper: None,
        }
    }

    pub fn empty(kind: EntityKind) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Build a collection from a JSON array of objects.
    pub fn from_json(kind: EntityKind, value: Value) -> Result<Self> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(Error::Serialize(format!(
                    "{} must be a JSON array, got {}",
                    kind, other
                )))
            }
        };
        let records = items
            .into_iter()
            .map(Record::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(kind, records))
    }

    /// Attach an export shaper.
    pub fn with_export_shape(mut self, shaper: Arc<dyn ExportShape>) -> Self {
        self.shaper = Some(shaper);
        self
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The full record set.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_custom_export(&self) -> bool {
        self.shaper.is_some()
    }

    /// Attribute sets to write for an aggregate kind.
    pub fn export_data(&self) -> Vec<Value> {
        match &self.shaper {
            Some(shaper) => shaper.export_data(&self.records),
            None => self
                .records
                .iter()
                .map(|r| Value::Object(r.attributes().clone()))
                .collect(),
        }
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.records == other.records
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("kind", &self.kind)
            .field("records", &self.records)
            .field("custom_export", &self.has_custom_export())
            .finish()
    }
}
