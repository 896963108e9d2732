//! Backup archive export and import.
//!
//! An export walks profiles, serializes every collection into a path-keyed
//! entry tree, compresses that tree into one zip and hands it to a save
//! target. `import` reads such an archive back.

pub mod archive;
pub mod collection;
pub mod import;
pub mod orchestrator;
pub mod profile;
pub mod serializer;
pub mod types;

pub use archive::{ArchiveBuilder, ArchiveEntry};
pub use collection::{profile_base, CollectionExporter};
pub use import::{list_entries, read_archive};
pub use orchestrator::Exporter;
pub use profile::{export_profile, fetch_profile};
pub use serializer::EntrySerializer;
pub use types::{ExportMode, ExportOptions, ExportReport, ExportSettings};
