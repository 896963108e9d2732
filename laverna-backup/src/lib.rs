//! Backup export engine for Laverna notes.
//!
//! Converts profiles (notebooks, notes, tags, files, configs, users) into a
//! portable zip archive, or exports the private key on its own.
//!
//! ```no_run
//! use laverna_backup::export::{ExportOptions, Exporter};
//! use laverna_backup::source::DirSource;
//! use laverna_storage::LocalStorage;
//! use std::sync::Arc;
//!
//! # async fn example() -> laverna_backup::Result<()> {
//! let source = Arc::new(DirSource::new("./data", "default"));
//! let target = Arc::new(LocalStorage::new("./backups"));
//! let report = Exporter::new(source, target).run(ExportOptions::full()).await?;
//! println!("{} entries", report.entries);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod source;

pub use config::BackupConfig;
pub use error::{Error, Result};
pub use model::{Collection, EntityKind, ExportShape, ProfileData, Record, StripFields};
