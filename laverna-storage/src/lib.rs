//! Save targets for Laverna backups.
//!
//! The export engine never writes files itself. Once an archive (or a key
//! file) is finished it is handed to a [`SaveTarget`], which decides where the
//! payload ends up.
//!
//! # Quick Start
//!
//! ```no_run
//! use laverna_storage::{Bytes, LocalStorage, SaveTarget};
//!
//! # async fn example() -> laverna_storage::Result<()> {
//! let target = LocalStorage::new("./backups");
//! target.save(Bytes::from("zip payload"), "laverna-backup.zip").await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod local;
mod memory;
mod traits;

pub use error::{Result, StorageError};
pub use local::LocalStorage;
pub use memory::{MemoryStorage, SaveRecord};
pub use traits::{validate_filename, SaveTarget, SavedObject};

// Re-export bytes for convenience
pub use bytes::Bytes;
