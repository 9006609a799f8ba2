//! Storage Layer
//!
//! Persists repair records behind the [`RecordStore`] trait. Two production
//! backends are provided: a single JSON document file rewritten wholesale on
//! every mutation ([`JsonFileStore`]) and a SQLite table ([`SqliteStore`]).
//! [`MemoryStore`] backs tests that need no filesystem.

mod json;
mod memory;
mod record;
mod sqlite;
mod store;

pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{RecordDraft, RepairRecord, UNSPECIFIED_LOCATION};
pub use sqlite::SqliteStore;
pub use store::RecordStore;

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Store file could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Store file exists but does not parse as a record array
    #[error("store file is corrupt: {0}")]
    Corrupt(String),

    /// SQLite-level failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
