//! Record Lifecycle Manager
//!
//! Orchestrates create/list/delete/export across the record store and the
//! asset store, implementing the consistency rules: a record is never
//! persisted without both photos already on disk, and a partially completed
//! create is rolled back so failures leave zero net side effects.

mod manager;

pub use manager::{CsvExport, ImageUpload, NewRepair, RecordLifecycle};

use assets::AssetError;
use export::ExportError;
use storage::StorageError;
use thiserror::Error;

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// Bad or missing client input
    #[error("{0}")]
    Validation(String),

    /// Unknown record id (or a lost delete race)
    #[error("no repair record with id {0}")]
    NotFound(i64),

    /// Record store unreachable or corrupt
    #[error("record store failure: {0}")]
    Store(#[from] StorageError),

    /// Asset write/delete failure during a main operation
    #[error("asset store failure: {0}")]
    Asset(AssetError),

    /// Export business rule (empty report)
    #[error(transparent)]
    Export(#[from] ExportError),
}

// Allow-list rejections and malformed names are client-fixable, so they
// surface as validation failures rather than server-side asset errors.
impl From<AssetError> for LifecycleError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::UnsupportedFormat(_) | AssetError::InvalidName(_) => {
                Self::Validation(err.to_string())
            }
            other => Self::Asset(other),
        }
    }
}
