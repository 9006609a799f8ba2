//! Asset Store
//!
//! Filesystem area holding uploaded repair photos, addressed by generated
//! collision-free filenames. Only jpeg, jpg and png uploads are accepted;
//! anything else is rejected before a byte touches disk.

mod store;

pub use store::AssetStore;

use thiserror::Error;

/// Asset store errors
#[derive(Debug, Error)]
pub enum AssetError {
    /// Upload failed the extension/MIME allow-list
    #[error("only jpeg, jpg and png images are allowed (got {0:?})")]
    UnsupportedFormat(String),

    /// Name would escape the asset root
    #[error("invalid asset name {0:?}")]
    InvalidName(String),

    /// No file under that generated name
    #[error("asset {0:?} not found")]
    NotFound(String),

    /// Underlying filesystem failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
