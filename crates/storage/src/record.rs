//! Repair Record Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel stored when the client supplied no location.
pub const UNSPECIFIED_LOCATION: &str = "unspecified";

/// A persisted repair record.
///
/// Immutable once created; the only lifecycle transition after creation is
/// deletion. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RepairRecord {
    /// Unique identifier, never reused after deletion
    pub id: i64,
    /// Non-empty free-text description of the repair
    pub description: String,
    /// Raw location string, possibly "latitude, longitude", or the
    /// [`UNSPECIFIED_LOCATION`] sentinel
    pub location: String,
    /// Generated asset filename of the "before" photo
    pub photo_before: String,
    /// Generated asset filename of the "after" photo
    pub photo_after: String,
    /// Server-clock creation time
    pub created_at: DateTime<Utc>,
}

/// Field values for a record about to be persisted.
///
/// Both photo references must already be durably written to the asset store
/// before a draft is handed to [`crate::RecordStore::insert`].
#[derive(Debug, Clone)]
pub struct RecordDraft {
    pub description: String,
    pub location: String,
    pub photo_before: String,
    pub photo_after: String,
}

impl RecordDraft {
    /// Materialize the draft with store-assigned id and timestamp.
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> RepairRecord {
        RepairRecord {
            id,
            description: self.description,
            location: self.location,
            photo_before: self.photo_before,
            photo_after: self.photo_after,
            created_at,
        }
    }
}
