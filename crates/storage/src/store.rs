//! Record Store Trait

use crate::{RecordDraft, RepairRecord, StorageError};
use async_trait::async_trait;

/// Abstract interface for repair record persistence.
///
/// Implementations must assign `id` and `created_at` at insert time and
/// guarantee that an id is never reused once its record has been deleted.
/// `list` makes no ordering promise; callers sort for presentation.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a new record, assigning id and creation time
    async fn insert(&self, draft: RecordDraft) -> Result<RepairRecord, StorageError>;

    /// All live records, in no particular order
    async fn list(&self) -> Result<Vec<RepairRecord>, StorageError>;

    /// Look up a single record by id
    async fn get(&self, id: i64) -> Result<Option<RepairRecord>, StorageError>;

    /// Remove a record. Returns `false` when no record with `id` existed,
    /// which callers treat as not-found (including a lost delete race).
    async fn delete(&self, id: i64) -> Result<bool, StorageError>;
}
