//! In-Memory Store
//!
//! No persistence; used by tests that exercise lifecycle logic without a
//! filesystem or database.

use crate::store::RecordStore;
use crate::{RecordDraft, RepairRecord, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::Mutex;

/// In-memory record store with monotonically increasing ids.
pub struct MemoryStore {
    records: Mutex<Vec<RepairRecord>>,
    next_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, draft: RecordDraft) -> Result<RepairRecord, StorageError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = draft.into_record(id, Utc::now());
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<RepairRecord>, StorageError> {
        Ok(self.records.lock().await.clone())
    }

    async fn get(&self, id: i64) -> Result<Option<RepairRecord>, StorageError> {
        Ok(self
            .records
            .lock()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}
