//! JSON Document File Store
//!
//! Stores all records as a single JSON array, rewritten wholesale on every
//! mutation. Matches the layout `db.json` deployments already use.

use crate::store::RecordStore;
use crate::{RecordDraft, RepairRecord, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// File-backed record store.
///
/// Every operation takes an exclusive lock spanning the full read,
/// mutate-in-memory, write sequence; interleaved writers would otherwise
/// lose updates when rewriting the array.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    /// Create a store backed by `path`. The file is created lazily on the
    /// first insert; a missing file reads as an empty store.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<RepairRecord>, StorageError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| StorageError::Corrupt(e.to_string()))
    }

    async fn write_all(&self, records: &[RepairRecord]) -> Result<(), StorageError> {
        let json = serde_json::to_vec_pretty(records)
            .map_err(|e| StorageError::Corrupt(e.to_string()))?;
        // Write a sibling temp file first so a crash mid-write cannot
        // truncate the live store.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Wall-clock milliseconds, bumped past the current maximum id so that
    /// same-millisecond inserts (or a clock step backwards) never collide.
    fn next_id(records: &[RepairRecord], now_ms: i64) -> i64 {
        match records.iter().map(|r| r.id).max() {
            Some(max) if now_ms <= max => max + 1,
            _ => now_ms,
        }
    }
}

#[async_trait]
impl RecordStore for JsonFileStore {
    async fn insert(&self, draft: RecordDraft) -> Result<RepairRecord, StorageError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;

        let created_at = Utc::now();
        let id = Self::next_id(&records, created_at.timestamp_millis());
        let record = draft.into_record(id, created_at);

        records.push(record.clone());
        self.write_all(&records).await?;
        debug!(id, "inserted repair record");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<RepairRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn get(&self, id: i64) -> Result<Option<RepairRecord>, StorageError> {
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|r| r.id == id))
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;

        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            return Ok(false);
        }

        self.write_all(&records).await?;
        debug!(id, "deleted repair record");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn draft(description: &str) -> RecordDraft {
        RecordDraft {
            description: description.to_string(),
            location: "unspecified".to_string(),
            photo_before: "before-1-000000001.png".to_string(),
            photo_after: "after-1-000000002.png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));

        let a = store.insert(draft("first")).await.unwrap();
        let b = store.insert(draft("second")).await.unwrap();

        assert!(b.id > a.id);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_insert_persists_across_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");

        let record = {
            let store = JsonFileStore::new(&path);
            store.insert(draft("leaky pipe")).await.unwrap()
        };

        let reopened = JsonFileStore::new(&path);
        let got = reopened.get(record.id).await.unwrap().unwrap();
        assert_eq!(got, record);
    }

    #[tokio::test]
    async fn test_delete_reports_missing() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("db.json"));

        let record = store.insert(draft("to remove")).await.unwrap();
        assert!(store.delete(record.id).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());

        // Second delete races against nothing; zero entries removed.
        assert!(!store.delete(record.id).await.unwrap());
        assert!(!store.delete(999_999).await.unwrap());
    }

    #[tokio::test]
    async fn test_corrupt_file_surfaces_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "definitely not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.list().await,
            Err(StorageError::Corrupt(_))
        ));
    }

    #[test]
    fn test_next_id_bumps_past_existing_max() {
        let mut record = RecordDraft {
            description: "x".into(),
            location: "unspecified".into(),
            photo_before: "b".into(),
            photo_after: "a".into(),
        }
        .into_record(100, Utc::now());

        assert_eq!(JsonFileStore::next_id(&[], 50), 50);
        assert_eq!(JsonFileStore::next_id(std::slice::from_ref(&record), 50), 101);
        record.id = 10;
        assert_eq!(JsonFileStore::next_id(std::slice::from_ref(&record), 50), 50);
    }
}
