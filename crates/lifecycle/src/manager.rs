//! Lifecycle Orchestration

use crate::LifecycleError;
use assets::{AssetError, AssetStore};
use chrono::Utc;
use std::sync::Arc;
use storage::{RecordDraft, RecordStore, RepairRecord, UNSPECIFIED_LOCATION};
use tracing::{debug, info, warn};

/// One uploaded image: payload plus the metadata the client declared for it.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Input for creating a repair record.
#[derive(Debug, Clone)]
pub struct NewRepair {
    pub description: String,
    pub location: Option<String>,
    pub before: ImageUpload,
    pub after: ImageUpload,
}

/// A rendered CSV report plus its download filename.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub content: String,
}

/// Coordinates the record store and the asset store.
///
/// Both collaborators are injected at construction; the manager owns no
/// ambient state.
pub struct RecordLifecycle {
    store: Arc<dyn RecordStore>,
    assets: AssetStore,
}

impl RecordLifecycle {
    pub fn new(store: Arc<dyn RecordStore>, assets: AssetStore) -> Self {
        Self { store, assets }
    }

    /// Create a repair record from an upload.
    ///
    /// Order of operations: validate everything, write both photos, insert
    /// the record. Any failure after a photo was written rolls the written
    /// photos back, so every failure path has zero net side effects.
    pub async fn create(&self, new: NewRepair) -> Result<RepairRecord, LifecycleError> {
        // Allow-list both uploads before the first byte hits disk; rejecting
        // here is cheap and leaves nothing to clean up.
        AssetStore::validate(&new.before.filename, &new.before.content_type)?;
        AssetStore::validate(&new.after.filename, &new.after.content_type)?;

        if new.description.trim().is_empty() {
            return Err(LifecycleError::Validation(
                "description is required".to_string(),
            ));
        }
        if new.before.bytes.is_empty() || new.after.bytes.is_empty() {
            return Err(LifecycleError::Validation(
                "both a before and an after photo are required".to_string(),
            ));
        }

        let location = new
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| UNSPECIFIED_LOCATION.to_string());

        // Completed side effects, rolled back in reverse on a later failure.
        let mut written: Vec<String> = Vec::new();

        let photo_before = match self
            .assets
            .save(
                "before",
                &new.before.filename,
                &new.before.content_type,
                &new.before.bytes,
            )
            .await
        {
            Ok(name) => name,
            Err(e) => {
                self.roll_back(&written).await;
                return Err(e.into());
            }
        };
        written.push(photo_before.clone());

        let photo_after = match self
            .assets
            .save(
                "after",
                &new.after.filename,
                &new.after.content_type,
                &new.after.bytes,
            )
            .await
        {
            Ok(name) => name,
            Err(e) => {
                self.roll_back(&written).await;
                return Err(e.into());
            }
        };
        written.push(photo_after.clone());

        let draft = RecordDraft {
            description: new.description,
            location,
            photo_before,
            photo_after,
        };
        match self.store.insert(draft).await {
            Ok(record) => {
                info!(id = record.id, "created repair record");
                Ok(record)
            }
            Err(e) => {
                self.roll_back(&written).await;
                Err(e.into())
            }
        }
    }

    /// All live records, most recent first.
    pub async fn list(&self) -> Result<Vec<RepairRecord>, LifecycleError> {
        let mut records = self.store.list().await?;
        // Presentation order, recomputed on every call rather than trusted
        // from storage order. Ties fall back to id.
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Delete a record and its two photos.
    ///
    /// The store row goes first; asset removal is best-effort cleanup. A
    /// crash between the steps leaves orphan files, never a live record
    /// whose photos are gone.
    pub async fn delete(&self, id: i64) -> Result<(), LifecycleError> {
        let record = self
            .store
            .get(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))?;

        if !self.store.delete(id).await? {
            // Zero entries removed: a concurrent delete got there first.
            return Err(LifecycleError::NotFound(id));
        }

        for name in [&record.photo_before, &record.photo_after] {
            match self.assets.remove(name).await {
                Ok(()) => {}
                Err(AssetError::NotFound(_)) => {
                    debug!(asset = %name, "asset already gone at delete time");
                }
                Err(e) => {
                    warn!(asset = %name, error = %e, "asset cleanup failed during delete");
                }
            }
        }

        info!(id, "deleted repair record");
        Ok(())
    }

    /// Render the current records as a CSV download.
    pub async fn export_csv(&self) -> Result<CsvExport, LifecycleError> {
        let records = self.list().await?;
        let content = export::to_csv(&records)?;
        Ok(CsvExport {
            filename: export::export_filename(Utc::now()),
            content,
        })
    }

    // Compensating cleanup. Each step's failure is logged and swallowed
    // independently so one bad removal does not stop the next, and the
    // caller's primary error is never masked.
    async fn roll_back(&self, written: &[String]) {
        for name in written.iter().rev() {
            if let Err(e) = self.assets.remove(name).await {
                warn!(asset = %name, error = %e, "rollback of written asset failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;
    use storage::{MemoryStore, StorageError};
    use tempfile::{tempdir, TempDir};

    fn upload(filename: &str, content_type: &str, bytes: &[u8]) -> ImageUpload {
        ImageUpload {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes: bytes.to_vec(),
        }
    }

    fn repair(description: &str, location: Option<&str>) -> NewRepair {
        NewRepair {
            description: description.to_string(),
            location: location.map(str::to_string),
            before: upload("before.png", "image/png", b"before bytes"),
            after: upload("after.png", "image/png", b"after bytes"),
        }
    }

    fn manager(dir: &TempDir) -> RecordLifecycle {
        RecordLifecycle::new(
            Arc::new(MemoryStore::new()),
            AssetStore::open(dir.path()).unwrap(),
        )
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    /// Store whose inserts always fail, for exercising rollback.
    struct FailingStore(MemoryStore);

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn insert(&self, _draft: RecordDraft) -> Result<RepairRecord, StorageError> {
            Err(StorageError::Corrupt("injected insert failure".to_string()))
        }
        async fn list(&self) -> Result<Vec<RepairRecord>, StorageError> {
            self.0.list().await
        }
        async fn get(&self, id: i64) -> Result<Option<RepairRecord>, StorageError> {
            self.0.get(id).await
        }
        async fn delete(&self, id: i64) -> Result<bool, StorageError> {
            self.0.delete(id).await
        }
    }

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        lifecycle.create(repair("older", None)).await.unwrap();
        let newest = lifecycle
            .create(repair("Leaky pipe", Some("40.7, -74.0")))
            .await
            .unwrap();

        let records = lifecycle.list().await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, newest.id);
        assert_eq!(records[0].description, "Leaky pipe");
        assert_eq!(records[0].location, "40.7, -74.0");

        // Both photos durably present.
        assert_eq!(file_count(dir.path()), 4);
    }

    #[tokio::test]
    async fn test_create_defaults_missing_location() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        let none = lifecycle.create(repair("no location", None)).await.unwrap();
        let blank = lifecycle
            .create(repair("blank location", Some("   ")))
            .await
            .unwrap();

        assert_eq!(none.location, UNSPECIFIED_LOCATION);
        assert_eq!(blank.location, UNSPECIFIED_LOCATION);
    }

    #[tokio::test]
    async fn test_create_rejects_disallowed_image_before_writing() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        let mut new = repair("bad format", None);
        new.after = upload("clip.gif", "image/gif", b"gif bytes");

        let err = lifecycle.create(new).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(file_count(dir.path()), 0);
        assert!(lifecycle.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_missing_description_leaves_no_orphans() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        let err = lifecycle.create(repair("", Some(""))).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(file_count(dir.path()), 0);
        assert!(lifecycle.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_empty_payload_rejected() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        let mut new = repair("empty file", None);
        new.before = upload("before.png", "image/png", b"");

        let err = lifecycle.create(new).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_insert_failure_rolls_back_written_assets() {
        let dir = tempdir().unwrap();
        let lifecycle = RecordLifecycle::new(
            Arc::new(FailingStore(MemoryStore::new())),
            AssetStore::open(dir.path()).unwrap(),
        );

        let err = lifecycle.create(repair("doomed", None)).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Store(_)));
        // Both photos were written and then rolled back.
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_delete_removes_record_and_both_photos() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        let record = lifecycle.create(repair("to delete", None)).await.unwrap();
        assert_eq!(file_count(dir.path()), 2);

        lifecycle.delete(record.id).await.unwrap();
        assert!(lifecycle.list().await.unwrap().is_empty());
        assert_eq!(file_count(dir.path()), 0);

        // Re-deleting the same id is a not-found, not a crash.
        assert!(matches!(
            lifecycle.delete(record.id).await,
            Err(LifecycleError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_tolerates_already_missing_asset() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        let record = lifecycle.create(repair("half gone", None)).await.unwrap();
        std::fs::remove_file(dir.path().join(&record.photo_before)).unwrap();

        lifecycle.delete(record.id).await.unwrap();
        assert!(lifecycle.list().await.unwrap().is_empty());
        assert_eq!(file_count(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_id_changes_nothing() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);
        lifecycle.create(repair("keeper", None)).await.unwrap();

        assert!(matches!(
            lifecycle.delete(999_999).await,
            Err(LifecycleError::NotFound(999_999))
        ));
        assert_eq!(lifecycle.list().await.unwrap().len(), 1);
        assert_eq!(file_count(dir.path()), 2);
    }

    #[tokio::test]
    async fn test_export_csv_has_header_and_one_row_per_record() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);
        lifecycle.create(repair("first", None)).await.unwrap();
        lifecycle.create(repair("second", None)).await.unwrap();

        let export = lifecycle.export_csv().await.unwrap();
        assert!(export.filename.starts_with("repairs-"));
        assert!(export.filename.ends_with(".csv"));
        assert_eq!(export.content.matches("\r\n").count(), 3);
        assert!(export
            .content
            .starts_with("Date/Time,Description,Location,Before Photo,After Photo,ID"));
    }

    #[tokio::test]
    async fn test_export_csv_refuses_empty_store() {
        let dir = tempdir().unwrap();
        let lifecycle = manager(&dir);

        assert!(matches!(
            lifecycle.export_csv().await,
            Err(LifecycleError::Export(export::ExportError::EmptyExport))
        ));
    }
}
