//! SQLite Store
//!
//! One `repairs` table; `AUTOINCREMENT` guarantees ids are never reused even
//! after the highest row is deleted.

use crate::store::RecordStore;
use crate::{RecordDraft, RepairRecord, StorageError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS repairs (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    description  TEXT NOT NULL,
    location     TEXT NOT NULL DEFAULT 'unspecified',
    photo_before TEXT NOT NULL,
    photo_after  TEXT NOT NULL,
    created_at   TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
)
"#;

/// SQLite-backed record store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database at `url`, creating the schema if needed.
    ///
    /// A single connection matches the single-writer access pattern and keeps
    /// `sqlite::memory:` databases shared across all operations.
    pub async fn open(url: &str) -> Result<Self, StorageError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await?;
        sqlx::query(SCHEMA).execute(&pool).await?;
        info!(url, "opened sqlite record store");
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn insert(&self, draft: RecordDraft) -> Result<RepairRecord, StorageError> {
        let created_at = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO repairs (description, location, photo_before, photo_after, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5) RETURNING id",
        )
        .bind(&draft.description)
        .bind(&draft.location)
        .bind(&draft.photo_before)
        .bind(&draft.photo_after)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;

        debug!(id, "inserted repair record");
        Ok(draft.into_record(id, created_at))
    }

    async fn list(&self) -> Result<Vec<RepairRecord>, StorageError> {
        let records = sqlx::query_as::<_, RepairRecord>(
            "SELECT id, description, location, photo_before, photo_after, created_at
             FROM repairs",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<Option<RepairRecord>, StorageError> {
        let record = sqlx::query_as::<_, RepairRecord>(
            "SELECT id, description, location, photo_before, photo_after, created_at
             FROM repairs WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM repairs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() > 0 {
            debug!(id, "deleted repair record");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
