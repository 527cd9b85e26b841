use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use predicta_common::{FileId, FileMetadata, FileStatus, FileSummary};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::{check_transition, FileRecord, FileStore, NewFile, StoreError, StoreResult};

const SUMMARY_COLUMNS: &str =
    "id, storage_key, original_name, content_type, byte_size, uploaded_at, status, metadata";

#[derive(Debug, FromRow)]
struct FileRow {
    id: Uuid,
    storage_key: String,
    original_name: String,
    content_type: String,
    byte_size: i64,
    uploaded_at: DateTime<Utc>,
    status: String,
    metadata: Option<Json<FileMetadata>>,
    #[sqlx(default)]
    payload: Option<Vec<u8>>,
}

impl FileRow {
    fn into_record(self) -> StoreResult<FileRecord> {
        let id = FileId::from_uuid(self.id);
        let status = self
            .status
            .parse::<FileStatus>()
            .map_err(|e| StoreError::Corrupt { id, reason: e.to_string() })?;
        let byte_size = u64::try_from(self.byte_size).map_err(|_| StoreError::Corrupt {
            id,
            reason: format!("negative byte size {}", self.byte_size),
        })?;

        Ok(FileRecord {
            summary: FileSummary {
                id,
                storage_key: self.storage_key,
                original_name: self.original_name,
                content_type: self.content_type,
                byte_size,
                uploaded_at: self.uploaded_at,
                status,
                metadata: self.metadata.map(|Json(m)| m),
            },
            payload: self.payload.map(Bytes::from),
        })
    }
}

/// PostgreSQL-backed store over the `files` table.
#[derive(Debug, Clone)]
pub struct PgFileStore {
    pool: PgPool,
}

impl PgFileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl FileStore for PgFileStore {
    #[tracing::instrument(skip(self, file), fields(storage_key = %file.storage_key))]
    async fn create(&self, file: NewFile) -> StoreResult<FileSummary> {
        let id = FileId::new();
        let byte_size = i64::try_from(file.payload.len()).map_err(|_| StoreError::Corrupt {
            id,
            reason: "payload too large to record".to_string(),
        })?;

        let row: FileRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO files
                (id, storage_key, original_name, content_type, byte_size, uploaded_at, status, payload, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {SUMMARY_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(&file.storage_key)
        .bind(&file.original_name)
        .bind(&file.content_type)
        .bind(byte_size)
        .bind(file.uploaded_at)
        .bind(FileStatus::Uploaded.as_str())
        .bind(file.payload.as_ref())
        .bind(file.metadata.map(Json))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_record()?.summary)
    }

    async fn list(&self) -> StoreResult<Vec<FileSummary>> {
        let rows: Vec<FileRow> = sqlx::query_as(&format!(
            "SELECT {SUMMARY_COLUMNS} FROM files ORDER BY uploaded_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| row.into_record().map(|r| r.summary))
            .collect()
    }

    async fn get(&self, id: FileId, include_payload: bool) -> StoreResult<FileRecord> {
        let sql = if include_payload {
            format!("SELECT {SUMMARY_COLUMNS}, payload FROM files WHERE id = $1")
        } else {
            format!("SELECT {SUMMARY_COLUMNS} FROM files WHERE id = $1")
        };

        let row: Option<FileRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or(StoreError::NotFound(id))?.into_record()
    }

    async fn delete(&self, id: FileId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM files WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn set_status(&self, id: FileId, status: FileStatus) -> StoreResult<FileStatus> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent transitions on the same file.
        let current: Option<String> =
            sqlx::query_scalar("SELECT status FROM files WHERE id = $1 FOR UPDATE")
                .bind(id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

        let previous = current
            .ok_or(StoreError::NotFound(id))?
            .parse::<FileStatus>()
            .map_err(|e| StoreError::Corrupt { id, reason: e.to_string() })?;

        check_transition(id, previous, status)?;

        sqlx::query("UPDATE files SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id.as_uuid())
            .bind(status.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(previous)
    }

    async fn health(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}
