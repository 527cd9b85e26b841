//! Durable file store
//!
//! Every accepted upload becomes one record: the raw payload plus the
//! [`FileSummary`] fields. Two backends implement [`FileStore`]:
//!
//! - [`PgFileStore`] keeps records in PostgreSQL (`files` table)
//! - [`MemoryFileStore`] keeps them in process, for tests and `memory://`
//!
//! Status writes go through [`FileStore::set_status`], which checks the
//! transition against [`FileStatus::can_transition_to`] and applies it
//! atomically. A concurrent delete makes the write fail with
//! [`StoreError::NotFound`] instead of resurrecting the record.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use predicta_common::{FileId, FileMetadata, FileStatus, FileSummary};
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use thiserror::Error;

pub use memory::MemoryFileStore;
pub use postgres::PgFileStore;

use crate::config::StorageConfig;

/// File store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record has this identifier
    #[error("File '{0}' not found")]
    NotFound(FileId),

    /// The requested status change is not an edge of the lifecycle
    #[error("File '{id}' cannot move from {from} to {to}")]
    InvalidTransition {
        id: FileId,
        from: FileStatus,
        to: FileStatus,
    },

    /// A stored row could not be decoded
    #[error("Stored file '{id}' is corrupt: {reason}")]
    Corrupt { id: FileId, reason: String },

    /// SQL query or connection error
    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A validated upload, ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewFile {
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub payload: Bytes,
    pub metadata: Option<FileMetadata>,
    pub uploaded_at: DateTime<Utc>,
}

/// A stored file. `payload` is only populated when it was asked for.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub summary: FileSummary,
    pub payload: Option<Bytes>,
}

#[async_trait]
pub trait FileStore: Send + Sync + 'static {
    /// Persist a new record with status `uploaded` and a fresh id.
    async fn create(&self, file: NewFile) -> StoreResult<FileSummary>;

    /// All records without payloads, in upload order.
    async fn list(&self) -> StoreResult<Vec<FileSummary>>;

    async fn get(&self, id: FileId, include_payload: bool) -> StoreResult<FileRecord>;

    async fn delete(&self, id: FileId) -> StoreResult<()>;

    /// Move a record to `status`, returning the status it had before.
    async fn set_status(&self, id: FileId, status: FileStatus) -> StoreResult<FileStatus>;

    /// Verify the backend is reachable.
    async fn health(&self) -> StoreResult<()>;

    /// Short backend name for logs and the health endpoint.
    fn backend(&self) -> &'static str;
}

pub type SharedFileStore = Arc<dyn FileStore>;

/// Open the store named by `config.url`, running migrations for PostgreSQL.
pub async fn connect(config: &StorageConfig) -> anyhow::Result<SharedFileStore> {
    if config.is_memory() {
        tracing::info!("Using in-memory file store");
        return Ok(Arc::new(MemoryFileStore::new()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!("Database connection pool established");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    tracing::info!("Database migrations completed");

    Ok(Arc::new(PgFileStore::new(pool)))
}

fn check_transition(id: FileId, from: FileStatus, to: FileStatus) -> StoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(StoreError::InvalidTransition { id, from, to })
    }
}
