use crate::store::{FileStore, StoreError};
use bytes::Bytes;
use predicta_common::FileId;

#[derive(Debug, Clone, Copy)]
pub struct DownloadFileQuery {
    pub id: FileId,
}

#[derive(Debug, Clone)]
pub struct DownloadFileResponse {
    pub filename: String,
    pub content_type: String,
    pub payload: Bytes,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadFileError {
    #[error("File not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DownloadFileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

#[tracing::instrument(skip(store), fields(file_id = %query.id))]
pub async fn handle(
    store: &dyn FileStore,
    query: DownloadFileQuery,
) -> Result<DownloadFileResponse, DownloadFileError> {
    let record = store.get(query.id, true).await?;
    let payload = record.payload.unwrap_or_default();

    tracing::debug!(size = payload.len(), "Serving file payload");

    Ok(DownloadFileResponse {
        filename: record.summary.original_name,
        content_type: record.summary.content_type,
        payload,
    })
}
