use crate::store::{FileStore, StoreError};
use predicta_common::{FileId, FileSummary};

#[derive(Debug, Clone, Copy)]
pub struct GetFileQuery {
    pub id: FileId,
}

#[derive(Debug, thiserror::Error)]
pub enum GetFileError {
    #[error("File not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for GetFileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

pub async fn handle(store: &dyn FileStore, query: GetFileQuery) -> Result<FileSummary, GetFileError> {
    Ok(store.get(query.id, false).await?.summary)
}
