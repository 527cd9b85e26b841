use crate::store::{FileStore, StoreError};
use predicta_common::FileSummary;

#[derive(Debug, Clone, Copy, Default)]
pub struct ListFilesQuery;

#[derive(Debug, thiserror::Error)]
pub enum ListFilesError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

pub async fn handle(
    store: &dyn FileStore,
    _query: ListFilesQuery,
) -> Result<Vec<FileSummary>, ListFilesError> {
    Ok(store.list().await?)
}
