use crate::store::{FileStore, StoreError};
use predicta_common::FileId;

#[derive(Debug, Clone, Copy)]
pub struct DeleteFileCommand {
    pub id: FileId,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteFileError {
    #[error("File not found")]
    NotFound,
    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DeleteFileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => Self::NotFound,
            other => Self::Store(other),
        }
    }
}

#[tracing::instrument(skip(store), fields(file_id = %command.id))]
pub async fn handle(store: &dyn FileStore, command: DeleteFileCommand) -> Result<(), DeleteFileError> {
    store.delete(command.id).await?;
    tracing::info!("File deleted");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::{MemoryFileStore, NewFile};
    use bytes::Bytes;
    use chrono::Utc;

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let store = MemoryFileStore::new();
        let mut ids = Vec::new();
        for name in ["a.csv", "b.csv"] {
            let summary = store
                .create(NewFile {
                    storage_key: format!("1{name}"),
                    original_name: name.to_string(),
                    content_type: "text/csv".to_string(),
                    payload: Bytes::from_static(b"x"),
                    metadata: None,
                    uploaded_at: Utc::now(),
                })
                .await
                .unwrap();
            ids.push(summary.id);
        }

        handle(&store, DeleteFileCommand { id: ids[0] }).await.unwrap();

        let remaining = store.list().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, ids[1]);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let store = MemoryFileStore::new();
        let err = handle(&store, DeleteFileCommand { id: FileId::new() }).await.unwrap_err();
        assert!(matches!(err, DeleteFileError::NotFound));
    }
}
