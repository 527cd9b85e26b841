use async_trait::async_trait;
use bytes::Bytes;
use predicta_common::{FileId, FileStatus, FileSummary};
use tokio::sync::RwLock;

use super::{check_transition, FileRecord, FileStore, NewFile, StoreError, StoreResult};

#[derive(Debug)]
struct Entry {
    summary: FileSummary,
    payload: Bytes,
}

/// In-process store. Records live for the lifetime of the value.
#[derive(Debug, Default)]
pub struct MemoryFileStore {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn create(&self, file: NewFile) -> StoreResult<FileSummary> {
        let summary = FileSummary {
            id: FileId::new(),
            storage_key: file.storage_key,
            original_name: file.original_name,
            content_type: file.content_type,
            byte_size: file.payload.len() as u64,
            uploaded_at: file.uploaded_at,
            status: FileStatus::Uploaded,
            metadata: file.metadata,
        };

        self.entries.write().await.push(Entry {
            summary: summary.clone(),
            payload: file.payload,
        });

        Ok(summary)
    }

    async fn list(&self) -> StoreResult<Vec<FileSummary>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().map(|e| e.summary.clone()).collect())
    }

    async fn get(&self, id: FileId, include_payload: bool) -> StoreResult<FileRecord> {
        let entries = self.entries.read().await;
        let entry = entries
            .iter()
            .find(|e| e.summary.id == id)
            .ok_or(StoreError::NotFound(id))?;

        Ok(FileRecord {
            summary: entry.summary.clone(),
            payload: include_payload.then(|| entry.payload.clone()),
        })
    }

    async fn delete(&self, id: FileId) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        let index = entries
            .iter()
            .position(|e| e.summary.id == id)
            .ok_or(StoreError::NotFound(id))?;
        entries.remove(index);
        Ok(())
    }

    async fn set_status(&self, id: FileId, status: FileStatus) -> StoreResult<FileStatus> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .iter_mut()
            .find(|e| e.summary.id == id)
            .ok_or(StoreError::NotFound(id))?;

        let previous = entry.summary.status;
        check_transition(id, previous, status)?;
        entry.summary.status = status;
        Ok(previous)
    }

    async fn health(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn new_file(name: &str, payload: &'static [u8]) -> NewFile {
        NewFile {
            storage_key: format!("1700000000000{name}"),
            original_name: name.to_string(),
            content_type: "text/csv".to_string(),
            payload: Bytes::from_static(payload),
            metadata: None,
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_uploaded_status() {
        let store = MemoryFileStore::new();
        let summary = store.create(new_file("a.csv", b"x,y\n1,2\n")).await.unwrap();

        assert_eq!(summary.status, FileStatus::Uploaded);
        assert_eq!(summary.byte_size, 8);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_keeps_upload_order_and_omits_payload() {
        let store = MemoryFileStore::new();
        let first = store.create(new_file("a.csv", b"a")).await.unwrap();
        let second = store.create(new_file("b.csv", b"b")).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_same_storage_key_and_name_are_distinct_records() {
        let store = MemoryFileStore::new();
        let a = store.create(new_file("data.csv", b"1")).await.unwrap();
        let b = store.create(new_file("data.csv", b"2")).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(store.len().await, 2);
        assert_eq!(store.get(b.id, true).await.unwrap().payload.unwrap(), Bytes::from_static(b"2"));
    }

    #[tokio::test]
    async fn test_get_payload_only_on_request() {
        let store = MemoryFileStore::new();
        let summary = store.create(new_file("a.csv", b"abc")).await.unwrap();

        let without = store.get(summary.id, false).await.unwrap();
        assert!(without.payload.is_none());

        let with = store.get(summary.id, true).await.unwrap();
        assert_eq!(with.payload.unwrap(), Bytes::from_static(b"abc"));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let store = MemoryFileStore::new();
        let summary = store.create(new_file("a.csv", b"abc")).await.unwrap();

        store.delete(summary.id).await.unwrap();
        assert!(matches!(store.get(summary.id, false).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete(summary.id).await, Err(StoreError::NotFound(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_set_status_follows_lifecycle() {
        let store = MemoryFileStore::new();
        let id = store.create(new_file("a.csv", b"abc")).await.unwrap().id;

        assert_eq!(store.set_status(id, FileStatus::Processing).await.unwrap(), FileStatus::Uploaded);
        assert_eq!(
            store.set_status(id, FileStatus::Processing).await.unwrap(),
            FileStatus::Processing
        );
        assert_eq!(
            store.set_status(id, FileStatus::Processed).await.unwrap(),
            FileStatus::Processing
        );

        let err = store.set_status(id, FileStatus::Processing).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::InvalidTransition {
                from: FileStatus::Processed,
                to: FileStatus::Processing,
                ..
            }
        ));
        assert_eq!(store.get(id, false).await.unwrap().summary.status, FileStatus::Processed);
    }

    #[tokio::test]
    async fn test_set_status_on_deleted_file_is_not_found() {
        let store = MemoryFileStore::new();
        let id = store.create(new_file("a.csv", b"abc")).await.unwrap().id;
        store.delete(id).await.unwrap();

        assert!(matches!(
            store.set_status(id, FileStatus::Processing).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
