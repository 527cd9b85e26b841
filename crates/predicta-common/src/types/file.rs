use super::{FileId, FileStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structural metadata derived from a delimited-text upload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub row_count: u64,
    pub column_count: u64,
    pub header_names: Vec<String>,
}

/// A stored file without its payload.
///
/// This is the only shape returned by list and single-file lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: FileId,
    pub storage_key: String,
    pub original_name: String,
    pub content_type: String,
    pub byte_size: u64,
    pub uploaded_at: DateTime<Utc>,
    pub status: FileStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<FileMetadata>,
}

/// What the intake hands back after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub id: FileId,
    pub filename: String,
    pub size: u64,
    pub upload_date: DateTime<Utc>,
}

impl From<&FileSummary> for UploadReceipt {
    fn from(summary: &FileSummary) -> Self {
        Self {
            id: summary.id,
            filename: summary.original_name.clone(),
            size: summary.byte_size,
            upload_date: summary.uploaded_at,
        }
    }
}

/// Acknowledgement of a processing request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStarted {
    pub file_id: FileId,
    pub status: FileStatus,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_uses_camel_case_and_omits_missing_metadata() {
        let summary = FileSummary {
            id: FileId::new(),
            storage_key: "1700000000000sales.json".to_string(),
            original_name: "sales.json".to_string(),
            content_type: "application/json".to_string(),
            byte_size: 42,
            uploaded_at: Utc::now(),
            status: FileStatus::Uploaded,
            metadata: None,
        };

        let value = serde_json::to_value(&summary).unwrap();
        assert!(value.get("originalName").is_some());
        assert!(value.get("byteSize").is_some());
        assert!(value.get("metadata").is_none());
        assert!(value.get("payload").is_none());
        assert_eq!(value["status"], "uploaded");
    }

    #[test]
    fn test_receipt_from_summary() {
        let summary = FileSummary {
            id: FileId::new(),
            storage_key: "1700000000000a.csv".to_string(),
            original_name: "a.csv".to_string(),
            content_type: "text/csv".to_string(),
            byte_size: 7,
            uploaded_at: Utc::now(),
            status: FileStatus::Uploaded,
            metadata: Some(FileMetadata {
                row_count: 1,
                column_count: 1,
                header_names: vec!["a".to_string()],
            }),
        };

        let receipt = UploadReceipt::from(&summary);
        assert_eq!(receipt.id, summary.id);
        assert_eq!(receipt.filename, "a.csv");
        assert_eq!(receipt.size, 7);

        let value = serde_json::to_value(&receipt).unwrap();
        assert!(value.get("uploadDate").is_some());
    }
}
