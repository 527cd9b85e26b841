//! API response types
//!
//! Mirrors the server's envelope: success bodies carry `success` plus optional
//! `message`, `count` and `data`; failures carry `code` and `message`.

use serde::Deserialize;

pub use predicta_common::{FileMetadata, FileStatus, FileSummary, ProcessingStarted, UploadReceipt};

/// Success envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub count: Option<usize>,
    pub data: Option<T>,
}

/// Failure body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Payload fetched from the download endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Name from `Content-Disposition`, when the server sent one
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Server acknowledgement of a processing request
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReply {
    pub message: Option<String>,
    pub started: ProcessingStarted,
}

/// Extract the quoted filename from an `attachment; filename="..."` header.
pub fn disposition_filename(header: &str) -> Option<String> {
    header.split(';').map(str::trim).find_map(|part| {
        let value = part.strip_prefix("filename=")?;
        let value = value.trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}
