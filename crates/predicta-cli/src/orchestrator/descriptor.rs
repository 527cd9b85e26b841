//! Upload queue entries

use crate::error::{CliError, Result};
use predicta_common::{ContentKind, FileId, MAX_UPLOAD_BYTES};
use serde::Serialize;
use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

/// Client-side identifier of a queued upload, `"{name}-{millis}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DescriptorId(String);

impl DescriptorId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DescriptorId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// `ready → uploading → {complete | error}`; `uploading → ready` only by cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Ready,
    Uploading,
    Complete,
    Error,
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UploadStatus::Ready => "ready",
            UploadStatus::Uploading => "uploading",
            UploadStatus::Complete => "complete",
            UploadStatus::Error => "error",
        })
    }
}

/// A local file accepted for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub content_type: String,
}

impl UploadSource {
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        size: u64,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            size,
            content_type: content_type.into(),
        }
    }

    /// Inspect a path and apply the selection rules: a regular file with a
    /// `.csv`, `.xls`, `.xlsx` or `.json` extension, no larger than
    /// [`MAX_UPLOAD_BYTES`].
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(CliError::unsupported_file(path, "not a regular file"));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CliError::unsupported_file(path, "file name is not valid UTF-8"))?;
        let content_type = content_type_for(path)?;
        check_size(path, metadata.len())?;

        Ok(Self::new(path, name, metadata.len(), content_type))
    }
}

fn content_type_for(path: &Path) -> Result<&'static str> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .and_then(ContentKind::from_extension)
        .map(|(_, mime)| mime)
        .ok_or_else(|| {
            CliError::unsupported_file(
                path,
                "unsupported file type (expected .csv, .xls, .xlsx or .json)",
            )
        })
}

fn check_size(path: &Path, size: u64) -> Result<()> {
    if size > MAX_UPLOAD_BYTES {
        return Err(CliError::unsupported_file(
            path,
            format!(
                "file is {} and the limit is {}",
                crate::progress::format_bytes(size),
                crate::progress::format_bytes(MAX_UPLOAD_BYTES)
            ),
        ));
    }
    Ok(())
}

/// Mutable state of one queue entry.
#[derive(Debug, Clone)]
pub(crate) struct Descriptor {
    pub id: DescriptorId,
    pub source: UploadSource,
    pub status: UploadStatus,
    pub progress: u8,
    /// Bumped each time the entry starts uploading; results carrying an older
    /// attempt are discarded.
    pub attempt: u64,
    pub server_id: Option<FileId>,
    pub error: Option<String>,
}

impl Descriptor {
    pub fn new(id: DescriptorId, source: UploadSource) -> Self {
        Self {
            id,
            source,
            status: UploadStatus::Ready,
            progress: 0,
            attempt: 0,
            server_id: None,
            error: None,
        }
    }

    pub fn view(&self) -> DescriptorView {
        DescriptorView {
            id: self.id.clone(),
            name: self.source.name.clone(),
            size: self.source.size,
            status: self.status,
            progress: self.progress,
            server_id: self.server_id,
            error: self.error.clone(),
        }
    }
}

/// Read-only copy of a queue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorView {
    pub id: DescriptorId,
    pub name: String,
    pub size: u64,
    pub status: UploadStatus,
    pub progress: u8,
    pub server_id: Option<FileId>,
    pub error: Option<String>,
}

/// Hands out unique descriptor ids for one session.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    issued: HashSet<String>,
    sequence: u64,
}

impl IdAllocator {
    pub fn next(&mut self, name: &str, millis: i64) -> DescriptorId {
        let base = format!("{name}-{millis}");
        let mut candidate = base.clone();
        while self.issued.contains(&candidate) {
            self.sequence += 1;
            candidate = format!("{base}-{}", self.sequence);
        }
        self.issued.insert(candidate.clone());
        DescriptorId(candidate)
    }
}
