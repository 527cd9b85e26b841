use crate::{
    metadata,
    staging::{StagedFile, StagingError},
    store::{FileStore, NewFile, StoreError},
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use predicta_common::{ContentKind, UploadReceipt};

/// An upload as received from the client, body already staged.
#[derive(Debug, Default)]
pub struct UploadFileCommand {
    pub filename: String,
    pub content_type: Option<String>,
    pub payload: Option<StagedFile>,
}

#[derive(Debug, thiserror::Error)]
pub enum IntakeError {
    #[error("No file was uploaded")]
    NoFilePresent,
    #[error("Invalid file type. Only CSV, Excel, and JSON files are allowed")]
    UnsupportedType { declared: Option<String> },
    #[error("File exceeds the maximum upload size of {limit} bytes")]
    PayloadTooLarge { limit: u64 },
    #[error("Malformed upload: {0}")]
    Malformed(String),
    #[error("Failed to stage upload: {0}")]
    Staging(#[source] std::io::Error),
    #[error("Failed to store upload: {0}")]
    Store(#[from] StoreError),
}

impl From<StagingError> for IntakeError {
    fn from(err: StagingError) -> Self {
        match err {
            StagingError::TooLarge { limit } => Self::PayloadTooLarge { limit },
            StagingError::Stream(msg) => Self::Malformed(msg),
            StagingError::Io(e) => Self::Staging(e),
        }
    }
}

impl UploadFileCommand {
    /// Checks presence, then type, then size. Returns the kind of the upload.
    pub fn validate(&self, max_bytes: u64) -> Result<ContentKind, IntakeError> {
        let payload = match &self.payload {
            Some(payload) if !self.filename.trim().is_empty() => payload,
            _ => return Err(IntakeError::NoFilePresent),
        };

        let kind = self
            .content_type
            .as_deref()
            .and_then(ContentKind::from_mime)
            .ok_or_else(|| IntakeError::UnsupportedType { declared: self.content_type.clone() })?;

        if payload.size() > max_bytes {
            return Err(IntakeError::PayloadTooLarge { limit: max_bytes });
        }

        Ok(kind)
    }
}

/// Storage key for an upload: the millisecond timestamp followed by the
/// final path component of the client's name with all whitespace removed.
pub fn storage_key(at: DateTime<Utc>, filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let mut compact: String = base.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        compact.push_str("upload");
    }
    format!("{}{}", at.timestamp_millis(), compact)
}

#[tracing::instrument(skip(store, command), fields(filename = %command.filename))]
pub async fn handle(
    store: &dyn FileStore,
    command: UploadFileCommand,
    max_bytes: u64,
) -> Result<UploadReceipt, IntakeError> {
    let kind = command.validate(max_bytes)?;

    let UploadFileCommand { filename, content_type, payload } = command;
    let Some(staged) = payload else {
        return Err(IntakeError::NoFilePresent);
    };

    let result = persist(store, &staged, filename, content_type, kind).await;

    if let Err(e) = staged.discard() {
        tracing::warn!(error = %e, "Failed to remove staging file");
    }

    let receipt = result?;
    tracing::info!(id = %receipt.id, size = receipt.size, "File uploaded");
    Ok(receipt)
}

async fn persist(
    store: &dyn FileStore,
    staged: &StagedFile,
    filename: String,
    content_type: Option<String>,
    kind: ContentKind,
) -> Result<UploadReceipt, IntakeError> {
    let payload: Bytes = staged.read().await.map_err(IntakeError::Staging)?;

    let metadata = metadata::extract(&payload, kind);
    if kind == ContentKind::Csv && metadata.is_none() {
        tracing::warn!("CSV body is not valid UTF-8, storing without metadata");
    }

    let uploaded_at = Utc::now();
    let summary = store
        .create(NewFile {
            storage_key: storage_key(uploaded_at, &filename),
            original_name: filename,
            content_type: content_type.unwrap_or_default(),
            payload,
            metadata,
            uploaded_at,
        })
        .await?;

    Ok(UploadReceipt::from(&summary))
}
