//! Temporary staging of upload bodies
//!
//! Request bodies are streamed to a named temporary file in the configured
//! upload directory while their size is counted. The file is removed when the
//! [`StagedFile`] is dropped, so an upload that fails validation, fails to
//! persist, or is abandoned mid-stream leaves nothing behind.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::{
    io,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum StagingError {
    #[error("Upload exceeds the {limit} byte limit")]
    TooLarge { limit: u64 },

    #[error("Failed to read upload body: {0}")]
    Stream(String),

    #[error("Staging I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Where upload bodies are staged, and how large they may grow.
#[derive(Debug, Clone)]
pub struct StagingArea {
    dir: PathBuf,
    max_bytes: u64,
}

impl StagingArea {
    pub fn new(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self { dir: dir.into(), max_bytes }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Create the staging directory if it does not exist yet.
    pub async fn prepare(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    /// Write `chunks` to a fresh staging file, failing as soon as the running
    /// total passes the limit.
    pub async fn stage<S>(&self, chunks: S) -> Result<StagedFile, StagingError>
    where
        S: Stream<Item = Result<Bytes, StagingError>>,
    {
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&self.dir)?;
        let mut writer = tokio::fs::File::from_std(file.as_file().try_clone()?);

        let mut chunks = std::pin::pin!(chunks);
        let mut size: u64 = 0;

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            size += chunk.len() as u64;
            if size > self.max_bytes {
                return Err(StagingError::TooLarge { limit: self.max_bytes });
            }
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        tracing::debug!(path = %file.path().display(), size, "Upload staged");

        Ok(StagedFile { file, size })
    }
}

/// A fully received upload body on disk.
#[derive(Debug)]
pub struct StagedFile {
    file: tempfile::NamedTempFile,
    size: u64,
}

impl StagedFile {
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn read(&self) -> io::Result<Bytes> {
        tokio::fs::read(self.file.path()).await.map(Bytes::from)
    }

    /// Remove the staging file now, reporting removal failures.
    pub fn discard(self) -> io::Result<()> {
        self.file.close()
    }
}
