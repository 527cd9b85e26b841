//! The seam between the upload queue and the network

use super::UploadSource;
use crate::{api::ProcessingReply, error::Result};
use async_trait::async_trait;
use predicta_common::{FileId, UploadReceipt};

/// What the orchestrator needs from the server.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Send one file; resolves once the server has stored it or refused it.
    async fn upload(&self, source: &UploadSource) -> Result<UploadReceipt>;

    /// Ask the server to start processing a stored file.
    async fn start_processing(&self, id: FileId) -> Result<ProcessingReply>;
}
