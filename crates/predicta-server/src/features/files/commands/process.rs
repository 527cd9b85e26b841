use crate::processing::{ProcessingError, ProcessingService, ProcessingTicket};
use predicta_common::FileId;

#[derive(Debug, Clone, Copy)]
pub struct StartProcessingCommand {
    pub id: FileId,
}

#[derive(Debug, thiserror::Error)]
pub enum StartProcessingError {
    #[error("File not found")]
    NotFound,
    #[error("Processing error: {0}")]
    Processing(ProcessingError),
}

impl From<ProcessingError> for StartProcessingError {
    fn from(err: ProcessingError) -> Self {
        match err {
            ProcessingError::NotFound(_) => Self::NotFound,
            other => Self::Processing(other),
        }
    }
}

pub async fn handle(
    processing: &ProcessingService,
    command: StartProcessingCommand,
) -> Result<ProcessingTicket, StartProcessingError> {
    Ok(processing.start(command.id).await?)
}
