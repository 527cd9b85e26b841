//! Processing state machine
//!
//! A processing request moves a file to `processing` synchronously and
//! schedules its completion. When the delay elapses the configured
//! [`ProcessingOutcome`] picks `processed` or `error` and the store records
//! it. The caller never waits for completion.
//!
//! Requests against a file that already reached a terminal status are
//! accepted but change nothing: the lifecycle never moves backwards.

pub mod outcome;
pub mod scheduler;

use futures::FutureExt;
use predicta_common::{FileId, FileStatus};
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{error, info};

pub use outcome::{always_fails, always_succeeds, Outcome, ProcessingOutcome};
pub use scheduler::{DeferredJob, ManualScheduler, OutcomeScheduler, TokioScheduler};

use crate::store::{SharedFileStore, StoreError};

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File '{0}' not found")]
    NotFound(FileId),

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for ProcessingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result of a processing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingTicket {
    pub file_id: FileId,
    /// Status of the file after the request.
    pub status: FileStatus,
    /// Whether a completion was scheduled by this request.
    pub armed: bool,
}

#[derive(Clone)]
pub struct ProcessingService {
    store: SharedFileStore,
    scheduler: Arc<dyn OutcomeScheduler>,
    outcome: Arc<dyn ProcessingOutcome>,
    delay: Duration,
}

impl ProcessingService {
    pub fn new(
        store: SharedFileStore,
        scheduler: Arc<dyn OutcomeScheduler>,
        outcome: Arc<dyn ProcessingOutcome>,
        delay: Duration,
    ) -> Self {
        Self { store, scheduler, outcome, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Begin processing `id`.
    #[tracing::instrument(skip(self), fields(file_id = %id))]
    pub async fn start(&self, id: FileId) -> Result<ProcessingTicket, ProcessingError> {
        match self.store.set_status(id, FileStatus::Processing).await {
            Ok(previous) => {
                let job = complete(Arc::clone(&self.store), Arc::clone(&self.outcome), id).boxed();
                self.scheduler.schedule(id, self.delay, job);

                info!(from = %previous, delay_secs = self.delay.as_secs(), "Processing started");

                Ok(ProcessingTicket { file_id: id, status: FileStatus::Processing, armed: true })
            },
            Err(StoreError::InvalidTransition { from, .. }) => {
                info!(status = %from, "Processing already finished, request ignored");
                Ok(ProcessingTicket { file_id: id, status: from, armed: false })
            },
            Err(err) => Err(err.into()),
        }
    }
}

/// Deferred half of a processing run. Failures are logged and go no further.
async fn complete(
    store: SharedFileStore,
    outcome: Arc<dyn ProcessingOutcome>,
    id: FileId,
) {
    let record = match store.get(id, false).await {
        Ok(record) => record,
        Err(err) => {
            error!(file_id = %id, error = %err, "Deferred processing could not load file");
            return;
        },
    };

    let next = outcome.decide(&record.summary).status();

    match store.set_status(id, next).await {
        Ok(_) => info!(file_id = %id, status = %next, "Processing finished"),
        Err(err) => {
            error!(file_id = %id, error = %err, "Deferred processing could not record outcome")
        },
    }
}
