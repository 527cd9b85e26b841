//! Upload orchestration
//!
//! The orchestrator owns a queue of local files and sends the `ready` ones to
//! the server strictly one at a time. While a transfer is outstanding a ticker
//! task advances that entry's progress toward [`PROGRESS_CAP`]; only the
//! server's answer moves it to 100.
//!
//! All state lives behind one mutex that is never held across an `.await`.
//! Every mutation bumps a [`watch`] counter so a renderer can follow along
//! with [`UploadOrchestrator::subscribe`].
//!
//! Cancellation is local bookkeeping. A transfer already in flight still
//! resolves; its result is dropped because the entry's attempt counter or
//! status no longer matches.

mod descriptor;
mod transport;

pub use descriptor::{DescriptorId, DescriptorView, UploadSource, UploadStatus};
pub use transport::Transport;

use crate::{
    api::ProcessingReply,
    error::{CliError, Result},
};
use descriptor::{Descriptor, IdAllocator};
use predicta_common::FileId;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};
use tokio::{sync::watch, task::JoinHandle, time::Instant};
use tracing::{debug, info, warn};

/// How often an outstanding transfer's progress advances.
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

/// Progress added per tick.
pub const PROGRESS_STEP: u8 = 5;

/// Synthetic progress never passes this value.
pub const PROGRESS_CAP: u8 = 90;

/// Point-in-time copy of the queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub descriptors: Vec<DescriptorView>,
    /// Most recent failure, if any
    pub error: Option<String>,
    pub uploading: bool,
}

impl Snapshot {
    pub fn get(&self, id: &DescriptorId) -> Option<&DescriptorView> {
        self.descriptors.iter().find(|d| &d.id == id)
    }

    pub fn statuses(&self) -> Vec<UploadStatus> {
        self.descriptors.iter().map(|d| d.status).collect()
    }
}

/// Outcome of one `submit_all` call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    pub cancelled: bool,
}

#[derive(Default)]
struct Session {
    descriptors: Vec<Descriptor>,
    tickers: HashMap<DescriptorId, JoinHandle<()>>,
    ids: IdAllocator,
    uploading: bool,
    /// Incremented on every batch start and every cancel.
    batch: u64,
    error: Option<String>,
}

impl Session {
    fn find_mut(&mut self, id: &DescriptorId) -> Option<&mut Descriptor> {
        self.descriptors.iter_mut().find(|d| &d.id == id)
    }

    fn is_current(&self, id: &DescriptorId, attempt: u64) -> bool {
        self.descriptors
            .iter()
            .any(|d| &d.id == id && d.status == UploadStatus::Uploading && d.attempt == attempt)
    }

    fn stop_ticker(&mut self, id: &DescriptorId) {
        if let Some(handle) = self.tickers.remove(id) {
            handle.abort();
        }
    }

    fn stop_all_tickers(&mut self) {
        for (_, handle) in self.tickers.drain() {
            handle.abort();
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            descriptors: self.descriptors.iter().map(Descriptor::view).collect(),
            error: self.error.clone(),
            uploading: self.uploading,
        }
    }
}

struct Shared {
    session: Mutex<Session>,
    changes: watch::Sender<u64>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version = version.wrapping_add(1));
    }
}

struct Turn {
    id: DescriptorId,
    attempt: u64,
    source: UploadSource,
}

enum Next {
    Upload(Turn),
    Finished,
    Cancelled,
}

enum Applied {
    Completed,
    Failed,
    Stale,
}

/// Sequential upload queue with synthetic progress.
#[derive(Clone)]
pub struct UploadOrchestrator {
    transport: Arc<dyn Transport>,
    shared: Arc<Shared>,
}

impl UploadOrchestrator {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            transport,
            shared: Arc::new(Shared {
                session: Mutex::new(Session::default()),
                changes,
            }),
        }
    }

    /// Receiver that changes whenever the queue does.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.shared.changes.subscribe()
    }

    fn with_session<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let result = {
            let mut session = self.shared.lock();
            f(&mut session)
        };
        self.shared.notify();
        result
    }

    /// Append files as `ready` entries. Refused while a batch is in flight.
    pub fn enqueue(&self, sources: Vec<UploadSource>) -> Result<Vec<DescriptorId>> {
        let millis = chrono::Utc::now().timestamp_millis();
        self.with_session(|session| {
            if session.uploading {
                return Err(CliError::UploadInProgress);
            }
            session.error = None;

            let ids = sources
                .into_iter()
                .map(|source| {
                    let id = session.ids.next(&source.name, millis);
                    session.descriptors.push(Descriptor::new(id.clone(), source));
                    id
                })
                .collect();
            Ok(ids)
        })
    }

    /// Drop one entry, stopping its ticker first.
    pub fn remove(&self, id: &DescriptorId) -> Result<()> {
        self.with_session(|session| {
            session.stop_ticker(id);
            let before = session.descriptors.len();
            session.descriptors.retain(|d| &d.id != id);
            if session.descriptors.len() == before {
                return Err(CliError::UnknownDescriptor(id.to_string()));
            }
            Ok(())
        })
    }

    /// Drop every entry and the aggregate error.
    pub fn clear_all(&self) {
        self.with_session(|session| {
            session.stop_all_tickers();
            session.descriptors.clear();
            session.error = None;
        });
    }

    /// Stop all tickers, put `uploading` entries back to `ready` at 0 and end
    /// the current batch. Entries not yet started stay `ready` and are not
    /// sent by the cancelled batch.
    pub fn cancel(&self) {
        self.with_session(|session| {
            session.stop_all_tickers();
            for descriptor in &mut session.descriptors {
                if descriptor.status == UploadStatus::Uploading {
                    descriptor.status = UploadStatus::Ready;
                    descriptor.progress = 0;
                }
            }
            session.batch += 1;
            session.uploading = false;
        });
        info!("Upload batch cancelled");
    }

    /// Send every `ready` entry, one at a time, in queue order.
    ///
    /// A failed transfer marks only its own entry; the loop moves on to the
    /// next one. The latest failure is kept as the aggregate error.
    pub async fn submit_all(&self) -> Result<BatchReport> {
        let batch = self.with_session(|session| {
            if session.uploading {
                return Err(CliError::UploadInProgress);
            }
            session.uploading = true;
            session.batch += 1;
            session.error = None;
            Ok(session.batch)
        })?;

        let mut report = BatchReport::default();
        loop {
            let turn = match self.next_turn(batch) {
                Next::Upload(turn) => turn,
                Next::Finished => break,
                Next::Cancelled => {
                    report.cancelled = true;
                    break;
                },
            };

            report.attempted += 1;
            debug!(descriptor = %turn.id, attempt = turn.attempt, "Uploading {}", turn.source.name);
            let result = self.transport.upload(&turn.source).await;

            match self.apply(&turn, result) {
                Applied::Completed => report.completed += 1,
                Applied::Failed => report.failed += 1,
                Applied::Stale => debug!(descriptor = %turn.id, "Discarded stale upload result"),
            }
        }

        self.with_session(|session| {
            if session.batch == batch {
                session.uploading = false;
            }
        });
        Ok(report)
    }

    fn next_turn(&self, batch: u64) -> Next {
        let shared = Arc::clone(&self.shared);
        self.with_session(|session| {
            if session.batch != batch {
                return Next::Cancelled;
            }
            let Some(descriptor) =
                session.descriptors.iter_mut().find(|d| d.status == UploadStatus::Ready)
            else {
                return Next::Finished;
            };

            descriptor.status = UploadStatus::Uploading;
            descriptor.progress = 0;
            descriptor.attempt += 1;
            descriptor.error = None;
            let turn = Turn {
                id: descriptor.id.clone(),
                attempt: descriptor.attempt,
                source: descriptor.source.clone(),
            };

            session.stop_ticker(&turn.id);
            let ticker = spawn_ticker(shared, turn.id.clone(), turn.attempt);
            session.tickers.insert(turn.id.clone(), ticker);
            Next::Upload(turn)
        })
    }

    fn apply(&self, turn: &Turn, result: Result<predicta_common::UploadReceipt>) -> Applied {
        self.with_session(|session| {
            if !session.is_current(&turn.id, turn.attempt) {
                return Applied::Stale;
            }
            session.stop_ticker(&turn.id);

            let name = turn.source.name.as_str();
            let Some(descriptor) = session.find_mut(&turn.id) else {
                return Applied::Stale;
            };
            match result {
                Ok(receipt) => {
                    descriptor.status = UploadStatus::Complete;
                    descriptor.progress = 100;
                    descriptor.server_id = Some(receipt.id);
                    info!(descriptor = %turn.id, file_id = %receipt.id, "Uploaded {}", name);
                    Applied::Completed
                },
                Err(e) => {
                    let message = e.to_string();
                    descriptor.status = UploadStatus::Error;
                    descriptor.error = Some(message.clone());
                    warn!(descriptor = %turn.id, error = %message, "Upload of {} failed", name);
                    session.error = Some(format!("Error uploading {}: {}", name, message));
                    Applied::Failed
                },
            }
        })
    }

    /// Start processing one uploaded file. Failures become the aggregate
    /// error and leave every entry's upload status alone.
    pub async fn request_processing(&self, server_id: FileId) -> Result<ProcessingReply> {
        match self.transport.start_processing(server_id).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                warn!(file_id = %server_id, error = %e, "Processing request failed");
                self.with_session(|session| {
                    session.error = Some(format!("Error starting processing: {}", e));
                });
                Err(e)
            },
        }
    }

    /// Start processing the first file that reached the server.
    pub async fn process_first_uploaded(&self) -> Result<ProcessingReply> {
        let server_id = self
            .uploaded()
            .into_iter()
            .find_map(|d| d.server_id)
            .ok_or(CliError::NothingToProcess)?;
        self.request_processing(server_id).await
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.lock().snapshot()
    }

    /// Entries that received a server id, in queue order.
    pub fn uploaded(&self) -> Vec<DescriptorView> {
        self.shared
            .lock()
            .descriptors
            .iter()
            .filter(|d| d.server_id.is_some())
            .map(Descriptor::view)
            .collect()
    }

    pub fn is_uploading(&self) -> bool {
        self.shared.lock().uploading
    }

    pub fn error(&self) -> Option<String> {
        self.shared.lock().error.clone()
    }
}

/// Advance one entry's progress until it hits the cap or stops being the
/// current attempt.
fn spawn_ticker(shared: Arc<Shared>, id: DescriptorId, attempt: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = tokio::time::interval_at(Instant::now() + PROGRESS_INTERVAL, PROGRESS_INTERVAL);
        loop {
            ticks.tick().await;
            let progress = {
                let mut session = shared.lock();
                match session.find_mut(&id) {
                    Some(d) if d.status == UploadStatus::Uploading && d.attempt == attempt => {
                        d.progress = d.progress.saturating_add(PROGRESS_STEP).min(PROGRESS_CAP);
                        Some(d.progress)
                    },
                    _ => None,
                }
            };
            match progress {
                Some(value) => {
                    shared.notify();
                    if value >= PROGRESS_CAP {
                        break;
                    }
                },
                None => break,
            }
        }
    })
}
