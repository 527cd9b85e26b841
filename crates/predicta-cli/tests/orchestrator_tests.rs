//! Upload orchestrator scenarios against a scripted transport
//!
//! Time is paused, so transfer delays and progress ticks elapse instantly and
//! in a fixed order.

use async_trait::async_trait;
use chrono::Utc;
use predicta_cli::{
    api::ProcessingReply,
    orchestrator::{
        Transport, UploadOrchestrator, UploadSource, UploadStatus, PROGRESS_CAP, PROGRESS_STEP,
    },
    CliError, Result,
};
use predicta_common::{FileId, FileStatus, ProcessingStarted, UploadReceipt};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

#[derive(Clone)]
struct Step {
    delay: Duration,
    failure: Option<&'static str>,
}

fn ok_after(secs: u64) -> Step {
    Step { delay: Duration::from_secs(secs), failure: None }
}

fn fail_after(secs: u64, message: &'static str) -> Step {
    Step { delay: Duration::from_secs(secs), failure: Some(message) }
}

/// Answers each upload from a per-file script; unscripted files succeed
/// after one second.
#[derive(Default)]
struct ScriptedTransport {
    plan: Mutex<HashMap<String, VecDeque<Step>>>,
    calls: Mutex<Vec<String>>,
    issued: Mutex<Vec<FileId>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    processing_failure: Option<&'static str>,
    processed: Mutex<Vec<FileId>>,
}

impl ScriptedTransport {
    fn script(self, name: &str, steps: Vec<Step>) -> Self {
        self.plan.lock().unwrap().insert(name.to_string(), steps.into());
        self
    }

    fn failing_processing(mut self, message: &'static str) -> Self {
        self.processing_failure = Some(message);
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn issued(&self) -> Vec<FileId> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn upload(&self, source: &UploadSource) -> Result<UploadReceipt> {
        self.calls.lock().unwrap().push(source.name.clone());
        let step = self
            .plan
            .lock()
            .unwrap()
            .get_mut(&source.name)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| ok_after(1));
        let id = FileId::new();
        self.issued.lock().unwrap().push(id);

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(step.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match step.failure {
            Some(message) => Err(CliError::api(500, message)),
            None => Ok(UploadReceipt {
                id,
                filename: source.name.clone(),
                size: source.size,
                upload_date: Utc::now(),
            }),
        }
    }

    async fn start_processing(&self, id: FileId) -> Result<ProcessingReply> {
        if let Some(message) = self.processing_failure {
            return Err(CliError::api(500, message));
        }
        self.processed.lock().unwrap().push(id);
        Ok(ProcessingReply {
            message: Some("File processing started".to_string()),
            started: ProcessingStarted { file_id: id, status: FileStatus::Processing },
        })
    }
}

fn sources(names: &[&str]) -> Vec<UploadSource> {
    names
        .iter()
        .map(|name| UploadSource::new(*name, *name, 128, "text/csv"))
        .collect()
}

fn setup(transport: ScriptedTransport) -> (Arc<ScriptedTransport>, UploadOrchestrator) {
    let transport = Arc::new(transport);
    let orchestrator = UploadOrchestrator::new(transport.clone());
    (transport, orchestrator)
}

#[tokio::test(start_paused = true)]
async fn test_failed_transfer_does_not_stop_the_batch() {
    let (transport, orchestrator) =
        setup(ScriptedTransport::default().script("b.csv", vec![fail_after(1, "disk full")]));
    orchestrator.enqueue(sources(&["a.csv", "b.csv", "c.csv"])).unwrap();

    let report = orchestrator.submit_all().await.unwrap();

    assert_eq!(report.attempted, 3);
    assert_eq!(report.completed, 2);
    assert_eq!(report.failed, 1);
    assert!(!report.cancelled);

    let snapshot = orchestrator.snapshot();
    assert_eq!(
        snapshot.statuses(),
        vec![UploadStatus::Complete, UploadStatus::Error, UploadStatus::Complete]
    );
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Error uploading b.csv: Server error (500): disk full")
    );
    assert_eq!(snapshot.descriptors[0].progress, 100);
    assert_eq!(snapshot.descriptors[2].progress, 100);
    assert!(snapshot.descriptors[1].progress <= PROGRESS_CAP);
    assert_eq!(
        snapshot.descriptors[1].error.as_deref(),
        Some("Server error (500): disk full")
    );

    assert_eq!(transport.calls(), vec!["a.csv", "b.csv", "c.csv"]);
    assert_eq!(transport.max_in_flight.load(Ordering::SeqCst), 1);

    let uploaded = orchestrator.uploaded();
    assert_eq!(uploaded.len(), 2);
    assert_eq!(uploaded[0].name, "a.csv");
    assert_eq!(uploaded[1].name, "c.csv");
    assert!(!orchestrator.is_uploading());
}

#[tokio::test(start_paused = true)]
async fn test_progress_advances_but_stops_short_of_completion() {
    let (_, orchestrator) =
        setup(ScriptedTransport::default().script("slow.csv", vec![ok_after(60)]));
    let ids = orchestrator.enqueue(sources(&["slow.csv"])).unwrap();

    let batch = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit_all().await }
    });

    tokio::time::sleep(Duration::from_millis(1100)).await;
    let early = orchestrator.snapshot();
    let entry = early.get(&ids[0]).unwrap();
    assert_eq!(entry.status, UploadStatus::Uploading);
    assert!(entry.progress > 0);
    assert_eq!(entry.progress % PROGRESS_STEP, 0);
    assert!(early.uploading);

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(orchestrator.snapshot().get(&ids[0]).unwrap().progress, PROGRESS_CAP);

    let report = batch.await.unwrap().unwrap();
    assert_eq!(report.completed, 1);
    let done = orchestrator.snapshot();
    assert_eq!(done.get(&ids[0]).unwrap().progress, 100);
    assert_eq!(done.get(&ids[0]).unwrap().status, UploadStatus::Complete);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_transfer_resets_and_ends_the_batch() {
    let (transport, orchestrator) =
        setup(ScriptedTransport::default().script("a.csv", vec![ok_after(10)]));
    let ids = orchestrator.enqueue(sources(&["a.csv", "b.csv"])).unwrap();

    let batch = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit_all().await }
    });

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(orchestrator.snapshot().get(&ids[0]).unwrap().progress > 0);

    orchestrator.cancel();
    let cancelled = orchestrator.snapshot();
    assert_eq!(cancelled.statuses(), vec![UploadStatus::Ready, UploadStatus::Ready]);
    assert!(cancelled.descriptors.iter().all(|d| d.progress == 0));
    assert!(!cancelled.uploading);

    // No ticker survives the cancel.
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(orchestrator.snapshot().get(&ids[0]).unwrap().progress, 0);

    // The in-flight transfer still resolves, but its success is not applied.
    let report = batch.await.unwrap().unwrap();
    assert!(report.cancelled);
    assert_eq!(report.attempted, 1);
    assert_eq!(report.completed, 0);

    let after = orchestrator.snapshot();
    assert_eq!(after.statuses(), vec![UploadStatus::Ready, UploadStatus::Ready]);
    assert!(after.descriptors.iter().all(|d| d.server_id.is_none()));
    assert_eq!(transport.calls(), vec!["a.csv"]);
}

#[tokio::test(start_paused = true)]
async fn test_stale_result_does_not_overwrite_a_newer_attempt() {
    let (transport, orchestrator) =
        setup(ScriptedTransport::default().script("a.csv", vec![ok_after(10), ok_after(1)]));
    let ids = orchestrator.enqueue(sources(&["a.csv"])).unwrap();

    let first = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit_all().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    orchestrator.cancel();

    let second = orchestrator.submit_all().await.unwrap();
    assert_eq!(second.completed, 1);

    let first = first.await.unwrap().unwrap();
    assert!(first.cancelled);
    assert_eq!(first.completed, 0);

    let issued = transport.issued();
    assert_eq!(issued.len(), 2);
    let entry = orchestrator.snapshot().get(&ids[0]).cloned().unwrap();
    assert_eq!(entry.status, UploadStatus::Complete);
    assert_eq!(entry.server_id, Some(issued[1]));
    assert!(!orchestrator.is_uploading());
}

#[tokio::test(start_paused = true)]
async fn test_queue_is_locked_while_uploading() {
    let (_, orchestrator) =
        setup(ScriptedTransport::default().script("a.csv", vec![ok_after(5)]));
    orchestrator.enqueue(sources(&["a.csv"])).unwrap();

    let batch = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit_all().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(matches!(
        orchestrator.enqueue(sources(&["late.csv"])),
        Err(CliError::UploadInProgress)
    ));
    assert!(matches!(orchestrator.submit_all().await, Err(CliError::UploadInProgress)));

    batch.await.unwrap().unwrap();
    assert_eq!(orchestrator.enqueue(sources(&["late.csv"])).unwrap().len(), 1);
    assert_eq!(orchestrator.snapshot().descriptors.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_removing_the_active_entry_discards_its_result() {
    let (transport, orchestrator) =
        setup(ScriptedTransport::default().script("a.csv", vec![ok_after(5)]));
    let ids = orchestrator.enqueue(sources(&["a.csv", "b.csv"])).unwrap();

    let batch = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.submit_all().await }
    });
    tokio::time::sleep(Duration::from_secs(1)).await;
    orchestrator.remove(&ids[0]).unwrap();

    let report = batch.await.unwrap().unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.completed, 1);

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.descriptors.len(), 1);
    assert_eq!(snapshot.descriptors[0].id, ids[1]);
    assert_eq!(snapshot.descriptors[0].status, UploadStatus::Complete);
    assert_eq!(transport.calls(), vec!["a.csv", "b.csv"]);
}

#[tokio::test(start_paused = true)]
async fn test_processing_request_targets_the_first_upload() {
    let (transport, orchestrator) = setup(ScriptedTransport::default());
    orchestrator.enqueue(sources(&["a.csv", "b.csv"])).unwrap();
    orchestrator.submit_all().await.unwrap();

    let reply = orchestrator.process_first_uploaded().await.unwrap();
    let first = orchestrator.uploaded()[0].server_id.unwrap();
    assert_eq!(reply.started.file_id, first);
    assert_eq!(*transport.processed.lock().unwrap(), vec![first]);
}

#[tokio::test(start_paused = true)]
async fn test_processing_failure_is_reported_without_touching_uploads() {
    let (_, orchestrator) =
        setup(ScriptedTransport::default().failing_processing("A storage error occurred"));
    orchestrator.enqueue(sources(&["a.csv"])).unwrap();
    orchestrator.submit_all().await.unwrap();
    let server_id = orchestrator.uploaded()[0].server_id.unwrap();

    let err = orchestrator.request_processing(server_id).await.unwrap_err();
    assert!(matches!(err, CliError::Api { status: 500, .. }));

    let snapshot = orchestrator.snapshot();
    assert_eq!(snapshot.statuses(), vec![UploadStatus::Complete]);
    assert_eq!(
        snapshot.error.as_deref(),
        Some("Error starting processing: Server error (500): A storage error occurred")
    );
}
