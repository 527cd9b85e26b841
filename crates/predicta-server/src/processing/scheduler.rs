//! Deferred completion scheduling
//!
//! A scheduler runs one job per file after a delay. Scheduling a job for a
//! file that already has one pending replaces the pending job, which is how a
//! repeated processing request re-arms its completion.

use futures::future::BoxFuture;
use predicta_common::FileId;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};
use tokio::{task::JoinHandle, time::Instant};

pub type DeferredJob = BoxFuture<'static, ()>;

pub trait OutcomeScheduler: Send + Sync + 'static {
    /// Run `job` after `delay`, replacing any job still pending for `id`.
    fn schedule(&self, id: FileId, delay: Duration, job: DeferredJob);

    /// Number of jobs that have not run yet.
    fn pending(&self) -> usize;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug)]
struct Armed {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug, Default)]
struct Timers {
    next_generation: u64,
    armed: HashMap<FileId, Armed>,
}

/// Runs each job on a spawned tokio task that sleeps until `schedule` time
/// plus the delay.
///
/// Sleeping goes through `tokio::time`, so paused-time tests control when
/// jobs fire. Must be used from within a tokio runtime.
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    timers: Arc<Mutex<Timers>>,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every pending job.
    pub fn cancel_all(&self) {
        let mut timers = lock(&self.timers);
        for (_, armed) in timers.armed.drain() {
            armed.handle.abort();
        }
    }
}

impl OutcomeScheduler for TokioScheduler {
    fn schedule(&self, id: FileId, delay: Duration, job: DeferredJob) {
        let mut timers = lock(&self.timers);
        timers.next_generation += 1;
        let generation = timers.next_generation;

        let deadline = Instant::now() + delay;
        let registry = Arc::clone(&self.timers);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            job.await;

            let mut timers = lock(&registry);
            if timers.armed.get(&id).is_some_and(|a| a.generation == generation) {
                timers.armed.remove(&id);
            }
        });

        if let Some(previous) = timers.armed.insert(id, Armed { generation, handle }) {
            tracing::debug!(file_id = %id, "Replacing pending completion");
            previous.handle.abort();
        }
    }

    fn pending(&self) -> usize {
        lock(&self.timers).armed.len()
    }
}

struct Queued {
    id: FileId,
    delay: Duration,
    job: DeferredJob,
}

/// Holds jobs until [`ManualScheduler::run_pending`] is called. The delay is
/// recorded but never waited on.
#[derive(Default)]
pub struct ManualScheduler {
    queue: Mutex<Vec<Queued>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays of the queued jobs, in scheduling order.
    pub fn delays(&self) -> Vec<(FileId, Duration)> {
        lock(&self.queue).iter().map(|q| (q.id, q.delay)).collect()
    }

    /// Run every queued job to completion, in scheduling order. Returns how
    /// many ran.
    pub async fn run_pending(&self) -> usize {
        let jobs: Vec<Queued> = std::mem::take(&mut *lock(&self.queue));
        let count = jobs.len();
        for queued in jobs {
            queued.job.await;
        }
        count
    }
}

impl OutcomeScheduler for ManualScheduler {
    fn schedule(&self, id: FileId, delay: Duration, job: DeferredJob) {
        let mut queue = lock(&self.queue);
        queue.retain(|q| q.id != id);
        queue.push(Queued { id, delay, job });
    }

    fn pending(&self) -> usize {
        lock(&self.queue).len()
    }
}
