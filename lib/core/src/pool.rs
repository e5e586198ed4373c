// Bounded worker pool for scoring jobs
// A fixed set of workers consumes one shared FIFO queue; excess submissions wait in the queue

use crate::error::{Error, Result};
use crate::job::{CallbackPayload, ScoreResult, ScoringJob};
use futures_util::FutureExt;
use parking_lot::Mutex;
use serde::Serialize;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Turns a job into a result. Runs on a blocking thread.
pub trait JobRunner: Send + Sync + 'static {
    fn run(&self, job: &ScoringJob) -> Result<ScoreResult>;
}

/// Notified exactly once per job, after it finished (successfully or not)
pub trait CompletionHandler: Send + Sync + 'static {
    fn on_complete(&self, payload: CallbackPayload) -> impl Future<Output = ()> + Send;
}

/// Worker pool configuration
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Number of jobs allowed to execute at the same time
    pub workers: usize,
    /// Artificial delay before each job runs, standing in for slow downstream work
    pub processing_delay: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            processing_delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    in_flight: AtomicUsize,
    completed: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time view of the pool's bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub workers: usize,
    pub pending: usize,
    pub in_flight: usize,
    pub submitted: u64,
    pub completed: u64,
    pub failed: u64,
}

/// Single worker loop
struct Worker<R, H> {
    worker_id: usize,
    receiver: async_channel::Receiver<ScoringJob>,
    runner: Arc<R>,
    handler: Arc<H>,
    counters: Arc<Counters>,
    processing_delay: Duration,
}

impl<R: JobRunner, H: CompletionHandler> Worker<R, H> {
    async fn run(self) {
        debug!("Worker {} started", self.worker_id);

        while let Ok(job) = self.receiver.recv().await {
            self.counters.in_flight.fetch_add(1, Ordering::SeqCst);

            let payload = self.execute(job).await;
            let job_id = payload.job_id.clone();
            if payload.result.is_failed() {
                self.counters.failed.fetch_add(1, Ordering::SeqCst);
            }

            let notified = AssertUnwindSafe(self.handler.on_complete(payload))
                .catch_unwind()
                .await;
            if let Err(panic) = notified {
                error!(
                    worker = self.worker_id,
                    job_id = %job_id,
                    "Completion handler panicked: {}",
                    panic_message(panic.as_ref())
                );
            }

            self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.counters.completed.fetch_add(1, Ordering::SeqCst);
        }

        debug!("Worker {} stopped", self.worker_id);
    }

    async fn execute(&self, job: ScoringJob) -> CallbackPayload {
        let job_id = job.id.clone();
        info!(
            worker = self.worker_id,
            job_id = %job_id,
            "Start analyzing job. Candidates: {}",
            job.candidates.len()
        );

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let runner = self.runner.clone();
        let result = match tokio::task::spawn_blocking(move || runner.run(&job)).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                error!(job_id = %job_id, "Scoring job failed: {}", e);
                ScoreResult::failed()
            }
            Err(e) if e.is_panic() => {
                let panic = e.into_panic();
                error!(
                    job_id = %job_id,
                    "Scoring job panicked: {}",
                    panic_message(panic.as_ref())
                );
                ScoreResult::failed()
            }
            Err(e) => {
                error!(job_id = %job_id, "Scoring job was aborted: {}", e);
                ScoreResult::failed()
            }
        };

        CallbackPayload::new(job_id, result)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}

/// Bounded-concurrency executor for scoring jobs
///
/// At most `workers` jobs execute at once. Jobs are never dropped: every
/// submitted job reaches the completion handler exactly once, with a
/// rejected result if its runner failed or panicked. There is no ordering
/// guarantee between jobs once more than one worker is running.
///
/// Must be started inside a tokio runtime.
pub struct WorkerPool {
    sender: async_channel::Sender<ScoringJob>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    worker_count: usize,
    counters: Arc<Counters>,
}

impl WorkerPool {
    /// Spawn the workers and return a handle for submitting jobs
    pub fn start<R, H>(config: PoolConfig, runner: Arc<R>, handler: Arc<H>) -> Result<Self>
    where
        R: JobRunner,
        H: CompletionHandler,
    {
        if config.workers == 0 {
            return Err(Error::InvalidConfig(
                "worker pool needs at least one worker".to_string(),
            ));
        }

        let (sender, receiver) = async_channel::unbounded();
        let counters = Arc::new(Counters::default());

        let workers = (0..config.workers)
            .map(|worker_id| {
                let worker = Worker {
                    worker_id,
                    receiver: receiver.clone(),
                    runner: runner.clone(),
                    handler: handler.clone(),
                    counters: counters.clone(),
                    processing_delay: config.processing_delay,
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            "Worker pool started with {} workers (processing delay {:?})",
            config.workers, config.processing_delay
        );

        Ok(Self {
            sender,
            workers: Mutex::new(workers),
            worker_count: config.workers,
            counters,
        })
    }

    /// Queue a job. Returns immediately; fails only once the pool is shut down.
    pub fn submit(&self, job: ScoringJob) -> Result<()> {
        self.counters.submitted.fetch_add(1, Ordering::SeqCst);
        if self.sender.try_send(job).is_err() {
            self.counters.submitted.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::PoolClosed);
        }
        Ok(())
    }

    /// Jobs waiting for a free worker
    pub fn pending_jobs(&self) -> usize {
        self.sender.len()
    }

    pub fn jobs_completed(&self) -> u64 {
        self.counters.completed.load(Ordering::SeqCst)
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            workers: self.worker_count,
            pending: self.pending_jobs(),
            in_flight: self.counters.in_flight.load(Ordering::SeqCst),
            submitted: self.counters.submitted.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }

    /// Stop accepting jobs, let the workers drain the queue, and wait for them
    pub async fn shutdown(&self) {
        self.sender.close();
        let workers = std::mem::take(&mut *self.workers.lock());
        for handle in workers {
            if let Err(e) = handle.await {
                error!("Worker exited abnormally: {}", e);
            }
        }
        info!("Worker pool stopped after {} jobs", self.jobs_completed());
    }
}
