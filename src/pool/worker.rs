//! Worker thread implementation

use crate::core::{BoxedJob, PoolError, Result, Task};
use crate::pool::stats::JobOutcome;
use crate::pool::worker_pool::Shared;
use crossbeam_channel::{Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::{span, Level};

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of jobs processed
    pub jobs_processed: AtomicU64,
    /// Total number of jobs that failed
    pub jobs_failed: AtomicU64,
    /// Total number of jobs that panicked
    pub jobs_panicked: AtomicU64,
    /// Total time spent processing jobs (microseconds)
    pub total_processing_time_us: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, outcome: JobOutcome, microseconds: u64) {
        let counter = match outcome {
            JobOutcome::Completed => &self.jobs_processed,
            JobOutcome::Failed => &self.jobs_failed,
            JobOutcome::Panicked => &self.jobs_panicked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_us
            .fetch_add(microseconds, Ordering::Relaxed);
    }

    /// Get total jobs processed
    pub fn get_jobs_processed(&self) -> u64 {
        self.jobs_processed.load(Ordering::Relaxed)
    }

    /// Get total jobs failed
    pub fn get_jobs_failed(&self) -> u64 {
        self.jobs_failed.load(Ordering::Relaxed)
    }

    /// Get total jobs panicked
    pub fn get_jobs_panicked(&self) -> u64 {
        self.jobs_panicked.load(Ordering::Relaxed)
    }

    /// Get average processing time per job in microseconds
    pub fn get_average_processing_time_us(&self) -> f64 {
        let total = self.total_processing_time_us.load(Ordering::Relaxed);
        let count = self.get_jobs_processed() + self.get_jobs_failed() + self.get_jobs_panicked();
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }
}

/// Controller-side reference to a live worker
///
/// This is what the idle list stores. Sending on `sender` never blocks for
/// long: a worker is only reachable through its handle while its loop is
/// parked on the receiving end.
#[derive(Clone, Debug)]
pub(crate) struct WorkerHandle {
    id: u64,
    sender: Sender<Task>,
    pub(crate) last_used: Instant,
}

impl WorkerHandle {
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Hand a job to the worker
    pub(crate) fn dispatch(&self, job: BoxedJob) -> Result<()> {
        self.sender
            .send(Task::Execute(job))
            .map_err(|_| PoolError::other(format!("worker #{} is gone", self.id)))
    }

    /// Ask the worker loop to exit
    pub(crate) fn terminate(&self) {
        if self.sender.send(Task::Terminate).is_err() {
            log::trace!("worker #{} already exited", self.id);
        }
    }
}

/// A pooled worker thread
///
/// The thread loops on its single-slot channel: `Execute` runs the job and
/// releases the worker back to the pool, `Terminate` (or a refused release)
/// ends the loop.
pub(crate) struct Worker {
    handle: WorkerHandle,
    receiver: Receiver<Task>,
    stats: Arc<WorkerStats>,
    shared: Arc<Shared>,
}

impl Worker {
    /// Create the worker thread and return its handle
    pub(crate) fn spawn(shared: &Arc<Shared>, id: u64) -> Result<WorkerHandle> {
        let (sender, receiver) = crossbeam_channel::bounded(1);
        let handle = WorkerHandle {
            id,
            sender,
            last_used: Instant::now(),
        };
        let stats = Arc::new(WorkerStats::new());

        let worker = Worker {
            handle: handle.clone(),
            receiver,
            stats: Arc::clone(&stats),
            shared: Arc::clone(shared),
        };

        thread::Builder::new()
            .name(format!("{}-{}", shared.config.thread_name_prefix, id))
            .spawn(move || worker.run())
            .map_err(|e| PoolError::spawn_with_source(id, "Cannot create worker thread", e))?;

        shared.stats.record_worker_created(id, &stats);
        log::debug!("worker #{} created", id);
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_worker_created(id);

        Ok(handle)
    }

    fn run(self) {
        let id = self.handle.id;

        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        while let Ok(task) = self.receiver.recv() {
            let job = match task {
                Task::Execute(job) => job,
                Task::Terminate => break,
            };

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_busy(id);

            self.execute_job(job);

            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_worker_idle(id);

            if !self.shared.release(self.handle.clone()) {
                break;
            }
        }

        log::debug!(
            "worker #{} exiting after {} jobs",
            id,
            self.stats.get_jobs_processed()
        );
        self.shared.worker_exited(id);
    }

    /// Execute a single job with panic protection
    ///
    /// The job is consumed inside `catch_unwind` so a panicking `Drop` is
    /// contained along with a panicking `execute`.
    fn execute_job(&self, mut job: BoxedJob) {
        let id = self.handle.id;
        let job_type = job.job_type().to_string();

        #[cfg(feature = "tracing")]
        let job_span = span!(Level::DEBUG, "job_execution", job_type = job_type.as_str());
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        let start = Instant::now();
        let panic_result = catch_unwind(AssertUnwindSafe(move || {
            let result = job.execute();
            drop(job);
            result
        }));
        let elapsed = start.elapsed();

        let outcome = match panic_result {
            Ok(Ok(())) => JobOutcome::Completed,
            Ok(Err(e)) => {
                log::warn!("worker #{}: job {} failed: {}", id, job_type, e);
                JobOutcome::Failed
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                log::error!("worker #{}: job {} panicked: {}", id, job_type, panic_msg);
                JobOutcome::Panicked
            }
        };

        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_completion(elapsed, outcome);

        self.stats.record(outcome, elapsed.as_micros() as u64);
        self.shared.stats.record_job(outcome, elapsed);
    }
}
