//! Pool-wide statistics.
//!
//! [`PoolStats`] keeps lock-free counters updated by workers, the reaper and
//! the admission path. [`PoolStatsSnapshot`] is a serializable point-in-time
//! copy returned by [`WorkerPool::stats`](crate::pool::WorkerPool::stats).

use crate::pool::worker::WorkerStats;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "metrics")]
use dashmap::DashMap;

/// How a job finished
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// Returned `Ok(())`
    Completed,
    /// Returned an error
    Failed,
    /// Panicked
    Panicked,
}

/// Counters shared by every part of the pool
#[derive(Debug, Default)]
pub struct PoolStats {
    workers_created: AtomicU64,
    workers_reaped: AtomicU64,
    workers_terminated: AtomicU64,
    jobs_completed: AtomicU64,
    jobs_failed: AtomicU64,
    jobs_panicked: AtomicU64,
    admissions_rejected: AtomicU64,
    total_processing_time_us: AtomicU64,
    #[cfg(feature = "metrics")]
    workers: DashMap<u64, Arc<WorkerStats>>,
}

impl PoolStats {
    /// Create zeroed statistics
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    pub(crate) fn record_worker_created(&self, worker_id: u64, stats: &Arc<WorkerStats>) {
        self.workers_created.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        self.workers.insert(worker_id, Arc::clone(stats));
    }

    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    pub(crate) fn record_worker_terminated(&self, worker_id: u64) {
        self.workers_terminated.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        self.workers.remove(&worker_id);
    }

    pub(crate) fn record_reaped(&self, count: usize) {
        self.workers_reaped.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_rejected(&self) {
        self.admissions_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_job(&self, outcome: JobOutcome, elapsed: Duration) {
        let counter = match outcome {
            JobOutcome::Completed => &self.jobs_completed,
            JobOutcome::Failed => &self.jobs_failed,
            JobOutcome::Panicked => &self.jobs_panicked,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_processing_time_us
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    /// Total workers ever created
    pub fn workers_created(&self) -> u64 {
        self.workers_created.load(Ordering::Relaxed)
    }

    /// Workers evicted by the idle reaper
    pub fn workers_reaped(&self) -> u64 {
        self.workers_reaped.load(Ordering::Relaxed)
    }

    /// Workers whose loop has exited
    pub fn workers_terminated(&self) -> u64 {
        self.workers_terminated.load(Ordering::Relaxed)
    }

    /// Statistics of currently live workers, keyed by worker id
    #[cfg(feature = "metrics")]
    pub fn worker_stats(&self) -> Vec<(u64, Arc<WorkerStats>)> {
        let mut stats: Vec<_> = self
            .workers
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect();
        stats.sort_by_key(|(id, _)| *id);
        stats
    }

    pub(crate) fn snapshot(
        &self,
        worker_count: usize,
        idle_count: usize,
        max_workers: usize,
    ) -> PoolStatsSnapshot {
        PoolStatsSnapshot {
            taken_at: Utc::now(),
            worker_count,
            idle_count,
            max_workers,
            workers_created: self.workers_created(),
            workers_reaped: self.workers_reaped(),
            workers_terminated: self.workers_terminated(),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
            jobs_panicked: self.jobs_panicked.load(Ordering::Relaxed),
            admissions_rejected: self.admissions_rejected.load(Ordering::Relaxed),
            total_processing_time_us: self.total_processing_time_us.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time view of a pool
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolStatsSnapshot {
    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,
    /// Idle plus busy workers
    pub worker_count: usize,
    /// Workers waiting in the idle list
    pub idle_count: usize,
    /// Configured upper bound
    pub max_workers: usize,
    /// Total workers ever created
    pub workers_created: u64,
    /// Workers evicted by the reaper
    pub workers_reaped: u64,
    /// Workers whose loop has exited
    pub workers_terminated: u64,
    /// Jobs that returned `Ok(())`
    pub jobs_completed: u64,
    /// Jobs that returned an error
    pub jobs_failed: u64,
    /// Jobs that panicked
    pub jobs_panicked: u64,
    /// `spawn` calls turned away at capacity
    pub admissions_rejected: u64,
    /// Time spent inside jobs (microseconds)
    pub total_processing_time_us: u64,
}

impl PoolStatsSnapshot {
    /// Workers currently running a job
    pub fn busy_count(&self) -> usize {
        self.worker_count.saturating_sub(self.idle_count)
    }

    /// Jobs that finished in any way
    pub fn jobs_processed(&self) -> u64 {
        self.jobs_completed + self.jobs_failed + self.jobs_panicked
    }

    /// Average time per processed job in microseconds
    pub fn average_processing_time_us(&self) -> f64 {
        let processed = self.jobs_processed();
        if processed > 0 {
            self.total_processing_time_us as f64 / processed as f64
        } else {
            0.0
        }
    }
}
