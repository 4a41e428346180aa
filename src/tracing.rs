//! Tracing integration for observability.
//!
//! This module provides structured events and span propagation when the
//! `tracing` feature is enabled. Without the feature, [`TracedJob`] is a
//! transparent wrapper.
//!
//! # Example
//!
//! ```rust,ignore
//! use recycle_pool::prelude::*;
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env()
//!         .add_directive("recycle_pool=debug".parse().unwrap()))
//!     .init();
//!
//! let pool = WorkerPool::new(4, Duration::from_secs(10))?;
//! pool.start();
//!
//! // The job runs inside the span that was current at submission
//! pool.spawn_traced(MyJob::new());
//! ```

use crate::core::{Job, Result};

/// A job wrapper that propagates tracing context across thread boundaries.
///
/// The current tracing span is captured when the wrapper is created and
/// entered when the job executes on a pooled worker.
pub struct TracedJob<J: Job> {
    inner: J,
    #[cfg(feature = "tracing")]
    span: tracing::Span,
}

impl<J: Job> TracedJob<J> {
    /// Creates a new TracedJob wrapping the given job.
    pub fn new(job: J) -> Self {
        Self {
            inner: job,
            #[cfg(feature = "tracing")]
            span: tracing::Span::current(),
        }
    }

    /// Creates a TracedJob with a specific span.
    #[cfg(feature = "tracing")]
    pub fn with_span(job: J, span: tracing::Span) -> Self {
        Self { inner: job, span }
    }
}

impl<J: Job> Job for TracedJob<J> {
    fn execute(&mut self) -> Result<()> {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.execute()
    }

    fn job_type(&self) -> &str {
        self.inner.job_type()
    }
}

/// Metrics recording functions for observability.
///
/// These functions emit tracing events that can be consumed by
/// metrics collection systems like Prometheus via tracing-opentelemetry.
#[cfg(feature = "tracing")]
pub mod metrics {
    use crate::pool::JobOutcome;
    use std::time::Duration;

    /// Records a new worker thread.
    #[inline]
    pub fn record_worker_created(worker_id: u64) {
        tracing::debug!(counter.workers_created = 1, worker_id, "worker created");
    }

    /// Records workers evicted by the idle reaper.
    #[inline]
    pub fn record_workers_reaped(count: usize) {
        tracing::debug!(counter.workers_reaped = count as u64, "idle workers reaped");
    }

    /// Records a `spawn` turned away at capacity.
    #[inline]
    pub fn record_admission_rejected() {
        tracing::trace!(counter.admissions_rejected = 1, "admission rejected");
    }

    /// Records job completion with timing.
    #[inline]
    pub fn record_completion(duration: Duration, outcome: JobOutcome) {
        let duration_ms = duration.as_millis() as u64;
        match outcome {
            JobOutcome::Completed => tracing::trace!(
                counter.jobs_completed = 1,
                histogram.job_duration_ms = duration_ms,
                "job completed successfully"
            ),
            JobOutcome::Failed => tracing::trace!(
                counter.jobs_failed = 1,
                histogram.job_duration_ms = duration_ms,
                "job failed"
            ),
            JobOutcome::Panicked => tracing::trace!(
                counter.jobs_panicked = 1,
                histogram.job_duration_ms = duration_ms,
                "job panicked"
            ),
        }
    }

    /// Records worker becoming busy.
    #[inline]
    pub fn record_worker_busy(worker_id: u64) {
        tracing::trace!(gauge.workers_busy = 1, worker_id, "worker busy");
    }

    /// Records worker becoming idle.
    #[inline]
    pub fn record_worker_idle(worker_id: u64) {
        tracing::trace!(gauge.workers_busy = -1i64, worker_id, "worker idle");
    }

    /// Records pool startup.
    #[inline]
    pub fn record_pool_start(max_workers: usize) {
        tracing::info!(max_workers, "worker pool started");
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_stop(jobs_processed: u64, jobs_failed: u64) {
        tracing::info!(jobs_processed, jobs_failed, "worker pool stopped");
    }
}
