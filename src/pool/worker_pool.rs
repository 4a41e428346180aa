//! Worker pool implementation
//!
//! The pool keeps at most `max_workers` worker threads alive. A submitted job
//! goes to the most recently released idle worker, or to a freshly created
//! one while the pool is below its bound. Idle workers are kept in an
//! [`IdleList`] ordered by release time, and a background reaper evicts the
//! ones that have been idle for longer than `max_idle_duration`.

use crate::core::{BoxedJob, ClosureJob, IdleList, Job, PoolError, Result};
use crate::pool::config::PoolConfig;
use crate::pool::stats::{PoolStats, PoolStatsSnapshot};
use crate::pool::worker::{Worker, WorkerHandle};
use crate::tracing::TracedJob;
use crossbeam_channel::{RecvTimeoutError, Sender};
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// State guarded by the pool lock
pub(crate) struct PoolState {
    pub(crate) idle: IdleList<WorkerHandle>,
    /// Idle plus busy workers
    pub(crate) worker_count: usize,
    pub(crate) must_stop: bool,
}

/// Controller shared by the pool handle, the workers and the reaper
pub(crate) struct Shared {
    pub(crate) config: PoolConfig,
    pub(crate) state: Mutex<PoolState>,
    /// Signalled whenever a worker is released or exits
    capacity: Condvar,
    pub(crate) stats: PoolStats,
    next_worker_id: AtomicU64,
}

impl Shared {
    pub(crate) fn new(config: PoolConfig) -> Self {
        Self {
            config,
            state: Mutex::new(PoolState {
                idle: IdleList::new(),
                worker_count: 0,
                must_stop: false,
            }),
            capacity: Condvar::new(),
            stats: PoolStats::new(),
            next_worker_id: AtomicU64::new(0),
        }
    }

    /// Reuse an idle worker or create one; `None` at capacity or when stopped
    fn get_worker(self: &Arc<Self>) -> Option<WorkerHandle> {
        let mut state = self.state.lock();
        if state.must_stop {
            return None;
        }
        if let Some(handle) = state.idle.pop_back() {
            return Some(handle);
        }
        if state.worker_count >= self.config.max_workers {
            return None;
        }
        state.worker_count += 1;
        drop(state);

        match self.create_worker() {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        }
    }

    /// Like [`get_worker`](Self::get_worker) but waits for capacity
    fn wait_worker(self: &Arc<Self>) -> Result<WorkerHandle> {
        let mut state = self.state.lock();
        loop {
            if state.must_stop {
                return Err(PoolError::stopped(&self.config.thread_name_prefix));
            }
            if let Some(handle) = state.idle.pop_back() {
                return Ok(handle);
            }
            if state.worker_count < self.config.max_workers {
                break;
            }
            self.capacity.wait(&mut state);
        }
        state.worker_count += 1;
        drop(state);

        self.create_worker()
    }

    /// Start a worker thread for a slot already counted in `worker_count`
    fn create_worker(self: &Arc<Self>) -> Result<WorkerHandle> {
        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        Worker::spawn(self, id).map_err(|e| {
            self.state.lock().worker_count -= 1;
            self.capacity.notify_one();
            e
        })
    }

    /// Return a worker to the idle list; `false` tells it to exit
    pub(crate) fn release(&self, mut handle: WorkerHandle) -> bool {
        handle.last_used = Instant::now();

        let mut state = self.state.lock();
        if state.must_stop {
            return false;
        }
        log::trace!("worker #{} released", handle.id());
        state.idle.push_back(handle);
        drop(state);

        self.capacity.notify_one();
        true
    }

    /// Bookkeeping for a worker whose loop has ended
    pub(crate) fn worker_exited(&self, id: u64) {
        self.stats.record_worker_terminated(id);
        self.state.lock().worker_count -= 1;
        self.capacity.notify_one();
    }

    /// Evict workers idle for at least `max_idle_duration`
    ///
    /// Returns the number of workers told to exit.
    pub(crate) fn clean(&self) -> usize {
        let now = Instant::now();
        let max_idle = self.config.max_idle_duration;

        let evicted = {
            let mut state = self.state.lock();
            let keep = state
                .idle
                .iter()
                .find(|(_, handle)| now.saturating_duration_since(handle.last_used) < max_idle)
                .map(|(entry, _)| entry);
            state.idle.reset_front(keep)
        };

        if evicted.is_empty() {
            return 0;
        }

        log::debug!("reaping {} idle workers", evicted.len());
        self.stats.record_reaped(evicted.len());
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_workers_reaped(evicted.len());

        for handle in &evicted {
            handle.terminate();
        }
        evicted.len()
    }

    /// Refuse further releases and tell every idle worker to exit
    pub(crate) fn shutdown(&self) -> usize {
        let evicted = {
            let mut state = self.state.lock();
            state.must_stop = true;
            state.idle.reset_front(None)
        };
        self.capacity.notify_all();

        for handle in &evicted {
            handle.terminate();
        }
        evicted.len()
    }

    pub(crate) fn idle_count(&self) -> usize {
        self.state.lock().idle.len()
    }

    pub(crate) fn snapshot(&self) -> PoolStatsSnapshot {
        let (worker_count, idle_count) = {
            let state = self.state.lock();
            (state.worker_count, state.idle.len())
        };
        self.stats
            .snapshot(worker_count, idle_count, self.config.max_workers)
    }
}

enum Lifecycle {
    Created,
    Running {
        stop_reaper: Sender<()>,
        reaper: thread::JoinHandle<()>,
    },
    Stopped,
}

/// A bounded pool of reusable worker threads
///
/// # Admission
///
/// [`spawn`](WorkerPool::spawn) never waits for capacity: it returns `false`
/// when every worker is busy and the pool is at `max_workers`.
/// [`wait_spawn`](WorkerPool::wait_spawn) blocks until a worker is released or
/// exits instead.
///
/// # Lifecycle
///
/// [`start`](WorkerPool::start) launches the idle reaper and must be called
/// once. [`stop`](WorkerPool::stop) tells idle workers to exit and makes busy
/// workers exit once their current job finishes; it does not wait for them.
/// Misusing either is a bug and panics; [`try_start`](WorkerPool::try_start)
/// and [`try_stop`](WorkerPool::try_stop) report it as an error instead.
///
/// # Example
///
/// ```rust
/// use recycle_pool::prelude::*;
/// use std::time::Duration;
///
/// # fn main() -> Result<()> {
/// let pool = WorkerPool::new(4, Duration::from_secs(10))?;
/// pool.start();
///
/// if !pool.spawn(|| Ok(())) {
///     println!("pool is saturated");
/// }
/// pool.wait_spawn(|| Ok(()))?;
///
/// pool.stop();
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.shared.config)
            .field("running", &self.is_running())
            .field("worker_count", &self.worker_count())
            .field("idle_count", &self.idle_count())
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool of at most `max_workers` workers, reaping workers idle
    /// for `max_idle_duration`
    pub fn new(max_workers: usize, max_idle_duration: Duration) -> Result<Self> {
        Self::with_config(PoolConfig::new(max_workers, max_idle_duration))
    }

    /// Create a pool with custom configuration
    pub fn with_config(config: PoolConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            shared: Arc::new(Shared::new(config)),
            lifecycle: Mutex::new(Lifecycle::Created),
        })
    }

    /// Start the idle reaper
    ///
    /// # Panics
    ///
    /// Panics if the pool was already started, or if the reaper thread
    /// cannot be created.
    pub fn start(&self) {
        if let Err(e) = self.try_start() {
            panic!("{}", e);
        }
    }

    /// Start the idle reaper, reporting misuse as an error
    pub fn try_start(&self) -> Result<()> {
        let mut lifecycle = self.lifecycle.lock();
        if !matches!(*lifecycle, Lifecycle::Created) {
            return Err(PoolError::already_started(
                &self.shared.config.thread_name_prefix,
            ));
        }

        let (stop_reaper, stopped) = crossbeam_channel::bounded::<()>(0);
        let shared = Arc::clone(&self.shared);
        let period = shared.config.max_idle_duration;

        let reaper = thread::Builder::new()
            .name(format!("{}-reaper", shared.config.thread_name_prefix))
            .spawn(move || {
                log::debug!("idle reaper started, period {:?}", period);
                loop {
                    shared.clean();
                    match stopped.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        _ => break,
                    }
                }
                log::debug!("idle reaper stopped");
            })
            .map_err(|e| PoolError::other(format!("Cannot create reaper thread: {}", e)))?;

        *lifecycle = Lifecycle::Running {
            stop_reaper,
            reaper,
        };

        log::info!(
            "worker pool '{}' started (max {} workers, idle timeout {:?})",
            self.shared.config.thread_name_prefix,
            self.shared.config.max_workers,
            period
        );
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_start(self.shared.config.max_workers);

        Ok(())
    }

    /// Stop the pool
    ///
    /// Idle workers exit immediately; busy workers exit after their current
    /// job. Further submissions are refused.
    ///
    /// # Panics
    ///
    /// Panics if the pool is not running.
    pub fn stop(&self) {
        if let Err(e) = self.try_stop() {
            panic!("{}", e);
        }
    }

    /// Stop the pool, reporting misuse as an error
    pub fn try_stop(&self) -> Result<()> {
        let (stop_reaper, reaper) = {
            let mut lifecycle = self.lifecycle.lock();
            match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
                Lifecycle::Running {
                    stop_reaper,
                    reaper,
                } => (stop_reaper, reaper),
                other => {
                    *lifecycle = other;
                    return Err(PoolError::not_started(
                        &self.shared.config.thread_name_prefix,
                    ));
                }
            }
        };

        // Disconnecting the channel wakes the reaper out of its sleep
        drop(stop_reaper);
        if reaper.join().is_err() {
            log::error!("idle reaper panicked");
        }

        let evicted = self.shared.shutdown();

        let snapshot = self.shared.snapshot();
        log::info!(
            "worker pool '{}' stopped: {} idle workers dismissed, {} workers still live, {} jobs processed",
            self.shared.config.thread_name_prefix,
            evicted,
            snapshot.worker_count,
            snapshot.jobs_processed()
        );
        #[cfg(feature = "tracing")]
        crate::tracing::metrics::record_pool_stop(snapshot.jobs_processed(), snapshot.jobs_failed);

        Ok(())
    }

    /// Run `f` on a pooled worker without waiting for capacity
    ///
    /// Returns `false` if the pool is at capacity with no idle worker, or
    /// has been stopped.
    pub fn spawn<F>(&self, f: F) -> bool
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.spawn_job(ClosureJob::new(f))
    }

    /// Run a job on a pooled worker without waiting for capacity
    pub fn spawn_job<J: Job + 'static>(&self, job: J) -> bool {
        self.spawn_boxed(Box::new(job))
    }

    /// Like [`spawn_job`](WorkerPool::spawn_job), entering the submitter's
    /// current tracing span while the job runs
    pub fn spawn_traced<J: Job + 'static>(&self, job: J) -> bool {
        self.spawn_job(TracedJob::new(job))
    }

    fn spawn_boxed(&self, job: BoxedJob) -> bool {
        let Some(worker) = self.shared.get_worker() else {
            self.shared.stats.record_rejected();
            log::trace!("admission rejected: pool at capacity or stopped");
            #[cfg(feature = "tracing")]
            crate::tracing::metrics::record_admission_rejected();
            return false;
        };

        match worker.dispatch(job) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{}", e);
                false
            }
        }
    }

    /// Run `f` on a pooled worker, blocking until one is available
    ///
    /// While the pool is live this only fails if a thread cannot be created.
    /// Once [`stop`](WorkerPool::stop) has been called no job is admitted any
    /// more: instead of handing `f` to a worker that would never release, the
    /// call returns `PoolError::Stopped`, and callers already blocked here are
    /// woken with the same error.
    ///
    /// # Errors
    ///
    /// - `PoolError::Stopped` - the pool was stopped before or while waiting
    /// - `PoolError::SpawnError` - a new worker thread could not be created
    pub fn wait_spawn<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.wait_spawn_job(ClosureJob::new(f))
    }

    /// Run a job on a pooled worker, blocking until one is available
    pub fn wait_spawn_job<J: Job + 'static>(&self, job: J) -> Result<()> {
        let worker = self.shared.wait_worker()?;
        worker.dispatch(Box::new(job))
    }

    /// Check if the reaper is running
    pub fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock(), Lifecycle::Running { .. })
    }

    /// Configured upper bound on workers
    pub fn max_workers(&self) -> usize {
        self.shared.config.max_workers
    }

    /// Pool configuration
    pub fn config(&self) -> &PoolConfig {
        &self.shared.config
    }

    /// Idle plus busy workers
    pub fn worker_count(&self) -> usize {
        self.shared.state.lock().worker_count
    }

    /// Workers waiting in the idle list
    pub fn idle_count(&self) -> usize {
        self.shared.idle_count()
    }

    /// Snapshot of pool statistics
    pub fn stats(&self) -> PoolStatsSnapshot {
        self.shared.snapshot()
    }

    /// Statistics of currently live workers, keyed by worker id
    #[cfg(feature = "metrics")]
    pub fn worker_stats(&self) -> Vec<(u64, Arc<crate::pool::WorkerStats>)> {
        self.shared.stats.worker_stats()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        match self.lifecycle.get_mut() {
            Lifecycle::Running { .. } => {
                if let Err(e) = self.try_stop() {
                    log::error!("failed to stop worker pool on drop: {}", e);
                }
            }
            // Workers may exist without a reaper if jobs were submitted before start
            Lifecycle::Created => {
                self.shared.shutdown();
            }
            Lifecycle::Stopped => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn wait_until(cond: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        cond()
    }

    /// Occupies a worker until the returned sender is dropped or sent to
    fn blocking_job(pool: &WorkerPool) -> Sender<()> {
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let (started_tx, started_rx) = crossbeam_channel::bounded::<()>(1);
        assert!(pool.spawn(move || {
            started_tx.send(()).unwrap();
            let _ = done_rx.recv();
            Ok(())
        }));
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("blocking job should start");
        done_tx
    }

    #[test]
    fn test_pool_creation() {
        let pool = WorkerPool::new(4, Duration::from_secs(1)).expect("Failed to create pool");
        assert_eq!(pool.max_workers(), 4);
        assert_eq!(pool.worker_count(), 0);
        assert!(!pool.is_running());
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            WorkerPool::new(0, Duration::from_secs(1)),
            Err(PoolError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_spawn_executes_job() {
        let pool = WorkerPool::new(2, Duration::from_secs(10)).expect("Failed to create pool");
        pool.start();

        let (tx, rx) = crossbeam_channel::bounded(1);
        assert!(pool.spawn(move || {
            tx.send(42).unwrap();
            Ok(())
        }));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 42);

        pool.stop();
    }

    #[test]
    fn test_idle_worker_is_reused() {
        let pool = WorkerPool::new(4, Duration::from_secs(10)).expect("Failed to create pool");
        pool.start();

        for _ in 0..5 {
            let (tx, rx) = crossbeam_channel::bounded(1);
            assert!(pool.spawn(move || {
                tx.send(()).unwrap();
                Ok(())
            }));
            rx.recv_timeout(Duration::from_secs(5)).unwrap();
            assert!(wait_until(|| pool.idle_count() == 1));
        }

        assert_eq!(pool.worker_count(), 1);
        assert_eq!(pool.stats().workers_created, 1);
        pool.stop();
    }

    #[test]
    fn test_reuse_is_lifo() {
        let pool = WorkerPool::new(2, Duration::from_secs(10)).expect("Failed to create pool");
        pool.start();

        // Two busy workers, released in order first then second
        let first = blocking_job(&pool);
        let second = blocking_job(&pool);
        first.send(()).unwrap();
        assert!(wait_until(|| pool.idle_count() == 1));
        second.send(()).unwrap();
        assert!(wait_until(|| pool.idle_count() == 2));

        let newest = {
            let state = pool.shared.state.lock();
            let back = state.idle.back().unwrap();
            state.idle.get(back).unwrap().id()
        };

        let (tx, rx) = crossbeam_channel::bounded(1);
        assert!(pool.spawn(move || {
            tx.send(thread::current().name().map(str::to_string)).unwrap();
            Ok(())
        }));
        let name = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(name, Some(format!("pool-worker-{}", newest)));

        pool.stop();
    }

    #[test]
    fn test_spawn_rejects_at_capacity() {
        let pool = WorkerPool::new(1, Duration::from_secs(10)).expect("Failed to create pool");
        pool.start();

        let done = blocking_job(&pool);
        assert!(!pool.spawn(|| Ok(())));
        assert_eq!(pool.worker_count(), 1);
        assert_eq!(pool.stats().workers_created, 1);
        assert_eq!(pool.stats().admissions_rejected, 1);

        drop(done);
        assert!(wait_until(|| pool.idle_count() == 1));
        assert!(pool.spawn(|| Ok(())));

        pool.stop();
    }

    #[test]
    fn test_wait_spawn_blocks_until_release() {
        let pool = Arc::new(WorkerPool::new(1, Duration::from_secs(10)).expect("Failed to create pool"));
        pool.start();

        let done = blocking_job(&pool);
        let ran = Arc::new(AtomicUsize::new(0));

        let waiter = {
            let pool = Arc::clone(&pool);
            let ran = Arc::clone(&ran);
            thread::spawn(move || {
                pool.wait_spawn(move || {
                    ran.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(!waiter.is_finished());

        drop(done);
        waiter.join().unwrap().expect("wait_spawn should succeed");
        assert!(wait_until(|| ran.load(Ordering::SeqCst) == 1));
        assert_eq!(pool.stats().workers_created, 1);

        pool.stop();
    }

    #[test]
    fn test_clean_evicts_only_stale_prefix() {
        let pool = WorkerPool::new(3, Duration::from_millis(100)).expect("Failed to create pool");

        let a = blocking_job(&pool);
        let b = blocking_job(&pool);
        let c = blocking_job(&pool);
        a.send(()).unwrap();
        b.send(()).unwrap();
        assert!(wait_until(|| pool.idle_count() == 2));

        thread::sleep(Duration::from_millis(150));
        c.send(()).unwrap();
        assert!(wait_until(|| pool.idle_count() == 3));

        assert_eq!(pool.shared.clean(), 2);
        assert_eq!(pool.idle_count(), 1);
        assert!(wait_until(|| pool.worker_count() == 1));
        assert_eq!(pool.stats().workers_reaped, 2);
    }

    #[test]
    fn test_clean_with_fresh_workers_is_noop() {
        let pool = WorkerPool::new(2, Duration::from_secs(60)).expect("Failed to create pool");
        assert!(pool.spawn(|| Ok(())));
        assert!(wait_until(|| pool.idle_count() == 1));

        assert_eq!(pool.shared.clean(), 0);
        assert_eq!(pool.idle_count(), 1);
    }

    #[test]
    fn test_reaper_evicts_idle_worker() {
        let pool = WorkerPool::new(1, Duration::from_millis(50)).expect("Failed to create pool");
        pool.start();

        assert!(pool.spawn(|| Ok(())));
        assert!(wait_until(|| pool.idle_count() == 1));

        thread::sleep(Duration::from_millis(100));
        assert!(wait_until(|| pool.worker_count() == 0));
        assert_eq!(pool.idle_count(), 0);

        pool.stop();
    }

    #[test]
    #[should_panic(expected = "already started")]
    fn test_double_start_panics() {
        let pool = WorkerPool::new(1, Duration::from_secs(1)).expect("Failed to create pool");
        pool.start();
        pool.start();
    }

    #[test]
    #[should_panic(expected = "wasn't started")]
    fn test_stop_without_start_panics() {
        let pool = WorkerPool::new(1, Duration::from_secs(1)).expect("Failed to create pool");
        pool.stop();
    }

    #[test]
    fn test_try_lifecycle_errors() {
        let pool = WorkerPool::new(1, Duration::from_secs(1)).expect("Failed to create pool");
        assert!(matches!(pool.try_stop(), Err(PoolError::NotStarted { .. })));

        pool.try_start().expect("first start succeeds");
        assert!(pool.is_running());
        assert!(matches!(pool.try_start(), Err(PoolError::AlreadyStarted { .. })));

        pool.try_stop().expect("first stop succeeds");
        assert!(!pool.is_running());
        assert!(matches!(pool.try_stop(), Err(PoolError::NotStarted { .. })));
        assert!(matches!(pool.try_start(), Err(PoolError::AlreadyStarted { .. })));
    }

    #[test]
    fn test_stop_dismisses_idle_workers() {
        let pool = WorkerPool::new(3, Duration::from_secs(60)).expect("Failed to create pool");
        pool.start();

        let jobs: Vec<_> = (0..3).map(|_| blocking_job(&pool)).collect();
        drop(jobs);
        assert!(wait_until(|| pool.idle_count() == 3));

        pool.stop();
        assert_eq!(pool.idle_count(), 0);
        assert!(wait_until(|| pool.worker_count() == 0));
    }

    #[test]
    fn test_busy_worker_exits_after_stop() {
        let pool = WorkerPool::new(2, Duration::from_secs(60)).expect("Failed to create pool");
        pool.start();

        let done = blocking_job(&pool);
        pool.stop();
        assert_eq!(pool.worker_count(), 1);

        drop(done);
        assert!(wait_until(|| pool.worker_count() == 0));
        assert_eq!(pool.idle_count(), 0);
        assert_eq!(pool.stats().jobs_completed, 1);
    }

    #[test]
    fn test_admission_refused_after_stop() {
        let pool = WorkerPool::new(2, Duration::from_secs(60)).expect("Failed to create pool");
        pool.start();
        pool.stop();

        assert!(!pool.spawn(|| Ok(())));
        assert!(matches!(
            pool.wait_spawn(|| Ok(())),
            Err(PoolError::Stopped { .. })
        ));
        assert_eq!(pool.worker_count(), 0);
    }

    #[test]
    fn test_stop_wakes_blocked_waiter() {
        let pool = Arc::new(WorkerPool::new(1, Duration::from_secs(60)).expect("Failed to create pool"));
        pool.start();
        let done = blocking_job(&pool);

        let waiter = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.wait_spawn(|| Ok(())))
        };
        thread::sleep(Duration::from_millis(50));

        pool.stop();
        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(PoolError::Stopped { .. })));
        drop(done);
    }

    #[test]
    fn test_drop_without_start_dismisses_workers() {
        let pool = WorkerPool::new(1, Duration::from_secs(60)).expect("Failed to create pool");
        assert!(pool.spawn(|| Ok(())));
        assert!(wait_until(|| pool.idle_count() == 1));

        let shared = Arc::clone(&pool.shared);
        drop(pool);
        assert!(wait_until(|| shared.state.lock().worker_count == 0));
    }

    #[test]
    fn test_drop_running_pool_stops_it() {
        let pool = WorkerPool::new(2, Duration::from_secs(60)).expect("Failed to create pool");
        pool.start();
        assert!(pool.spawn(|| Ok(())));
        assert!(wait_until(|| pool.idle_count() == 1));

        let shared = Arc::clone(&pool.shared);
        drop(pool);
        assert!(shared.state.lock().must_stop);
        assert!(wait_until(|| shared.state.lock().worker_count == 0));
    }

    #[test]
    fn test_drop_after_stop_leaves_pool_untouched() {
        let pool = WorkerPool::new(1, Duration::from_secs(60)).expect("Failed to create pool");
        pool.start();
        assert!(pool.spawn(|| Ok(())));
        assert!(wait_until(|| pool.idle_count() == 1));

        pool.stop();
        assert!(wait_until(|| pool.worker_count() == 0));
        let before = pool.stats();

        let shared = Arc::clone(&pool.shared);
        drop(pool);
        let after = shared.snapshot();
        assert_eq!(after.workers_terminated, before.workers_terminated);
        assert_eq!(after.workers_reaped, before.workers_reaped);
        assert_eq!(after.worker_count, 0);
        assert_eq!(after.idle_count, 0);
    }
}
