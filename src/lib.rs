//! # Recycle Pool
//!
//! A bounded pool of reusable worker threads for short-lived jobs.
//!
//! ## Features
//!
//! - **Bounded**: never more than `max_workers` idle plus busy workers
//! - **Worker Reuse**: the most recently released worker takes the next job
//! - **Idle Reaping**: a background reaper dismisses workers idle too long
//! - **Two Admission Modes**: `spawn` rejects at capacity, `wait_spawn` blocks
//! - **Panic Isolation**: a panicking job is logged and counted; its worker lives on
//! - **Statistics**: pool-wide counters and per-worker stats (`metrics` feature)
//!
//! ## Quick Start
//!
//! ```rust
//! use recycle_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::new(16, Duration::from_secs(10))?;
//! pool.start();
//!
//! for i in 0..10 {
//!     pool.wait_spawn(move || {
//!         println!("Job {} executing", i);
//!         Ok(())
//!     })?;
//! }
//!
//! pool.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Rejecting at Capacity
//!
//! ```rust
//! use recycle_pool::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::new(1, Duration::from_secs(10))?;
//! pool.start();
//!
//! if !pool.spawn(|| Ok(())) {
//!     // Retry later, queue elsewhere or drop the work
//! }
//! # pool.stop();
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Jobs
//!
//! ```rust
//! use recycle_pool::prelude::*;
//! use std::time::Duration;
//!
//! struct MyJob {
//!     data: String,
//! }
//!
//! impl Job for MyJob {
//!     fn execute(&mut self) -> Result<()> {
//!         println!("Processing: {}", self.data);
//!         Ok(())
//!     }
//!
//!     fn job_type(&self) -> &str {
//!         "MyJob"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let config = PoolConfig::new(4, Duration::from_millis(500))
//!     .with_thread_name_prefix("my-worker");
//! let pool = WorkerPool::with_config(config)?;
//! pool.start();
//!
//! pool.wait_spawn_job(MyJob {
//!     data: "test".to_string(),
//! })?;
//! # pool.stop();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod tracing;

pub use crate::core::{BoxedJob, ClosureJob, EntryId, IdleList, Job, PoolError, Result};
pub use crate::pool::{PoolConfig, PoolStatsSnapshot, WorkerPool, WorkerStats};
