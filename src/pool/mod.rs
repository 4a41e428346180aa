//! Worker pool, worker threads and their configuration

pub mod config;
pub mod stats;
pub mod worker;
pub mod worker_pool;

pub use config::PoolConfig;
pub use stats::{JobOutcome, PoolStats, PoolStatsSnapshot};
pub use worker::WorkerStats;
pub use worker_pool::WorkerPool;
