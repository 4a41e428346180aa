//! Configuration for the worker pool

use crate::core::{PoolError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Workers allowed per available CPU when no explicit bound is given
const DEFAULT_WORKERS_PER_CPU: usize = 256;

/// Smallest idle duration the millisecond JSON encoding can represent
const MIN_IDLE_DURATION: Duration = Duration::from_millis(1);

/// Configuration for [`WorkerPool`](crate::pool::WorkerPool)
///
/// Deserializes from JSON with the idle duration given in milliseconds:
///
/// ```rust
/// use recycle_pool::pool::PoolConfig;
/// use std::time::Duration;
///
/// let config = PoolConfig::from_json(
///     r#"{ "max_workers": 8, "max_idle_duration_ms": 250 }"#,
/// ).unwrap();
///
/// assert_eq!(config.max_workers, 8);
/// assert_eq!(config.max_idle_duration, Duration::from_millis(250));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Upper bound on idle plus busy workers
    pub max_workers: usize,
    /// How long a worker may sit idle before the reaper evicts it.
    /// Also the period of the reaper loop.
    #[serde(rename = "max_idle_duration_ms", with = "duration_millis")]
    pub max_idle_duration: Duration,
    /// Worker thread name prefix
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        let cpus = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            max_workers: cpus * DEFAULT_WORKERS_PER_CPU,
            max_idle_duration: Duration::from_secs(10),
            thread_name_prefix: "pool-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Create a configuration bounded to `max_workers` workers that are
    /// reaped after `max_idle_duration` of idleness
    #[must_use]
    pub fn new(max_workers: usize, max_idle_duration: Duration) -> Self {
        Self {
            max_workers,
            max_idle_duration,
            ..Default::default()
        }
    }

    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the maximum number of workers
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the idle threshold and reaper period
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_idle_duration(mut self, duration: Duration) -> Self {
        self.max_idle_duration = duration;
        self
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_workers == 0 {
            return Err(PoolError::invalid_config(
                "max_workers",
                "Maximum number of workers must be greater than 0",
            ));
        }
        if self.max_idle_duration < MIN_IDLE_DURATION {
            return Err(PoolError::invalid_config(
                "max_idle_duration",
                "Idle duration must be at least 1ms",
            ));
        }
        Ok(())
    }
}

mod duration_millis {
    use serde::{ser, Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).map_err(|_| {
            <S::Error as ser::Error>::custom(format!(
                "{:?} does not fit in u64 milliseconds",
                duration
            ))
        })?;
        millis.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
