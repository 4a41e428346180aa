//! Error types for the worker pool

/// Result type for worker pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the worker pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Pool was already started (or started and stopped)
    #[error("BUG: worker pool '{pool_name}' already started")]
    AlreadyStarted {
        /// Name of the pool
        pool_name: String,
    },

    /// Pool was never started
    #[error("BUG: worker pool '{pool_name}' wasn't started")]
    NotStarted {
        /// Name of the pool
        pool_name: String,
    },

    /// Pool has been stopped and admits no more work
    #[error("Worker pool '{pool_name}' is stopped")]
    Stopped {
        /// Name of the pool
        pool_name: String,
    },

    /// Failed to spawn a worker thread
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    SpawnError {
        /// ID the worker would have had
        worker_id: u64,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Configuration could not be parsed
    #[error("Failed to parse pool configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Job execution failed
    #[error("Job execution failed ({job_type}): {message}")]
    ExecutionError {
        /// Type name of the failed job
        job_type: String,
        /// Error message
        message: String,
    },

    /// General error
    #[error("{0}")]
    Other(String),
}

impl PoolError {
    /// Create an already started error
    pub fn already_started(pool_name: impl Into<String>) -> Self {
        PoolError::AlreadyStarted {
            pool_name: pool_name.into(),
        }
    }

    /// Create a not started error
    pub fn not_started(pool_name: impl Into<String>) -> Self {
        PoolError::NotStarted {
            pool_name: pool_name.into(),
        }
    }

    /// Create a stopped error
    pub fn stopped(pool_name: impl Into<String>) -> Self {
        PoolError::Stopped {
            pool_name: pool_name.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: u64,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(job_type: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::ExecutionError {
            job_type: job_type.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PoolError::Other(msg.into())
    }
}
