//! Job trait and the worker handoff message

use crate::core::error::{PoolError, Result};
use std::fmt;

/// A unit of work handed to a pooled worker
///
/// The pool never reports the outcome back to the submitter. A returned
/// error is logged and counted in the pool statistics.
pub trait Job: Send {
    /// Execute the job
    ///
    /// # Errors
    ///
    /// Returns an error if the job execution fails
    fn execute(&mut self) -> Result<()>;

    /// Get the job's type name for logging and statistics
    fn job_type(&self) -> &str {
        "Job"
    }
}

impl fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({})", self.job_type())
    }
}

/// A boxed job that can be sent across threads
pub type BoxedJob = Box<dyn Job>;

/// Helper to create a job from a closure
pub struct ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    closure: Option<F>,
    name: String,
}

impl<F> ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    /// Create a new closure job
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureJob".to_string(),
        }
    }

    /// Create a new closure job with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
        }
    }
}

impl<F> Job for ClosureJob<F>
where
    F: FnOnce() -> Result<()> + Send,
{
    fn execute(&mut self) -> Result<()> {
        match self.closure.take() {
            Some(closure) => closure(),
            None => Err(PoolError::execution(
                self.name.clone(),
                "closure already executed",
            )),
        }
    }

    fn job_type(&self) -> &str {
        &self.name
    }
}

/// Message delivered through a worker's handoff channel
pub(crate) enum Task {
    /// Run this job, then release the worker back to the pool
    Execute(BoxedJob),
    /// Leave the worker loop
    Terminate,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Execute(job) => write!(f, "Execute({})", job.job_type()),
            Task::Terminate => write!(f, "Terminate"),
        }
    }
}
