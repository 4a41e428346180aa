//! Core types for the worker pool

pub mod error;
pub mod idle_list;
pub mod job;

pub use error::{PoolError, Result};
pub use idle_list::{EntryId, IdleList};
pub use job::{BoxedJob, ClosureJob, Job};
pub(crate) use job::Task;
