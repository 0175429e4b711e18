use thiserror::Error;

use crate::domain::TaskId;

/// Errors surfaced by the queue core.
///
/// Worker-side task failures never appear here directly: the worker converts
/// them to FAILURE records, and `AsyncResult::get` resurfaces them as
/// [`ConveyorError::TaskFailed`].
#[derive(Debug, Error)]
pub enum ConveyorError {
    #[error("task not registered: {0}")]
    TaskNotRegistered(String),

    #[error("duplicate task name: {0}")]
    DuplicateTask(String),

    #[error("task {id} failed: {reason}")]
    TaskFailed { id: TaskId, reason: String },

    #[error("task {0} was revoked")]
    Revoked(TaskId),

    /// `AsyncResult::get` exceeded its deadline. Distinct from a task-level
    /// failure and never recorded in the backend.
    #[error("timed out waiting for task result")]
    Timeout,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("broker error: {0}")]
    Broker(String),
}
