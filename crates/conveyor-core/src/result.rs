//! AsyncResult: client-side handle for a submitted task.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::time::Instant;

use crate::domain::{Outcome, TaskId, TaskState};
use crate::error::ConveyorError;
use crate::ports::ResultBackend;

/// How often `get` re-reads the backend. The backend is a plain store, not
/// an event source, so this one wait is poll-based.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Handle used to poll or block for a task's outcome.
///
/// Lightweight and re-creatable: it carries only the id and a backend
/// reference, no cached outcome. Any number of handles may exist for the
/// same id.
#[derive(Clone)]
pub struct AsyncResult {
    id: TaskId,
    backend: Arc<dyn ResultBackend>,
}

impl AsyncResult {
    pub(crate) fn new(id: TaskId, backend: Arc<dyn ResultBackend>) -> Self {
        Self { id, backend }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Block until a terminal state appears or `timeout` elapses.
    ///
    /// - SUCCESS returns the stored value.
    /// - FAILURE returns [`ConveyorError::TaskFailed`] with the captured
    ///   detail.
    /// - REVOKED returns [`ConveyorError::Revoked`].
    /// - An elapsed deadline (monotonic clock) returns
    ///   [`ConveyorError::Timeout`], which is never written to the backend.
    ///
    /// `None` waits indefinitely.
    pub async fn get(&self, timeout: Option<Duration>) -> Result<Value, ConveyorError> {
        let deadline = timeout.map(|d| Instant::now() + d);

        loop {
            let record = self.backend.get_result(self.id).await?;
            match record.state {
                TaskState::Success => {
                    return Ok(match record.value {
                        Outcome::Value(v) => v,
                        _ => Value::Null,
                    });
                }
                TaskState::Failure => {
                    let reason = record
                        .value
                        .as_error()
                        .unwrap_or("task failed")
                        .to_string();
                    return Err(ConveyorError::TaskFailed {
                        id: self.id,
                        reason,
                    });
                }
                TaskState::Revoked => return Err(ConveyorError::Revoked(self.id)),
                TaskState::Pending | TaskState::Started | TaskState::Retry => {}
            }

            match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(ConveyorError::Timeout);
                    }
                    tokio::time::sleep(POLL_INTERVAL.min(deadline - now)).await;
                }
                None => tokio::time::sleep(POLL_INTERVAL).await,
            }
        }
    }

    /// Current state, one non-blocking backend read.
    pub async fn state(&self) -> Result<TaskState, ConveyorError> {
        Ok(self.backend.get_result(self.id).await?.state)
    }

    /// True iff the task reached a terminal state.
    pub async fn ready(&self) -> Result<bool, ConveyorError> {
        self.backend.has_result(self.id).await
    }

    pub async fn successful(&self) -> Result<bool, ConveyorError> {
        Ok(self.state().await? == TaskState::Success)
    }

    pub async fn failed(&self) -> Result<bool, ConveyorError> {
        Ok(self.state().await? == TaskState::Failure)
    }

    /// Cancel before execution. Records REVOKED; a worker seeing that record
    /// skips the message. If the task already reached a terminal state the
    /// write is ignored by the backend and this is a no-op. There is no
    /// preemption of a body that is already running.
    pub async fn revoke(&self) -> Result<(), ConveyorError> {
        self.backend
            .store_result(self.id, Outcome::None, TaskState::Revoked)
            .await
    }

    /// Drop the stored record; the id reads as PENDING afterwards.
    pub async fn forget(&self) -> Result<(), ConveyorError> {
        self.backend.forget(self.id).await
    }
}

impl std::fmt::Debug for AsyncResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncResult").field("id", &self.id).finish()
    }
}
