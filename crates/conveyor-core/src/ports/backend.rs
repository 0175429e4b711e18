//! Result backend port (interface).

use async_trait::async_trait;

use crate::domain::{Outcome, ResultRecord, TaskId, TaskState};
use crate::error::ConveyorError;

/// Key/value store of (state, outcome) per task id.
///
/// Contract:
/// - `store_result` makes the record visible to every subsequent reader
///   sharing the instance.
/// - Terminal-write-once: once an id holds a terminal state, further writes
///   for that id are silently ignored (fixed policy for this core).
/// - All methods are safe under concurrent calls from many workers and many
///   readers; callers never coordinate.
/// - Underlying I/O failures surface as [`ConveyorError::Backend`] and must
///   not corrupt previously stored records.
#[async_trait]
pub trait ResultBackend: Send + Sync {
    /// Record the latest known outcome for `id`.
    async fn store_result(
        &self,
        id: TaskId,
        value: Outcome,
        state: TaskState,
    ) -> Result<(), ConveyorError>;

    /// Current record for `id`. Unknown ids read as a synthetic PENDING
    /// record. Never blocks.
    async fn get_result(&self, id: TaskId) -> Result<ResultRecord, ConveyorError>;

    /// True iff `id` is present with a terminal state.
    async fn has_result(&self, id: TaskId) -> Result<bool, ConveyorError>;

    /// Remove the record; `get_result` reads PENDING again afterwards.
    async fn forget(&self, id: TaskId) -> Result<(), ConveyorError>;
}
