//! In-memory result backend implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::{Outcome, ResultRecord, TaskId, TaskState};
use crate::error::ConveyorError;
use crate::ports::ResultBackend;

/// HashMap-backed result store.
///
/// Records are inserted/overwritten whole under one lock, so interleaved
/// `store_result`/`get_result` calls never observe a half-written record.
///
/// Terminal-write-once: a write against an id already holding a terminal
/// state is silently ignored (the existing record wins). This is the fixed
/// policy of this core; the revoke path relies on it.
#[derive(Default)]
pub struct InMemoryBackend {
    records: Mutex<HashMap<TaskId, ResultRecord>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultBackend for InMemoryBackend {
    async fn store_result(
        &self,
        id: TaskId,
        value: Outcome,
        state: TaskState,
    ) -> Result<(), ConveyorError> {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.get(&id)
            && existing.is_terminal()
        {
            debug!(%id, from = ?existing.state, to = ?state, "ignoring write to terminal record");
            return Ok(());
        }
        records.insert(id, ResultRecord::new(id, state, value));
        Ok(())
    }

    async fn get_result(&self, id: TaskId) -> Result<ResultRecord, ConveyorError> {
        let records = self.records.lock().await;
        Ok(records
            .get(&id)
            .cloned()
            .unwrap_or_else(|| ResultRecord::pending(id)))
    }

    async fn has_result(&self, id: TaskId) -> Result<bool, ConveyorError> {
        let records = self.records.lock().await;
        Ok(records.get(&id).is_some_and(|r| r.is_terminal()))
    }

    async fn forget(&self, id: TaskId) -> Result<(), ConveyorError> {
        let mut records = self.records.lock().await;
        records.remove(&id);
        Ok(())
    }
}
