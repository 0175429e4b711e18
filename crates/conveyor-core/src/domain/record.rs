//! Result record: the latest known outcome of a task id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Outcome, TaskId, TaskState};

/// State + outcome of a task id as stored by the backend.
///
/// Owned exclusively by the backend. Exactly one writer (a worker, or the
/// app itself in eager mode) produces records for a given id; readers only
/// ever see whole records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: TaskId,
    pub state: TaskState,
    pub value: Outcome,
    pub recorded_at: DateTime<Utc>,
}

impl ResultRecord {
    /// Build a record stamped with the current time.
    pub fn new(id: TaskId, state: TaskState, value: Outcome) -> Self {
        Self {
            id,
            state,
            value,
            recorded_at: Utc::now(),
        }
    }

    /// Synthetic record for an id the backend has never seen.
    pub fn pending(id: TaskId) -> Self {
        Self::new(id, TaskState::Pending, Outcome::None)
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pending_record_has_no_value() {
        let rec = ResultRecord::pending(TaskId::new());
        assert_eq!(rec.state, TaskState::Pending);
        assert_eq!(rec.value, Outcome::None);
        assert!(!rec.is_terminal());
    }

    #[test]
    fn success_record_is_terminal() {
        let rec = ResultRecord::new(TaskId::new(), TaskState::Success, Outcome::value(json!(5)));
        assert!(rec.is_terminal());
        assert_eq!(rec.value.as_value(), Some(&json!(5)));
    }
}
