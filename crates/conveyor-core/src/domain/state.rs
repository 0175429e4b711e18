//! Task state machine.

use serde::{Deserialize, Serialize};

/// Execution state of a task invocation.
///
/// State transitions:
/// - Pending -> Started -> Success | Failure | Retry
/// - Retry -> Started (re-entry)
/// - Pending -> Revoked (cancellation before execution)
/// - Started -> Revoked (cooperative only, no preemption)
///
/// `Pending` is the state of an id with no recorded outcome yet: absence in
/// the backend reads as `Pending`. Once a terminal state is reached no
/// further transition is accepted.
///
/// Serialized as SCREAMING_SNAKE_CASE to match the wire names:
/// PENDING / STARTED / SUCCESS / FAILURE / RETRY / REVOKED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// No outcome recorded yet (also the synthetic state for unknown ids).
    Pending,

    /// A worker picked the message up and is about to execute it.
    Started,

    /// Completed with a return value.
    Success,

    /// The task body reported an error, or the message named an unknown task.
    Failure,

    /// Informational: a worker is about to re-execute.
    Retry,

    /// Cancelled before (or cooperatively during) execution.
    Revoked,
}

impl TaskState {
    /// Is this a terminal state (no further transitions)?
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TaskState::Success | TaskState::Failure | TaskState::Revoked
        )
    }

    /// Would moving to `next` be a legal transition?
    ///
    /// The backend enforces the terminal gate from this table; the
    /// intermediate rows document the protocol workers follow.
    pub fn can_transition_to(self, next: TaskState) -> bool {
        use TaskState::*;
        match self {
            Pending => matches!(next, Started | Success | Failure | Retry | Revoked),
            Started => matches!(next, Success | Failure | Retry | Revoked),
            Retry => matches!(next, Started | Success | Failure | Revoked),
            Success | Failure | Revoked => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::success(TaskState::Success)]
    #[case::failure(TaskState::Failure)]
    #[case::revoked(TaskState::Revoked)]
    fn terminal_states_accept_nothing(#[case] terminal: TaskState) {
        assert!(terminal.is_terminal());
        for next in [
            TaskState::Pending,
            TaskState::Started,
            TaskState::Success,
            TaskState::Failure,
            TaskState::Retry,
            TaskState::Revoked,
        ] {
            assert!(!terminal.can_transition_to(next));
        }
    }

    #[rstest]
    #[case::pending(TaskState::Pending)]
    #[case::started(TaskState::Started)]
    #[case::retry(TaskState::Retry)]
    fn intermediate_states_are_not_terminal(#[case] state: TaskState) {
        assert!(!state.is_terminal());
    }

    #[test]
    fn pending_can_be_revoked_before_execution() {
        assert!(TaskState::Pending.can_transition_to(TaskState::Revoked));
    }

    #[test]
    fn retry_reenters_started() {
        assert!(TaskState::Retry.can_transition_to(TaskState::Started));
        assert!(!TaskState::Retry.can_transition_to(TaskState::Retry));
    }

    #[test]
    fn states_serialize_as_wire_names() {
        let s = serde_json::to_string(&TaskState::Pending).unwrap();
        assert_eq!(s, "\"PENDING\"");
        let s = serde_json::to_string(&TaskState::Success).unwrap();
        assert_eq!(s, "\"SUCCESS\"");
        let s = serde_json::to_string(&TaskState::Revoked).unwrap();
        assert_eq!(s, "\"REVOKED\"");
    }
}
