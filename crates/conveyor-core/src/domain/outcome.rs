//! Outcome: the value slot of a result record.
//!
//! A task finishes with either a return value or a failure detail; records
//! written before execution (STARTED, REVOKED) carry neither. Keeping the
//! three cases in one sum type means the backend never stores a half-written
//! pair of (state, value).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Return value or failure detail of a task invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum Outcome {
    /// No payload (STARTED / REVOKED markers, synthetic PENDING reads).
    None,

    /// Successful return value.
    Value(Value),

    /// Stringified failure detail.
    Error(String),
}

impl Outcome {
    pub fn value(v: impl Into<Value>) -> Self {
        Outcome::Value(v.into())
    }

    pub fn error(reason: impl Into<String>) -> Self {
        Outcome::Error(reason.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    /// The successful value, if this outcome holds one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    /// The failure detail, if this outcome holds one.
    pub fn as_error(&self) -> Option<&str> {
        match self {
            Outcome::Error(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_is_tagged_enum() {
        let o = Outcome::value(json!({"sum": 5}));
        let v: Value = serde_json::to_value(&o).unwrap();
        assert_eq!(v["kind"], "Value");
        assert_eq!(v["value"]["sum"], 5);
    }

    #[test]
    fn error_accessors() {
        let o = Outcome::error("boom");
        assert!(o.is_error());
        assert_eq!(o.as_error(), Some("boom"));
        assert!(o.as_value().is_none());
    }
}
