//! Message: the unit the broker carries between producers and workers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::TaskId;

/// Keyword arguments of a task invocation.
pub type Kwargs = serde_json::Map<String, Value>;

/// A pending task invocation.
///
/// Owned by the broker between publish and consume; ownership transfers to
/// the worker on consume. In this minimal model a consumed message is never
/// redelivered (at-most-once).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: TaskId,
    name: String,
    args: Vec<Value>,
    kwargs: Kwargs,
    submitted_at: DateTime<Utc>,
}

impl Message {
    /// Build a message stamped with the current time.
    pub fn new(id: TaskId, name: impl Into<String>, args: Vec<Value>, kwargs: Kwargs) -> Self {
        Self {
            id,
            name: name.into(),
            args,
            kwargs,
            submitted_at: Utc::now(),
        }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Registered name of the task this message invokes.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }

    pub fn kwargs(&self) -> &Kwargs {
        &self.kwargs
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_roundtrips_through_json() {
        let mut kwargs = Kwargs::new();
        kwargs.insert("unit".to_string(), json!("ms"));
        let msg = Message::new(TaskId::new(), "demo.add", vec![json!(2), json!(3)], kwargs);

        let s = serde_json::to_string(&msg).unwrap();
        let back: Message = serde_json::from_str(&s).unwrap();

        assert_eq!(back.id(), msg.id());
        assert_eq!(back.name(), "demo.add");
        assert_eq!(back.args(), &[json!(2), json!(3)]);
        assert_eq!(back.kwargs()["unit"], json!("ms"));
        assert_eq!(back.submitted_at(), msg.submitted_at());
    }
}
