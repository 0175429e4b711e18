//! Task: a named, registered unit of work.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::Kwargs;

/// The callable behind a registered task.
///
/// `task` is `Some` iff the task was registered as bound, mirroring the
/// `bind=True` convention: the body gets a reference to its own [`Task`]
/// (name, metadata) as an implicit first argument.
///
/// Failures are reported as `Err(String)`: the worker and the eager path
/// convert them to FAILURE records, never let them escape.
#[async_trait]
pub trait TaskFn: Send + Sync {
    async fn call(
        &self,
        task: Option<&Task>,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> Result<Value, String>;
}

/// Adapter turning a plain synchronous closure into a [`TaskFn`].
///
/// Most task bodies are ordinary functions of (args, kwargs); this saves
/// them from writing an impl block.
pub struct FnTask<F>(F);

impl<F> FnTask<F>
where
    F: Fn(&[Value], &Kwargs) -> Result<Value, String> + Send + Sync + 'static,
{
    pub fn new(func: F) -> Self {
        Self(func)
    }
}

#[async_trait]
impl<F> TaskFn for FnTask<F>
where
    F: Fn(&[Value], &Kwargs) -> Result<Value, String> + Send + Sync + 'static,
{
    async fn call(
        &self,
        _task: Option<&Task>,
        args: &[Value],
        kwargs: &Kwargs,
    ) -> Result<Value, String> {
        (self.0)(args, kwargs)
    }
}

/// A named unit of work bound to an app.
///
/// Created at registration time, immutable thereafter, lives for the
/// lifetime of the app that owns it.
pub struct Task {
    name: String,
    bind: bool,
    func: Arc<dyn TaskFn>,
}

impl Task {
    pub(crate) fn new(name: impl Into<String>, bind: bool, func: Arc<dyn TaskFn>) -> Self {
        Self {
            name: name.into(),
            bind,
            func,
        }
    }

    /// Unique registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Does the body receive a reference to this task as its first argument?
    pub fn bind(&self) -> bool {
        self.bind
    }

    /// Invoke the body directly: synchronous from the caller's point of
    /// view, no id or state bookkeeping. The worker goes through here, and
    /// callers may too.
    pub async fn call(&self, args: &[Value], kwargs: &Kwargs) -> Result<Value, String> {
        let bound = self.bind.then_some(self);
        self.func.call(bound, args, kwargs).await
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("bind", &self.bind)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn add(args: &[Value], _kwargs: &Kwargs) -> Result<Value, String> {
        let a = args[0].as_i64().ok_or("args[0] must be an integer")?;
        let b = args[1].as_i64().ok_or("args[1] must be an integer")?;
        Ok(json!(a + b))
    }

    #[tokio::test]
    async fn direct_call_runs_the_body() {
        let task = Task::new("demo.add", false, Arc::new(FnTask::new(add)));
        let out = task.call(&[json!(2), json!(3)], &Kwargs::new()).await;
        assert_eq!(out.unwrap(), json!(5));
    }

    #[tokio::test]
    async fn body_errors_come_back_as_strings() {
        let task = Task::new("demo.add", false, Arc::new(FnTask::new(add)));
        let out = task.call(&[json!("x"), json!(3)], &Kwargs::new()).await;
        assert_eq!(out.unwrap_err(), "args[0] must be an integer");
    }

    struct WhoAmI;

    #[async_trait]
    impl TaskFn for WhoAmI {
        async fn call(
            &self,
            task: Option<&Task>,
            _args: &[Value],
            _kwargs: &Kwargs,
        ) -> Result<Value, String> {
            match task {
                Some(t) => Ok(json!(t.name())),
                None => Ok(json!(null)),
            }
        }
    }

    #[tokio::test]
    async fn bound_task_sees_itself() {
        let task = Task::new("demo.whoami", true, Arc::new(WhoAmI));
        let out = task.call(&[], &Kwargs::new()).await.unwrap();
        assert_eq!(out, json!("demo.whoami"));
    }

    #[tokio::test]
    async fn unbound_task_gets_no_self_reference() {
        let task = Task::new("demo.whoami", false, Arc::new(WhoAmI));
        let out = task.call(&[], &Kwargs::new()).await.unwrap();
        assert_eq!(out, json!(null));
    }
}
