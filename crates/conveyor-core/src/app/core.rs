//! App: task registry + broker + backend + config.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::config::AppConfig;
use crate::domain::{Kwargs, Message, Outcome, TaskId, TaskState};
use crate::error::ConveyorError;
use crate::ports::{Broker, ResultBackend};
use crate::result::AsyncResult;
use crate::task::Task;

pub(crate) struct AppInner {
    pub(crate) registry: HashMap<String, Arc<Task>>,
    pub(crate) broker: Arc<dyn Broker>,
    pub(crate) backend: Arc<dyn ResultBackend>,
    pub(crate) config: AppConfig,
}

/// Handle to one logical application instance.
///
/// Cheap to clone; every clone shares the same registry, broker, and
/// backend. Built once at startup via [`super::AppBuilder`], immutable
/// afterwards — dependency injection instead of a process-wide singleton.
#[derive(Clone)]
pub struct App {
    inner: Arc<AppInner>,
}

impl App {
    pub(crate) fn from_inner(inner: AppInner) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn broker(&self) -> &Arc<dyn Broker> {
        &self.inner.broker
    }

    pub fn backend(&self) -> &Arc<dyn ResultBackend> {
        &self.inner.backend
    }

    /// Look up a registered task by name.
    pub fn task(&self, name: &str) -> Option<TaskHandle> {
        self.inner.registry.get(name).map(|task| TaskHandle {
            app: self.clone(),
            task: Arc::clone(task),
        })
    }

    /// Registered task names (stable output for logs and demos).
    pub fn task_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.registry.keys().cloned().collect();
        names.sort();
        names
    }

    /// Submit by name, for callers that only hold a string.
    pub async fn send_task(
        &self,
        name: &str,
        args: Vec<Value>,
        kwargs: Kwargs,
    ) -> Result<AsyncResult, ConveyorError> {
        let handle = self
            .task(name)
            .ok_or_else(|| ConveyorError::TaskNotRegistered(name.to_string()))?;
        handle.apply_async(args, kwargs, ApplyOptions::default()).await
    }

    /// Re-create a result handle for any id. Many handles may exist for the
    /// same id; all read through the same backend.
    pub fn async_result(&self, id: TaskId) -> AsyncResult {
        AsyncResult::new(id, Arc::clone(&self.inner.backend))
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("tasks", &self.inner.registry.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

/// Submission options for [`TaskHandle::apply_async`].
#[derive(Debug, Default)]
pub struct ApplyOptions {
    /// Use a caller-supplied id instead of minting a fresh one.
    pub task_id: Option<TaskId>,
}

/// A registered task plus the app it belongs to: the submission surface.
#[derive(Clone)]
pub struct TaskHandle {
    app: App,
    task: Arc<Task>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        self.task.name()
    }

    /// Sugar for `apply_async(args, {}, default)`.
    pub async fn delay(&self, args: Vec<Value>) -> Result<AsyncResult, ConveyorError> {
        self.apply_async(args, Kwargs::new(), ApplyOptions::default())
            .await
    }

    /// Submit one invocation.
    ///
    /// Eager mode executes the body here on the caller's task, converts the
    /// outcome to a terminal record, and hands back an already-settled
    /// result; a body error becomes a FAILURE record, it never propagates
    /// out of this call. Otherwise the message goes to the broker and the
    /// returned handle starts out PENDING with no backend write.
    pub async fn apply_async(
        &self,
        args: Vec<Value>,
        kwargs: Kwargs,
        options: ApplyOptions,
    ) -> Result<AsyncResult, ConveyorError> {
        let id = options.task_id.unwrap_or_default();

        if self.app.config().task_always_eager {
            let (value, state) = match self.task.call(&args, &kwargs).await {
                Ok(v) => (Outcome::Value(v), TaskState::Success),
                Err(e) => (Outcome::Error(e), TaskState::Failure),
            };
            debug!(%id, task = self.task.name(), state = ?state, "eager execution finished");
            self.app.backend().store_result(id, value, state).await?;
            return Ok(self.app.async_result(id));
        }

        let message = Message::new(id, self.task.name(), args, kwargs);
        self.app.broker().publish(message).await?;
        debug!(%id, task = self.task.name(), "published");
        Ok(self.app.async_result(id))
    }

    /// Invoke the body directly, without id or state bookkeeping.
    pub async fn call(&self, args: &[Value], kwargs: &Kwargs) -> Result<Value, String> {
        self.task.call(args, kwargs).await
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("name", &self.task.name())
            .finish()
    }
}
