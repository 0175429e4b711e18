//! AppBuilder: construction and wiring of an [`App`].

use std::collections::HashMap;
use std::sync::Arc;

use super::config::AppConfig;
use super::core::{App, AppInner};
use crate::error::ConveyorError;
use crate::impls::{InMemoryBackend, InMemoryBroker};
use crate::ports::{Broker, ResultBackend};
use crate::task::{Task, TaskFn};

/// Builder for [`App`].
///
/// Registration happens here, before the app exists; once `build()` returns,
/// the registry is immutable and lock-free to read (same build-then-freeze
/// split the handler registry uses everywhere else in this codebase).
///
/// Broker and backend default to the in-memory implementations when the
/// caller supplies none.
pub struct AppBuilder {
    registry: HashMap<String, Arc<Task>>,
    broker: Option<Arc<dyn Broker>>,
    backend: Option<Arc<dyn ResultBackend>>,
    config: AppConfig,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            registry: HashMap::new(),
            broker: None,
            backend: None,
            config: AppConfig::default(),
        }
    }

    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub fn broker(mut self, broker: Arc<dyn Broker>) -> Self {
        self.broker = Some(broker);
        self
    }

    pub fn backend(mut self, backend: Arc<dyn ResultBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Register a task under `name`.
    pub fn register(
        self,
        name: impl Into<String>,
        func: impl TaskFn + 'static,
    ) -> Result<Self, ConveyorError> {
        self.register_task(name, false, Arc::new(func))
    }

    /// Register a task whose body receives a reference to its own [`Task`]
    /// as an implicit first argument.
    pub fn register_bound(
        self,
        name: impl Into<String>,
        func: impl TaskFn + 'static,
    ) -> Result<Self, ConveyorError> {
        self.register_task(name, true, Arc::new(func))
    }

    fn register_task(
        mut self,
        name: impl Into<String>,
        bind: bool,
        func: Arc<dyn TaskFn>,
    ) -> Result<Self, ConveyorError> {
        let name = name.into();
        if self.registry.contains_key(&name) {
            return Err(ConveyorError::DuplicateTask(name));
        }
        self.registry
            .insert(name.clone(), Arc::new(Task::new(name, bind, func)));
        Ok(self)
    }

    pub fn build(self) -> App {
        let broker = self
            .broker
            .unwrap_or_else(|| Arc::new(InMemoryBroker::new()));
        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(InMemoryBackend::new()));
        App::from_inner(AppInner {
            registry: self.registry,
            broker,
            backend,
            config: self.config,
        })
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}
