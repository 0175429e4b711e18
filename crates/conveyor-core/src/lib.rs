//! conveyor-core
//!
//! A minimal distributed task queue core: an app registers named tasks,
//! submission publishes messages to a broker, workers execute them and write
//! outcomes to a result backend, and callers poll or block on an
//! [`AsyncResult`] handle.
//!
//! # Module layout
//! - **domain**: ids, state machine, messages, outcomes, result records
//! - **ports**: the pluggable seams ([`ports::Broker`], [`ports::ResultBackend`])
//! - **impls**: in-memory broker/backend for development and testing
//! - **app**: registry, configuration, submission API
//! - **worker**: the consumer loop (start/stop lifecycle)
//! - **result**: the client-side [`AsyncResult`] handle
//!
//! # Delivery contract
//! FIFO, at-most-once: a consumed message is never redelivered, even if the
//! worker dies before completing it. Exactly-once delivery, durability, and
//! priority queues are out of scope.

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod result;
pub mod task;
pub mod worker;

pub use app::{App, AppBuilder, AppConfig, ApplyOptions, TaskHandle};
pub use domain::{Kwargs, Message, Outcome, ResultRecord, TaskId, TaskState};
pub use error::ConveyorError;
pub use impls::{InMemoryBackend, InMemoryBroker};
pub use ports::{Broker, ResultBackend};
pub use result::AsyncResult;
pub use task::{FnTask, Task, TaskFn};
pub use worker::{Worker, WorkerConfig};
