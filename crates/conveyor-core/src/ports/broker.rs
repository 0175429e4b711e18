//! Broker port (interface).

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::Message;
use crate::error::ConveyorError;

/// Ordered transport carrying pending task invocations from producers to
/// workers.
///
/// Contract:
/// - FIFO: messages are delivered in publish order.
/// - At-most-once: a consumed message is gone, even if the consumer dies
///   before completing the task. No redelivery.
/// - `consume` blocks on a condition, never busy-spins.
///
/// Any transport (in-process queue, external message bus) can stand behind
/// this trait; the core never depends on a concrete one.
#[async_trait]
pub trait Broker: Send + Sync {
    /// Enqueue a message. Whether the queue is bounded is up to the
    /// implementation and must be documented there.
    async fn publish(&self, message: Message) -> Result<(), ConveyorError>;

    /// Remove and return the oldest unconsumed message.
    ///
    /// - `Some(d)`: block up to `d` (`Duration::ZERO` returns immediately
    ///   when empty).
    /// - `None`: block until a message arrives.
    async fn consume(&self, timeout: Option<Duration>) -> Result<Option<Message>, ConveyorError>;
}
