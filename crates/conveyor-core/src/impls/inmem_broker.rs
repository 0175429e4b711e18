//! In-memory broker implementation.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::domain::Message;
use crate::error::ConveyorError;
use crate::ports::Broker;

/// In-process FIFO broker.
///
/// The queue is **unbounded**: `publish` appends and returns, it never
/// blocks. Consumers park on a [`Notify`] instead of spinning; every publish
/// wakes one waiter.
///
/// Safe for many producers and many consumers sharing one instance; the
/// internal lock guarantees a message is handed to exactly one consumer.
#[derive(Default)]
pub struct InMemoryBroker {
    queue: Mutex<VecDeque<Message>>,
    notify: Notify,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of unconsumed messages (observability hook).
    pub async fn len(&self) -> usize {
        self.queue.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.queue.lock().await.is_empty()
    }
}

#[async_trait]
impl Broker for InMemoryBroker {
    async fn publish(&self, message: Message) -> Result<(), ConveyorError> {
        {
            let mut queue = self.queue.lock().await;
            queue.push_back(message);
        }
        // Wake outside the lock so the consumer can pop immediately.
        self.notify.notify_one();
        Ok(())
    }

    async fn consume(&self, timeout: Option<Duration>) -> Result<Option<Message>, ConveyorError> {
        let deadline = timeout.map(|d| Instant::now() + d);

        loop {
            {
                let mut queue = self.queue.lock().await;
                if let Some(message) = queue.pop_front() {
                    return Ok(Some(message));
                }
            }

            // Empty queue: wait for a publish, bounded by the deadline.
            // `notify_one` stores a permit when nobody is parked yet, so a
            // publish landing between the pop attempt and this wait is not
            // lost.
            match deadline {
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        return Ok(None);
                    }
                    tokio::select! {
                        _ = self.notify.notified() => {}
                        _ = tokio::time::sleep_until(deadline) => return Ok(None),
                    }
                }
                None => self.notify.notified().await,
            }
        }
    }
}
