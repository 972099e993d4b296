//! Task queue seam.
//!
//! Request handlers push opaque payloads; the single dispatch worker pops
//! them. Durability is the collaborator's concern behind this trait - the
//! bundled implementation is an in-process FIFO channel.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, mpsc};

/// Errors that can occur on queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    /// The queue is shut down; no more payloads will flow.
    #[error("task queue closed")]
    Closed,

    /// A payload could not be encoded for the wire.
    #[error("failed to encode task: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A durable FIFO of pending notification jobs.
///
/// `pop` awaits indefinitely until a payload is available - the only
/// sanctioned blocking wait in the system. Enqueue is fire-and-forget from
/// the caller's point of view; it never waits on the consumer.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a payload to the tail of the queue.
    async fn push(&self, payload: Vec<u8>) -> Result<(), QueueError>;

    /// Remove and return the payload at the head of the queue, waiting for
    /// one to arrive if the queue is empty.
    async fn pop(&self) -> Result<Vec<u8>, QueueError>;
}

/// In-process FIFO queue over an unbounded tokio channel.
///
/// Single-consumer by construction: the receiver sits behind a mutex and
/// only the dispatch worker ever pops.
pub struct MemoryQueue {
    tx: mpsc::UnboundedSender<Vec<u8>>,
    rx: Mutex<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl MemoryQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

impl Default for MemoryQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskQueue for MemoryQueue {
    async fn push(&self, payload: Vec<u8>) -> Result<(), QueueError> {
        self.tx.send(payload).map_err(|_| QueueError::Closed)
    }

    async fn pop(&self) -> Result<Vec<u8>, QueueError> {
        self.rx.lock().await.recv().await.ok_or(QueueError::Closed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fifo_order() {
        let queue = MemoryQueue::new();
        queue.push(b"first".to_vec()).await.unwrap();
        queue.push(b"second".to_vec()).await.unwrap();

        assert_eq!(queue.pop().await.unwrap(), b"first");
        assert_eq!(queue.pop().await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_pop_waits_for_push() {
        use std::sync::Arc;

        let queue = Arc::new(MemoryQueue::new());
        let consumer = {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move { queue.pop().await })
        };

        // Give the consumer a chance to park on the empty queue first.
        tokio::task::yield_now().await;
        queue.push(b"late".to_vec()).await.unwrap();

        assert_eq!(consumer.await.unwrap().unwrap(), b"late");
    }
}
