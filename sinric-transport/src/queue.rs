//! Unbounded FIFO of serialized messages.

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// A FIFO of JSON strings shared between one producer side and one consumer.
///
/// Consumers wait on [`pop`](Self::pop), which parks on a [`Notify`] rather
/// than polling. `push_front` puts a message back at the head so a failed send
/// is retried before anything queued after it.
#[derive(Debug, Default)]
pub struct MessageQueue {
    items: Mutex<VecDeque<String>>,
    available: Notify,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, message: String) {
        self.items.lock().push_back(message);
        self.available.notify_one();
    }

    pub fn push_front(&self, message: String) {
        self.items.lock().push_front(message);
        self.available.notify_one();
    }

    pub fn try_pop(&self) -> Option<String> {
        self.items.lock().pop_front()
    }

    /// Wait until a message is available and take it.
    pub async fn pop(&self) -> String {
        loop {
            if let Some(message) = self.try_pop() {
                return message;
            }
            self.available.notified().await;
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }

    /// Drop every queued message, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut items = self.items.lock();
        let dropped = items.len();
        items.clear();
        dropped
    }
}
