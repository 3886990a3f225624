// src/queue.rs
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::notify::NotificationPayload;

/// Producer side of the in-process notification queue: unbounded FIFO,
/// multi-producer. `enqueue` never blocks (bounded only by process memory).
#[derive(Clone)]
pub struct NotificationQueue {
    tx: UnboundedSender<NotificationPayload>,
}

/// Consumer side. `recv` suspends until an item is available and returns items
/// in arrival order, exactly once each.
pub struct NotificationStream {
    rx: UnboundedReceiver<NotificationPayload>,
}

/// Build the queue pair. One sender (cloneable) feeds one consumer.
pub fn channel() -> (NotificationQueue, NotificationStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NotificationQueue { tx }, NotificationStream { rx })
}

impl NotificationQueue {
    pub fn enqueue(&self, payload: NotificationPayload) {
        // Send only fails if the consumer is gone; the worker runs for the
        // process lifetime, so log and move on rather than propagate.
        if self.tx.send(payload).is_err() {
            tracing::warn!("notification queue consumer is gone, payload discarded");
        }
    }
}

impl NotificationStream {
    pub async fn recv(&mut self) -> Option<NotificationPayload> {
        self.rx.recv().await
    }
}
