//! Publish/subscribe for store snapshots.
//!
//! Each subscriber gets its own unbounded crossbeam channel. A publish sends
//! the same `Arc<StoreSnapshot>` to every live receiver; senders whose
//! receiver was dropped are pruned on the way.

use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};

use crate::snapshot::StoreSnapshot;

#[derive(Default)]
pub struct SnapshotPublisher {
    subscribers: Vec<Sender<Arc<StoreSnapshot>>>,
}

impl SnapshotPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. `initial`, when given, is delivered immediately.
    pub fn subscribe(&mut self, initial: Option<Arc<StoreSnapshot>>) -> Receiver<Arc<StoreSnapshot>> {
        let (tx, rx) = channel::unbounded();
        if let Some(snapshot) = initial {
            // Cannot fail: the receiver is still in hand.
            let _ = tx.send(snapshot);
        }
        self.subscribers.push(tx);
        tracing::debug!(subscribers = self.subscribers.len(), "Subscriber added");
        rx
    }

    /// Deliver to every live subscriber. Returns how many received it.
    pub fn publish(&mut self, snapshot: Arc<StoreSnapshot>) -> usize {
        let before = self.subscribers.len();
        self.subscribers
            .retain(|tx| tx.send(Arc::clone(&snapshot)).is_ok());
        let pruned = before - self.subscribers.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Disconnected subscribers pruned");
        }
        self.subscribers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every sender so receivers observe disconnection.
    pub fn close(&mut self) {
        self.subscribers.clear();
    }
}
