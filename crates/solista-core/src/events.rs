//! Multi-subscriber event fan-out over crossbeam channels.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

/// Broadcasts cloned events to every live subscriber.
///
/// Subscribers whose receiver has been dropped are pruned on the next emit.
pub struct Broadcast<T: Clone + Send> {
    subscribers: Mutex<Vec<Sender<T>>>,
}

impl<T: Clone + Send> Broadcast<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn emit(&self, event: T) {
        self.subscribers
            .lock()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

impl<T: Clone + Send> Default for Broadcast<T> {
    fn default() -> Self {
        Self::new()
    }
}
