//! FIFO hand-off queue between execution contexts.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::time::Duration;
use voxscribe_foundation::BusError;

/// A FIFO channel shared by all holders of a clone.
///
/// Multi-producer/multi-consumer capable, used single-producer/
/// single-consumer in this system. Unbounded by default; a bounded queue
/// makes `push` block until space is available.
pub struct HandoffQueue<T> {
    name: Arc<str>,
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Clone for HandoffQueue<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> HandoffQueue<T> {
    pub fn unbounded(name: impl Into<Arc<str>>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            name: name.into(),
            tx,
            rx,
        }
    }

    pub fn bounded(name: impl Into<Arc<str>>, capacity: usize) -> Self {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        Self {
            name: name.into(),
            tx,
            rx,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue an item. On a bounded queue this blocks until space is
    /// available. Fails only when every other endpoint has been dropped.
    pub fn push(&self, item: T) -> Result<(), BusError> {
        self.tx.send(item).map_err(|_| BusError::QueueDisconnected {
            name: self.name.to_string(),
        })
    }

    /// Dequeue with a bounded wait. Returns `None` on timeout so a poll
    /// loop can check its stop signal between attempts.
    pub fn pop(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Zero-timeout dequeue for drains that must not block a UI context.
    pub fn try_pop(&self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn push_pop_preserves_order() {
        let queue = HandoffQueue::unbounded("test");
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();
        assert_eq!(queue.pop(Duration::from_millis(10)), Some(1));
        assert_eq!(queue.pop(Duration::from_millis(10)), Some(2));
        assert_eq!(queue.pop(Duration::from_millis(10)), Some(3));
    }

    #[test]
    fn pop_times_out_on_empty_queue() {
        let queue: HandoffQueue<u32> = HandoffQueue::unbounded("test");
        let start = Instant::now();
        assert_eq!(queue.pop(Duration::from_millis(50)), None);
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn try_pop_never_blocks() {
        let queue: HandoffQueue<u32> = HandoffQueue::unbounded("test");
        assert_eq!(queue.try_pop(), None);
        queue.push(7).unwrap();
        assert_eq!(queue.try_pop(), Some(7));
    }

    #[test]
    fn bounded_push_blocks_until_space_is_freed() {
        let queue = HandoffQueue::bounded("test", 1);
        queue.push(1).unwrap();

        let producer = queue.clone();
        let handle = std::thread::spawn(move || {
            let start = Instant::now();
            producer.push(2).unwrap();
            start.elapsed()
        });

        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(queue.pop(Duration::from_millis(10)), Some(1));

        let blocked_for = handle.join().unwrap();
        assert!(blocked_for >= Duration::from_millis(100));
        assert_eq!(queue.pop(Duration::from_millis(100)), Some(2));
    }

    #[test]
    fn clones_share_the_same_channel() {
        let queue = HandoffQueue::unbounded("test");
        let other = queue.clone();
        queue.push("item").unwrap();
        assert_eq!(other.pop(Duration::from_millis(10)), Some("item"));
    }
}
