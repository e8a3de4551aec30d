//! Publish/subscribe registry plus named hand-off queues.

use crate::event::{AppEvent, EventKind};
use crate::queue::HandoffQueue;
use parking_lot::Mutex;
use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use voxscribe_foundation::BusError;

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

/// Token returned by `subscribe`, consumed by `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner {
    next_id: u64,
    subscribers: HashMap<EventKind, Vec<(SubscriptionId, Handler)>>,
    queues: HashMap<String, Box<dyn Any + Send + Sync>>,
}

/// Process-wide event bus.
///
/// Constructed once per application and handed to every component by `Arc`;
/// exactly-one-bus is a caller invariant, not a language-level singleton.
/// All registry mutation goes through a single lock. Dispatch runs on the
/// publisher's own thread against a snapshot of the registration list, so
/// the lock is never held across a handler call.
pub struct EventBus {
    inner: Mutex<Inner>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 1,
                subscribers: HashMap::new(),
                queues: HashMap::new(),
            }),
        }
    }

    /// Register a handler for every future publish of `kind`. Handlers for
    /// one kind are invoked in registration order.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F) -> SubscriptionId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock();
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner
            .subscribers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Remove a previously registered handler. Returns false when the
    /// subscription was already removed.
    pub fn unsubscribe(&self, kind: EventKind, id: SubscriptionId) -> bool {
        let mut inner = self.inner.lock();
        match inner.subscribers.get_mut(&kind) {
            Some(handlers) => {
                let before = handlers.len();
                handlers.retain(|(existing, _)| *existing != id);
                handlers.len() != before
            }
            None => false,
        }
    }

    /// Invoke every handler currently registered for the event's kind,
    /// synchronously, in registration order. A panicking handler is caught
    /// and logged; it neither stops the remaining handlers nor propagates
    /// to the publisher.
    pub fn publish(&self, event: AppEvent) {
        let handlers: Vec<(SubscriptionId, Handler)> = {
            let inner = self.inner.lock();
            inner
                .subscribers
                .get(&event.kind())
                .map(|handlers| handlers.to_vec())
                .unwrap_or_default()
        };

        for (id, handler) in handlers {
            if catch_unwind(AssertUnwindSafe(|| handler(&event))).is_err() {
                tracing::error!(
                    subscription = id.0,
                    kind = ?event.kind(),
                    "event handler panicked; continuing with remaining handlers"
                );
            }
        }
    }

    /// Create a named queue with payload type `T`, or return the existing
    /// one: creation is idempotent. Fails when the name is already taken by
    /// a queue with a different payload type.
    pub fn create_queue<T: Send + 'static>(
        &self,
        name: &str,
    ) -> Result<HandoffQueue<T>, BusError> {
        let mut inner = self.inner.lock();
        if let Some(existing) = inner.queues.get(name) {
            return existing
                .downcast_ref::<HandoffQueue<T>>()
                .cloned()
                .ok_or_else(|| BusError::QueueTypeMismatch {
                    name: name.to_string(),
                });
        }
        let queue = HandoffQueue::<T>::unbounded(name);
        inner
            .queues
            .insert(name.to_string(), Box::new(queue.clone()));
        Ok(queue)
    }

    /// Fetch an existing named queue.
    pub fn get_queue<T: Send + 'static>(&self, name: &str) -> Result<HandoffQueue<T>, BusError> {
        let inner = self.inner.lock();
        let entry = inner
            .queues
            .get(name)
            .ok_or_else(|| BusError::QueueNotFound {
                name: name.to_string(),
            })?;
        entry
            .downcast_ref::<HandoffQueue<T>>()
            .cloned()
            .ok_or_else(|| BusError::QueueTypeMismatch {
                name: name.to_string(),
            })
    }
}
