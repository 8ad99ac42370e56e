//! Synchronous publish/subscribe bus connecting stores to views.
//!
//! Delivery rules:
//!
//! - Events reach subscribers on the calling thread, in emission order.
//! - The subscriber list is snapshotted before each delivery; subscribing or
//!   unsubscribing from inside a callback takes effect for the next event.
//! - An event emitted from inside a callback is queued and delivered after
//!   the current delivery finishes iterating. Deliveries never interleave.
//! - A panicking subscriber ends the delivery; events still queued at that
//!   point are discarded.
//!
//! The bus is `!Send`: all stores and subscribers live on the UI thread.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use super::ChangeEvent;

/// Handle returned by [`ChangeBus::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Rc<dyn Fn(&ChangeEvent)>;

/// Typed change-notification bus
#[derive(Default)]
pub struct ChangeBus {
    subscribers: RefCell<Vec<(SubscriptionId, Callback)>>,
    pending: RefCell<VecDeque<ChangeEvent>>,
    delivering: Cell<bool>,
    next_id: Cell<u64>,
}

impl std::fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeBus")
            .field("subscribers", &self.subscribers.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .field("delivering", &self.delivering.get())
            .finish()
    }
}

/// Ends a delivery. When a subscriber panics, the events still queued
/// behind the failed one are dropped so the next emit starts clean.
struct DeliveryGuard<'a>(&'a ChangeBus);

impl Drop for DeliveryGuard<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            if let Ok(mut pending) = self.0.pending.try_borrow_mut() {
                if !pending.is_empty() {
                    tracing::warn!(dropped = pending.len(), "subscriber panicked, queued events dropped");
                    pending.clear();
                }
            }
        }
        self.0.delivering.set(false);
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for every future event
    pub fn subscribe(&self, callback: impl Fn(&ChangeEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow().len()
    }

    /// Whether a delivery is currently in progress
    pub fn is_delivering(&self) -> bool {
        self.delivering.get()
    }

    /// Publish an event.
    ///
    /// Outside of a delivery this returns only after every subscriber (and
    /// every event they emitted in turn) has been served.
    pub fn emit(&self, event: impl Into<ChangeEvent>) {
        let event = event.into();
        tracing::trace!(?event, "emit");
        self.pending.borrow_mut().push_back(event);

        if self.delivering.get() {
            return;
        }

        self.delivering.set(true);
        let _guard = DeliveryGuard(self);

        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(event) = next else {
                break;
            };

            let snapshot: Vec<Callback> = self
                .subscribers
                .borrow()
                .iter()
                .map(|(_, cb)| Rc::clone(cb))
                .collect();

            for callback in snapshot {
                callback(&event);
            }
        }
    }
}
