//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use std::cell::RefCell;
use std::rc::Rc;

use acqview::events::{ChangeBus, ChangeEvent, SubscriptionId};

/// Records every event delivered by a bus, in delivery order
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Rc<RefCell<Vec<ChangeEvent>>>,
}

impl EventRecorder {
    /// Subscribe a new recorder to `bus`
    pub fn attach(bus: &ChangeBus) -> (Self, SubscriptionId) {
        let recorder = Self::default();
        let sink = Rc::clone(&recorder.events);
        let id = bus.subscribe(move |event| sink.borrow_mut().push(event.clone()));
        (recorder, id)
    }

    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    /// Index of the first event matching `pred`
    pub fn position(&self, pred: impl Fn(&ChangeEvent) -> bool) -> Option<usize> {
        self.events.borrow().iter().position(pred)
    }

    pub fn count(&self, pred: impl Fn(&ChangeEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}
