//! Observable domain stores.
//!
//! The three stores share one [`ChangeBus`]; [`Models`] bundles handles to
//! all of them so collaborators receive a single explicit context instead of
//! reaching for globals.

pub mod channels;
pub mod lifecycle;
pub mod notes;

pub use channels::ChannelRegistry;
pub use lifecycle::LifecycleState;
pub use notes::AnnotationStore;

use std::rc::Rc;

use crate::events::ChangeBus;

/// Shared handles to the stores and their bus
#[derive(Debug, Clone)]
pub struct Models {
    pub bus: Rc<ChangeBus>,
    pub channels: Rc<ChannelRegistry>,
    pub notes: Rc<AnnotationStore>,
    pub lifecycle: Rc<LifecycleState>,
}

impl Models {
    pub fn new() -> Self {
        let bus = Rc::new(ChangeBus::new());
        Self {
            channels: Rc::new(ChannelRegistry::new(Rc::clone(&bus))),
            notes: Rc::new(AnnotationStore::new(Rc::clone(&bus))),
            lifecycle: Rc::new(LifecycleState::new(Rc::clone(&bus))),
            bus,
        }
    }

    /// Leave DataLoaded, clearing channels and notes first
    pub fn discard_loaded_data(&self) -> crate::Result<()> {
        self.lifecycle
            .discard_loaded_data(&self.channels, &self.notes)
    }
}

impl Default for Models {
    fn default() -> Self {
        Self::new()
    }
}
