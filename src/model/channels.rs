//! Channel registry
//!
//! Ordered collection of channel definitions. The full sequence keeps
//! insertion order; the active and visible subsets are derived on demand so
//! they can never drift out of sync with the channels themselves.
//!
//! Mutators follow one pattern: borrow the state, apply the change, release
//! the borrow, then emit. Subscribers may therefore read the registry (or
//! mutate it again) from inside their callbacks.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{AcqViewError, Result};
use crate::events::{ChangeBus, ChannelEvent};
use crate::types::{Channel, ChannelId, ChannelTransform, Rgb, CHANNEL_PALETTE};

#[derive(Debug, Default)]
struct RegistryState {
    channels: Vec<Channel>,
    /// Next id to hand out; never reset so ids are not reused
    next_id: u32,
    /// Number of channels ever created, used for palette rotation
    created: usize,
    /// Channels that were visible when deactivated
    hidden_by_deactivation: HashSet<ChannelId>,
}

impl RegistryState {
    fn position(&self, id: ChannelId) -> Result<usize> {
        self.channels
            .iter()
            .position(|c| c.id == id)
            .ok_or(AcqViewError::ChannelNotFound(id))
    }

    fn find_mut(&mut self, id: ChannelId) -> Result<&mut Channel> {
        let pos = self.position(id)?;
        Ok(&mut self.channels[pos])
    }
}

/// Ordered channel definitions with derived active/visible subsets
#[derive(Debug)]
pub struct ChannelRegistry {
    state: RefCell<RegistryState>,
    bus: Rc<ChangeBus>,
}

impl ChannelRegistry {
    pub fn new(bus: Rc<ChangeBus>) -> Self {
        Self {
            state: RefCell::new(RegistryState::default()),
            bus,
        }
    }

    // ==================== Mutators ====================

    /// Append a new active, visible channel and return its id
    pub fn add(&self) -> ChannelId {
        let id = {
            let mut state = self.state.borrow_mut();
            let id = ChannelId(state.next_id);
            state.next_id += 1;
            let color = CHANNEL_PALETTE[state.created % CHANNEL_PALETTE.len()];
            state.created += 1;
            state.channels.push(Channel::new(id, color));
            id
        };
        tracing::debug!(channel = %id, "channel added");
        self.bus.emit(ChannelEvent::Added(id));
        id
    }

    /// Remove a channel; the derived subsets shrink with it
    pub fn remove(&self, id: ChannelId) -> Result<Channel> {
        let removed = {
            let mut state = self.state.borrow_mut();
            let pos = state.position(id)?;
            state.hidden_by_deactivation.remove(&id);
            state.channels.remove(pos)
        };
        tracing::debug!(channel = %id, "channel removed");
        self.bus.emit(ChannelEvent::Removed(id));
        Ok(removed)
    }

    /// Remove every channel.
    ///
    /// The registry is empty before the first notification goes out; one
    /// `Removed` is emitted per channel that was active. Returns the number
    /// of channels removed.
    pub fn clear(&self) -> usize {
        let (count, active) = {
            let mut state = self.state.borrow_mut();
            let drained: Vec<Channel> = state.channels.drain(..).collect();
            state.hidden_by_deactivation.clear();
            let active: Vec<ChannelId> =
                drained.iter().filter(|c| c.active).map(|c| c.id).collect();
            (drained.len(), active)
        };

        if count > 0 {
            tracing::debug!(count, active = active.len(), "channel registry cleared");
        }
        for id in active {
            self.bus.emit(ChannelEvent::Removed(id));
        }
        count
    }

    /// Change whether a channel takes part in acquisition.
    ///
    /// Deactivating a visible channel hides it; reactivating a channel hidden
    /// that way shows it again. A channel the user hid before deactivating
    /// it stays hidden. The activity event always precedes the visibility
    /// event. Returns whether anything changed.
    pub fn set_active(&self, id: ChannelId, active: bool) -> Result<bool> {
        let visibility_changed = {
            let mut state = self.state.borrow_mut();
            let pos = state.position(id)?;
            if state.channels[pos].active == active {
                return Ok(false);
            }
            let restore = active && state.hidden_by_deactivation.remove(&id);
            let channel = &mut state.channels[pos];
            channel.active = active;
            let hide = !active && channel.visible;
            if hide || restore {
                channel.visible = active;
            }
            if hide {
                state.hidden_by_deactivation.insert(id);
            }
            hide || restore
        };

        tracing::debug!(channel = %id, active, "channel activity changed");
        self.bus.emit(ChannelEvent::ActiveChanged(id));
        if visibility_changed {
            self.bus.emit(ChannelEvent::VisibilityChanged(id));
        }
        Ok(true)
    }

    /// Show or hide an active channel. Inactive channels are left untouched.
    pub fn set_visible(&self, id: ChannelId, visible: bool) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            let channel = state.find_mut(id)?;
            if !channel.active || channel.visible == visible {
                return Ok(false);
            }
            channel.visible = visible;
        }
        self.bus.emit(ChannelEvent::VisibilityChanged(id));
        Ok(true)
    }

    /// Rename an active channel. Inactive channels are left untouched.
    pub fn set_label(&self, id: ChannelId, label: impl Into<String>) -> Result<bool> {
        let label = label.into();
        {
            let mut state = self.state.borrow_mut();
            let channel = state.find_mut(id)?;
            if !channel.active || channel.label == label {
                return Ok(false);
            }
            channel.label = label;
        }
        self.bus.emit(ChannelEvent::LabelChanged(id));
        Ok(true)
    }

    /// Recolor an active channel. Inactive channels are left untouched.
    pub fn set_color(&self, id: ChannelId, color: Rgb) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            let channel = state.find_mut(id)?;
            if !channel.active || channel.color == color {
                return Ok(false);
            }
            channel.color = color;
        }
        self.bus.emit(ChannelEvent::ColorChanged(id));
        Ok(true)
    }

    pub fn set_transform(&self, id: ChannelId, transform: ChannelTransform) -> Result<bool> {
        {
            let mut state = self.state.borrow_mut();
            let channel = state.find_mut(id)?;
            if channel.transform == transform {
                return Ok(false);
            }
            channel.transform = transform;
        }
        self.bus.emit(ChannelEvent::TransformChanged(id));
        Ok(true)
    }

    // ==================== Accessors ====================

    pub fn len(&self) -> usize {
        self.state.borrow().channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().channels.is_empty()
    }

    /// Snapshot of a single channel
    pub fn get(&self, id: ChannelId) -> Option<Channel> {
        self.state.borrow().channels.iter().find(|c| c.id == id).cloned()
    }

    /// Snapshot of the full channel sequence
    pub fn channels(&self) -> Vec<Channel> {
        self.state.borrow().channels.clone()
    }

    pub fn contains(&self, id: ChannelId) -> bool {
        self.state.borrow().position(id).is_ok()
    }

    pub fn is_active(&self, id: ChannelId) -> bool {
        self.get(id).is_some_and(|c| c.active)
    }

    /// Visible and active
    pub fn is_visible(&self, id: ChannelId) -> bool {
        self.get(id).is_some_and(|c| c.is_shown())
    }

    pub fn label(&self, id: ChannelId) -> Option<String> {
        self.get(id).map(|c| c.label)
    }

    pub fn color(&self, id: ChannelId) -> Option<Rgb> {
        self.get(id).map(|c| c.color)
    }

    /// Ids of the active channels in insertion order
    pub fn active_ids(&self) -> Vec<ChannelId> {
        self.state
            .borrow()
            .channels
            .iter()
            .filter(|c| c.active)
            .map(|c| c.id)
            .collect()
    }

    /// Ids of the channels currently drawn in the plot
    pub fn visible_ids(&self) -> Vec<ChannelId> {
        self.state
            .borrow()
            .channels
            .iter()
            .filter(|c| c.is_shown())
            .map(|c| c.id)
            .collect()
    }

    pub fn active_count(&self) -> usize {
        self.state
            .borrow()
            .channels
            .iter()
            .filter(|c| c.active)
            .count()
    }

    /// Position in the full channel sequence
    pub fn full_index(&self, id: ChannelId) -> Result<usize> {
        self.state.borrow().position(id)
    }

    /// Position among the active channels
    pub fn full_to_active_index(&self, id: ChannelId) -> Result<usize> {
        let state = self.state.borrow();
        let pos = state.position(id)?;
        if !state.channels[pos].active {
            return Err(AcqViewError::NotActive(id));
        }
        Ok(state.channels[..pos].iter().filter(|c| c.active).count())
    }

    /// Channel at a position among the active channels
    pub fn active_to_id(&self, active_index: usize) -> Option<ChannelId> {
        self.state
            .borrow()
            .channels
            .iter()
            .filter(|c| c.active)
            .nth(active_index)
            .map(|c| c.id)
    }
}
