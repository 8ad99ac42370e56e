//! Typed change notifications.
//!
//! Every store mutator that changes state emits exactly one of these per
//! changed field. Events only name *what* changed; subscribers read the new
//! value back from the store, so a late subscriber can never act on a stale
//! payload.

pub mod bus;

pub use bus::{ChangeBus, SubscriptionId};

use std::time::Duration;

use crate::types::{ChannelId, Phase, SampleBatch};

/// Changes emitted by the channel registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEvent {
    Added(ChannelId),
    /// Also emitted once per previously active channel by `clear()`
    Removed(ChannelId),
    ActiveChanged(ChannelId),
    VisibilityChanged(ChannelId),
    LabelChanged(ChannelId),
    ColorChanged(ChannelId),
    TransformChanged(ChannelId),
}

impl ChannelEvent {
    /// The channel this event is about
    pub fn channel(&self) -> ChannelId {
        match *self {
            ChannelEvent::Added(id)
            | ChannelEvent::Removed(id)
            | ChannelEvent::ActiveChanged(id)
            | ChannelEvent::VisibilityChanged(id)
            | ChannelEvent::LabelChanged(id)
            | ChannelEvent::ColorChanged(id)
            | ChannelEvent::TransformChanged(id) => id,
        }
    }

    /// Whether the set of menu entries has to be rebuilt
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ChannelEvent::Added(_) | ChannelEvent::Removed(_) | ChannelEvent::ActiveChanged(_)
        )
    }
}

/// Changes emitted by the annotation store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    /// A note was appended at this index
    Added(usize),
    Cleared,
    DirtyChanged(bool),
    /// The notes editor asks for the loaded data file to be updated
    DataFileUpdateRequested,
}

/// Changes emitted by the lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    PhaseChanged { from: Phase, to: Phase },
    XAxisScalingChanged,
    XAxisSlidingIntervalChanged,
    YAxisScalingChanged,
    YAxisMinMaxChanged,
    StatsChanged,
    FrontChannelChanged,
    CursorChanged(bool),
    HighlightSamplesChanged,
    MarkersChanged,
    WindowTitleChanged,
    ProjectFilePathChanged,
    DataFilePathChanged,
    LastDirChanged,
}

/// Acquired data routed to the plot and legend
#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    SamplesReceived(SampleBatch),
    /// All plotted data must be dropped
    Cleared,
}

/// Every notification carried by the [`ChangeBus`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    Channel(ChannelEvent),
    Notes(NoteEvent),
    Lifecycle(LifecycleEvent),
    Data(DataEvent),
    /// Elapsed acquisition time, emitted on each runtime display tick
    RuntimeTick(Duration),
}

impl From<ChannelEvent> for ChangeEvent {
    fn from(event: ChannelEvent) -> Self {
        ChangeEvent::Channel(event)
    }
}

impl From<NoteEvent> for ChangeEvent {
    fn from(event: NoteEvent) -> Self {
        ChangeEvent::Notes(event)
    }
}

impl From<LifecycleEvent> for ChangeEvent {
    fn from(event: LifecycleEvent) -> Self {
        ChangeEvent::Lifecycle(event)
    }
}

impl From<DataEvent> for ChangeEvent {
    fn from(event: DataEvent) -> Self {
        ChangeEvent::Data(event)
    }
}
