//! Core data types for acqview
//!
//! This module contains the plain data structures shared by the stores, the
//! change bus and the presentation layer.
//!
//! # Main Types
//!
//! - [`ChannelId`] - Stable channel identity, never reused by a registry
//! - [`Channel`] - Display and transform configuration of one value stream
//! - [`Note`] - A user annotation anchored in plot-data coordinates
//! - [`Phase`] - The application lifecycle state
//! - [`XAxisMode`] / [`YAxisMode`] - Axis scaling modes
//! - [`SampleBatch`] - One poll cycle worth of results from the transport

use serde::{Deserialize, Serialize};

/// Stable numeric identity of a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelId(pub u32);

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to an egui color for rendering
    pub fn to_color32(self) -> egui::Color32 {
        egui::Color32::from_rgb(self.r, self.g, self.b)
    }
}

/// Default channel colors, assigned round-robin on creation
pub const CHANNEL_PALETTE: [Rgb; 8] = [
    Rgb::new(0, 114, 189),
    Rgb::new(217, 83, 25),
    Rgb::new(237, 177, 32),
    Rgb::new(126, 47, 142),
    Rgb::new(119, 172, 48),
    Rgb::new(77, 190, 238),
    Rgb::new(162, 20, 47),
    Rgb::new(0, 0, 0),
];

/// Numeric transform parameters of a channel.
///
/// The core never applies these; it only routes their changes to the
/// collaborators that do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelTransform {
    /// Register address on the remote device
    pub address: u16,
    /// Interpret the raw value as unsigned
    pub unsigned: bool,
    /// Scale numerator
    pub multiply: i32,
    /// Scale denominator
    pub divide: i32,
    /// Right shift applied after masking
    pub shift: i8,
    /// Bit mask applied to the raw value
    pub bitmask: u16,
}

impl Default for ChannelTransform {
    fn default() -> Self {
        Self {
            address: 40001,
            unsigned: false,
            multiply: 1,
            divide: 1,
            shift: 0,
            bitmask: 0xFFFF,
        }
    }
}

/// One monitored value stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    /// Participates in acquisition and plotting
    pub active: bool,
    /// Shown in the plot; only meaningful while active
    pub visible: bool,
    pub label: String,
    pub color: Rgb,
    pub transform: ChannelTransform,
}

impl Channel {
    pub fn new(id: ChannelId, color: Rgb) -> Self {
        Self {
            id,
            active: true,
            visible: true,
            label: format!("Channel {}", id),
            color,
            transform: ChannelTransform::default(),
        }
    }

    /// Whether the channel is drawn in the plot
    pub fn is_shown(&self) -> bool {
        self.active && self.visible
    }
}

/// A user annotation anchored at a position in plot-data coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// X position (time axis)
    pub key: f64,
    /// Y position (value axis)
    pub value: f64,
    pub text: String,
}

impl Note {
    pub fn new(key: f64, value: f64, text: impl Into<String>) -> Self {
        Self {
            key,
            value,
            text: text.into(),
        }
    }
}

/// Application lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Nothing acquired yet, or loaded data discarded
    #[default]
    Idle,
    /// Acquisition in progress
    Running,
    /// Acquisition finished, data kept
    Stopped,
    /// An imported data file is being viewed
    DataLoaded,
}

impl Phase {
    /// Whether the state machine allows moving from `self` to `to`
    pub fn can_transition_to(self, to: Phase) -> bool {
        matches!(
            (self, to),
            (Phase::Idle, Phase::Running)
                | (Phase::Running, Phase::Stopped)
                | (Phase::Stopped, Phase::Running)
                | (Phase::Stopped, Phase::DataLoaded)
                | (Phase::Idle, Phase::DataLoaded)
                | (Phase::DataLoaded, Phase::Idle)
        )
    }

    /// Check if acquisition is in progress
    pub fn is_running(self) -> bool {
        matches!(self, Phase::Running)
    }

    /// All phases
    pub fn all() -> &'static [Phase] {
        &[Phase::Idle, Phase::Running, Phase::Stopped, Phase::DataLoaded]
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Running => write!(f, "Running"),
            Phase::Stopped => write!(f, "Stopped"),
            Phase::DataLoaded => write!(f, "DataLoaded"),
        }
    }
}

/// X axis scaling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum XAxisMode {
    /// Fit all data
    #[default]
    Auto,
    /// Follow the latest `x_sliding_secs` seconds
    Sliding,
    /// User controlled
    Manual,
}

impl XAxisMode {
    pub fn all() -> &'static [XAxisMode] {
        &[XAxisMode::Auto, XAxisMode::Sliding, XAxisMode::Manual]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            XAxisMode::Auto => "Full auto scale",
            XAxisMode::Sliding => "Sliding window",
            XAxisMode::Manual => "Manual",
        }
    }
}

/// Y axis scaling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum YAxisMode {
    /// Fit all data
    #[default]
    Auto,
    /// Follow the sliding x window
    Sliding,
    /// User controlled
    Manual,
    /// Fit the data inside the visible x window
    WindowAuto,
    /// Fixed `y_min`..`y_max`
    MinMax,
}

impl YAxisMode {
    pub fn all() -> &'static [YAxisMode] {
        &[
            YAxisMode::Auto,
            YAxisMode::WindowAuto,
            YAxisMode::MinMax,
            YAxisMode::Manual,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            YAxisMode::Auto => "Full auto scale",
            YAxisMode::Sliding => "Sliding",
            YAxisMode::Manual => "Manual",
            YAxisMode::WindowAuto => "Window auto scale",
            YAxisMode::MinMax => "Min/max",
        }
    }
}

/// Result of one poll cycle, one entry per active channel in active order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SampleBatch {
    /// Milliseconds since the Unix epoch at which the cycle completed
    pub timestamp_ms: i64,
    /// `(success, value)` per active channel
    pub results: Vec<(bool, f64)>,
}

impl SampleBatch {
    pub fn new(timestamp_ms: i64, results: Vec<(bool, f64)>) -> Self {
        Self {
            timestamp_ms,
            results,
        }
    }

    /// Number of successful reads in this cycle
    pub fn success_count(&self) -> u64 {
        self.results.iter().filter(|(ok, _)| *ok).count() as u64
    }

    /// Number of failed reads in this cycle
    pub fn error_count(&self) -> u64 {
        self.results.iter().filter(|(ok, _)| !*ok).count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_transitions() {
        assert!(Phase::Idle.can_transition_to(Phase::Running));
        assert!(Phase::Running.can_transition_to(Phase::Stopped));
        assert!(Phase::Stopped.can_transition_to(Phase::Running));
        assert!(Phase::Stopped.can_transition_to(Phase::DataLoaded));
        assert!(Phase::Idle.can_transition_to(Phase::DataLoaded));
        assert!(Phase::DataLoaded.can_transition_to(Phase::Idle));

        assert!(!Phase::Idle.can_transition_to(Phase::Stopped));
        assert!(!Phase::Running.can_transition_to(Phase::DataLoaded));
        assert!(!Phase::Running.can_transition_to(Phase::Idle));
        assert!(!Phase::DataLoaded.can_transition_to(Phase::Running));
        assert!(!Phase::Stopped.can_transition_to(Phase::Idle));
        for phase in Phase::all() {
            assert!(!phase.can_transition_to(*phase));
        }
    }

    #[test]
    fn test_channel_defaults() {
        let channel = Channel::new(ChannelId(3), CHANNEL_PALETTE[0]);
        assert!(channel.active);
        assert!(channel.visible);
        assert!(channel.is_shown());
        assert_eq!(channel.label, "Channel 3");
    }

    #[test]
    fn test_sample_batch_counts() {
        let batch = SampleBatch::new(0, vec![(true, 1.0), (false, 0.0), (true, 2.0)]);
        assert_eq!(batch.success_count(), 2);
        assert_eq!(batch.error_count(), 1);
    }
}
