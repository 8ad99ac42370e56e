//! Application lifecycle state
//!
//! Holds the Idle / Running / Stopped / DataLoaded state machine together
//! with the scalar fields the views observe: axis scaling, acquisition
//! counters, cursor and marker flags, file associations.
//!
//! Every setter is a no-op when the new value equals the stored one. Phase
//! changes go through [`Phase::can_transition_to`]; a rejected transition
//! mutates nothing and emits nothing.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::error::{AcqViewError, Result};
use crate::events::{ChangeBus, LifecycleEvent};
use crate::model::{AnnotationStore, ChannelRegistry};
use crate::types::{Phase, XAxisMode, YAxisMode};

/// Base of the main window title
pub const APP_TITLE: &str = "acqview";

#[derive(Debug, Clone)]
struct LifecycleFields {
    phase: Phase,
    x_axis_mode: XAxisMode,
    x_sliding_secs: u32,
    y_axis_mode: YAxisMode,
    y_min: f64,
    y_max: f64,
    success_count: u64,
    error_count: u64,
    communication_start_ms: Option<i64>,
    cursor_active: bool,
    front_channel: Option<usize>,
    highlight_samples: bool,
    markers_active: bool,
    window_title_detail: String,
    project_file_path: Option<PathBuf>,
    data_file_path: Option<PathBuf>,
    last_dir: Option<PathBuf>,
}

impl Default for LifecycleFields {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            x_axis_mode: XAxisMode::Auto,
            x_sliding_secs: 30,
            y_axis_mode: YAxisMode::Auto,
            y_min: 0.0,
            y_max: 10.0,
            success_count: 0,
            error_count: 0,
            communication_start_ms: None,
            cursor_active: false,
            front_channel: None,
            highlight_samples: false,
            markers_active: false,
            window_title_detail: String::new(),
            project_file_path: None,
            data_file_path: None,
            last_dir: None,
        }
    }
}

/// Observable lifecycle state machine and auxiliary view fields
#[derive(Debug)]
pub struct LifecycleState {
    fields: RefCell<LifecycleFields>,
    bus: Rc<ChangeBus>,
}

impl LifecycleState {
    pub fn new(bus: Rc<ChangeBus>) -> Self {
        Self {
            fields: RefCell::new(LifecycleFields::default()),
            bus,
        }
    }

    /// Write a field and emit `event` if the value changed
    fn update<T: PartialEq>(
        &self,
        field: impl FnOnce(&mut LifecycleFields) -> &mut T,
        value: T,
        event: LifecycleEvent,
    ) -> bool {
        {
            let mut fields = self.fields.borrow_mut();
            let slot = field(&mut fields);
            if *slot == value {
                return false;
            }
            *slot = value;
        }
        tracing::debug!(?event, "lifecycle field changed");
        self.bus.emit(event);
        true
    }

    /// Move to `to` if the state machine allows it.
    ///
    /// `prepare` runs on the fields after the check passed and before the
    /// phase is written; it reports whether the counters changed.
    fn transition(
        &self,
        to: Phase,
        prepare: impl FnOnce(&mut LifecycleFields) -> bool,
    ) -> Result<()> {
        let (from, stats_changed) = {
            let mut fields = self.fields.borrow_mut();
            let from = fields.phase;
            if !from.can_transition_to(to) {
                tracing::warn!(%from, %to, "illegal phase transition rejected");
                return Err(AcqViewError::IllegalTransition { from, to });
            }
            let stats_changed = prepare(&mut fields);
            fields.phase = to;
            (from, stats_changed)
        };

        tracing::info!(%from, %to, "phase changed");
        if stats_changed {
            self.bus.emit(LifecycleEvent::StatsChanged);
        }
        self.bus.emit(LifecycleEvent::PhaseChanged { from, to });
        Ok(())
    }

    // ==================== Phase transitions ====================

    /// Enter Running from Idle or Stopped and stamp the start time.
    ///
    /// The caller is responsible for checking that at least one channel is
    /// active. Counters are left untouched.
    pub fn start(&self, now_ms: i64) -> Result<()> {
        self.transition(Phase::Running, |fields| {
            fields.communication_start_ms = Some(now_ms);
            false
        })
    }

    /// Leave Running; counters freeze at their current values
    pub fn stop(&self) -> Result<()> {
        self.transition(Phase::Stopped, |_| false)
    }

    /// Enter DataLoaded from Idle or Stopped, clearing counters and start time
    pub fn enter_data_loaded(&self) -> Result<()> {
        self.transition(Phase::DataLoaded, |fields| {
            fields.communication_start_ms = None;
            let changed = fields.success_count != 0 || fields.error_count != 0;
            fields.success_count = 0;
            fields.error_count = 0;
            changed
        })
    }

    /// Drop the loaded data file and return to Idle.
    ///
    /// Channels and notes are cleared first, so every resulting `Removed`
    /// and `Cleared` event is delivered before the phase change.
    pub fn discard_loaded_data(
        &self,
        registry: &ChannelRegistry,
        notes: &AnnotationStore,
    ) -> Result<()> {
        let from = self.phase();
        if !from.can_transition_to(Phase::Idle) {
            tracing::warn!(%from, "discard requested outside DataLoaded");
            return Err(AcqViewError::IllegalTransition {
                from,
                to: Phase::Idle,
            });
        }

        registry.clear();
        notes.clear();
        self.transition(Phase::Idle, |_| false)
    }

    // ==================== Counters ====================

    /// Add the results of one poll cycle to the counters
    pub fn record_results(&self, successes: u64, errors: u64) -> Result<()> {
        {
            let mut fields = self.fields.borrow_mut();
            if !fields.phase.is_running() {
                return Err(AcqViewError::NotRunning(fields.phase));
            }
            if successes == 0 && errors == 0 {
                return Ok(());
            }
            fields.success_count += successes;
            fields.error_count += errors;
        }
        self.bus.emit(LifecycleEvent::StatsChanged);
        Ok(())
    }

    pub fn reset_stats(&self) {
        {
            let mut fields = self.fields.borrow_mut();
            if fields.success_count == 0 && fields.error_count == 0 {
                return;
            }
            fields.success_count = 0;
            fields.error_count = 0;
        }
        self.bus.emit(LifecycleEvent::StatsChanged);
    }

    // ==================== Axis scaling ====================

    pub fn set_x_axis_mode(&self, mode: XAxisMode) -> bool {
        self.update(|f| &mut f.x_axis_mode, mode, LifecycleEvent::XAxisScalingChanged)
    }

    pub fn set_x_sliding_secs(&self, secs: u32) -> bool {
        self.update(
            |f| &mut f.x_sliding_secs,
            secs,
            LifecycleEvent::XAxisSlidingIntervalChanged,
        )
    }

    pub fn set_y_axis_mode(&self, mode: YAxisMode) -> bool {
        self.update(|f| &mut f.y_axis_mode, mode, LifecycleEvent::YAxisScalingChanged)
    }

    pub fn set_y_min(&self, min: f64) -> bool {
        self.update(|f| &mut f.y_min, min, LifecycleEvent::YAxisMinMaxChanged)
    }

    pub fn set_y_max(&self, max: f64) -> bool {
        self.update(|f| &mut f.y_max, max, LifecycleEvent::YAxisMinMaxChanged)
    }

    // ==================== View flags ====================

    /// Bring the channel at this active index to the front of the plot
    pub fn set_front_channel(&self, active_index: Option<usize>) -> bool {
        self.update(
            |f| &mut f.front_channel,
            active_index,
            LifecycleEvent::FrontChannelChanged,
        )
    }

    pub fn set_cursor_active(&self, active: bool) -> bool {
        self.update(
            |f| &mut f.cursor_active,
            active,
            LifecycleEvent::CursorChanged(active),
        )
    }

    pub fn set_highlight_samples(&self, highlight: bool) -> bool {
        self.update(
            |f| &mut f.highlight_samples,
            highlight,
            LifecycleEvent::HighlightSamplesChanged,
        )
    }

    pub fn set_markers_active(&self, active: bool) -> bool {
        self.update(|f| &mut f.markers_active, active, LifecycleEvent::MarkersChanged)
    }

    pub fn clear_markers(&self) -> bool {
        self.set_markers_active(false)
    }

    // ==================== Files and title ====================

    pub fn set_window_title_detail(&self, detail: impl Into<String>) -> bool {
        self.update(
            |f| &mut f.window_title_detail,
            detail.into(),
            LifecycleEvent::WindowTitleChanged,
        )
    }

    pub fn set_project_file_path(&self, path: Option<PathBuf>) -> bool {
        self.update(
            |f| &mut f.project_file_path,
            path,
            LifecycleEvent::ProjectFilePathChanged,
        )
    }

    pub fn set_data_file_path(&self, path: Option<PathBuf>) -> bool {
        self.update(
            |f| &mut f.data_file_path,
            path,
            LifecycleEvent::DataFilePathChanged,
        )
    }

    pub fn set_last_dir(&self, dir: Option<PathBuf>) -> bool {
        self.update(|f| &mut f.last_dir, dir, LifecycleEvent::LastDirChanged)
    }

    // ==================== Accessors ====================

    pub fn phase(&self) -> Phase {
        self.fields.borrow().phase
    }

    pub fn x_axis_mode(&self) -> XAxisMode {
        self.fields.borrow().x_axis_mode
    }

    pub fn x_sliding_secs(&self) -> u32 {
        self.fields.borrow().x_sliding_secs
    }

    pub fn y_axis_mode(&self) -> YAxisMode {
        self.fields.borrow().y_axis_mode
    }

    pub fn y_min(&self) -> f64 {
        self.fields.borrow().y_min
    }

    pub fn y_max(&self) -> f64 {
        self.fields.borrow().y_max
    }

    pub fn success_count(&self) -> u64 {
        self.fields.borrow().success_count
    }

    pub fn error_count(&self) -> u64 {
        self.fields.borrow().error_count
    }

    /// Milliseconds since the epoch at which the current/last run started
    pub fn communication_start_ms(&self) -> Option<i64> {
        self.fields.borrow().communication_start_ms
    }

    pub fn cursor_active(&self) -> bool {
        self.fields.borrow().cursor_active
    }

    pub fn front_channel(&self) -> Option<usize> {
        self.fields.borrow().front_channel
    }

    pub fn highlight_samples(&self) -> bool {
        self.fields.borrow().highlight_samples
    }

    pub fn markers_active(&self) -> bool {
        self.fields.borrow().markers_active
    }

    pub fn window_title_detail(&self) -> String {
        self.fields.borrow().window_title_detail.clone()
    }

    pub fn project_file_path(&self) -> Option<PathBuf> {
        self.fields.borrow().project_file_path.clone()
    }

    pub fn data_file_path(&self) -> Option<PathBuf> {
        self.fields.borrow().data_file_path.clone()
    }

    pub fn last_dir(&self) -> Option<PathBuf> {
        self.fields.borrow().last_dir.clone()
    }

    pub fn has_project_file(&self) -> bool {
        self.fields.borrow().project_file_path.is_some()
    }

    pub fn has_data_file(&self) -> bool {
        self.fields.borrow().data_file_path.is_some()
    }

    /// Full window title, e.g. `acqview - pump.mbs`
    pub fn window_title(&self) -> String {
        let fields = self.fields.borrow();
        if fields.window_title_detail.is_empty() {
            APP_TITLE.to_string()
        } else {
            format!("{} - {}", APP_TITLE, fields.window_title_detail)
        }
    }
}

/// File name component used as window title detail
pub fn title_detail_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
