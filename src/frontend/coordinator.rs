//! Presentation coordinator
//!
//! Keeps every derived piece of view state (channel menus, enabled actions,
//! status fields, window title detail) consistent with the stores. It is the
//! only bus subscriber that writes back into the stores, and it does so
//! only in response to events or to explicit user commands.
//!
//! Store mutators are never called while the coordinator's own view state is
//! borrowed: handlers compute inside the borrow, release it, then mutate.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::error::{AcqViewError, Result};
use crate::events::{ChangeEvent, ChannelEvent, DataEvent, LifecycleEvent, NoteEvent, SubscriptionId};
use crate::frontend::dialogs::DialogHost;
use crate::frontend::dispatch::FileKind;
use crate::frontend::menus::{ChannelMenus, ContextMenu, MenuCommand};
use crate::frontend::phase_view::{stats_text, FieldUpdate, PhasePresentation, UiAction};
use crate::frontend::runtime::{elapsed_between, runtime_text, Clock, TickScheduler};
use crate::model::lifecycle::title_detail_for;
use crate::model::Models;
use crate::persistence::{DataFileHandler, ProjectFileHandler};
use crate::transport::AcquisitionControl;
use crate::types::{ChannelId, Note, Phase, XAxisMode, YAxisMode};

/// Default runtime display refresh interval
pub const RUNTIME_REFRESH: Duration = Duration::from_millis(250);

/// External collaborators the coordinator drives
pub struct Collaborators {
    pub transport: Rc<dyn AcquisitionControl>,
    pub data_files: Box<dyn DataFileHandler>,
    pub project_files: Box<dyn ProjectFileHandler>,
    pub dialogs: Box<dyn DialogHost>,
    pub clock: Box<dyn Clock>,
    pub scheduler: Box<dyn TickScheduler>,
}

/// One text field of the status bar
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusField {
    pub text: String,
    pub visible: bool,
}

impl StatusField {
    fn shown(text: String) -> Self {
        Self { text, visible: true }
    }
}

/// Status bar projection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusView {
    pub state: &'static str,
    pub runtime: StatusField,
    pub stats: StatusField,
}

/// Answer to the unsaved-notes question on close
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseDecision {
    /// Keep the window open
    Cancel,
    /// Close and drop the note changes
    Discard,
    /// Write the notes into the data file, then close
    Save,
}

#[derive(Debug)]
struct ViewState {
    menus: ChannelMenus,
    presentation: PhasePresentation,
    status: StatusView,
}

/// Derives view state from the stores and routes user commands into them
pub struct PresentationCoordinator {
    models: Models,
    collab: Collaborators,
    runtime_refresh: Duration,
    view: RefCell<ViewState>,
    /// Channel behind the stored front position, followed across
    /// structural changes
    front_id: Cell<Option<ChannelId>>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl PresentationCoordinator {
    /// Create the coordinator, subscribe it to the bus and bring the view
    /// state in line with the current store contents.
    pub fn new(models: Models, collab: Collaborators, runtime_refresh: Duration) -> Rc<Self> {
        let presentation = PhasePresentation::for_phase(Phase::Idle);
        let coordinator = Rc::new(Self {
            view: RefCell::new(ViewState {
                menus: ChannelMenus::default(),
                presentation,
                status: StatusView {
                    state: presentation.label,
                    runtime: StatusField::shown(runtime_text(Duration::ZERO)),
                    stats: StatusField::shown(stats_text(0, 0)),
                },
            }),
            models,
            collab,
            runtime_refresh,
            front_id: Cell::new(None),
            subscription: Cell::new(None),
        });

        let weak: Weak<Self> = Rc::downgrade(&coordinator);
        let id = coordinator.models.bus.subscribe(move |event| {
            if let Some(coordinator) = weak.upgrade() {
                coordinator.handle(event);
            }
        });
        coordinator.subscription.set(Some(id));

        coordinator.track_front_channel();
        coordinator.rebuild_menus();
        coordinator.apply_phase(coordinator.models.lifecycle.phase());
        coordinator
    }

    pub fn models(&self) -> &Models {
        &self.models
    }

    // ==================== Event handling ====================

    fn handle(&self, event: &ChangeEvent) {
        match event {
            ChangeEvent::Channel(ev) => self.on_channel_event(*ev),
            ChangeEvent::Lifecycle(ev) => self.on_lifecycle_event(*ev),
            ChangeEvent::Notes(NoteEvent::DataFileUpdateRequested) => {
                if let Err(e) = self.update_data_file_notes() {
                    tracing::warn!("Failed to update notes in data file: {}", e);
                }
            }
            ChangeEvent::Notes(_) | ChangeEvent::Data(_) | ChangeEvent::RuntimeTick(_) => {}
        }
    }

    fn on_channel_event(&self, event: ChannelEvent) {
        if event.is_structural() {
            self.remap_front_channel();
            self.rebuild_menus();
            return;
        }
        match event {
            ChannelEvent::VisibilityChanged(id)
            | ChannelEvent::LabelChanged(id)
            | ChannelEvent::ColorChanged(id) => self.refresh_menu_entry(id),
            ChannelEvent::TransformChanged(id) => {
                tracing::debug!(channel = %id, "transform changed, menus unaffected");
            }
            ChannelEvent::Added(_) | ChannelEvent::Removed(_) | ChannelEvent::ActiveChanged(_) => {}
        }
    }

    fn on_lifecycle_event(&self, event: LifecycleEvent) {
        let lifecycle = &self.models.lifecycle;
        match event {
            LifecycleEvent::PhaseChanged { to, .. } => self.apply_phase(to),
            LifecycleEvent::FrontChannelChanged => {
                self.track_front_channel();
                let front = lifecycle.front_channel();
                self.view.borrow_mut().menus.select_front(front);
            }
            LifecycleEvent::StatsChanged => {
                let text = stats_text(lifecycle.success_count(), lifecycle.error_count());
                let mut view = self.view.borrow_mut();
                if view.status.stats.visible {
                    view.status.stats.text = text;
                }
            }
            LifecycleEvent::ProjectFilePathChanged => {
                let detail = lifecycle
                    .project_file_path()
                    .or_else(|| lifecycle.data_file_path())
                    .map(|p| title_detail_for(&p))
                    .unwrap_or_default();
                lifecycle.set_window_title_detail(detail);
            }
            LifecycleEvent::DataFilePathChanged => {
                let detail = lifecycle
                    .data_file_path()
                    .or_else(|| lifecycle.project_file_path())
                    .map(|p| title_detail_for(&p))
                    .unwrap_or_default();
                lifecycle.set_window_title_detail(detail);
            }
            _ => {}
        }
    }

    fn track_front_channel(&self) {
        let front = self.models.lifecycle.front_channel();
        self.front_id
            .set(front.and_then(|position| self.models.channels.active_to_id(position)));
    }

    /// Move the front position to where the front channel now sits, or
    /// clear it when that channel left the active set
    fn remap_front_channel(&self) {
        let position = self
            .front_id
            .get()
            .and_then(|id| self.models.channels.full_to_active_index(id).ok());
        if self.models.lifecycle.set_front_channel(position) {
            tracing::debug!(?position, "front channel position remapped");
        }
    }

    fn rebuild_menus(&self) {
        let menus = ChannelMenus::rebuild(
            &self.models.channels,
            self.models.lifecycle.front_channel(),
        );
        tracing::debug!(entries = menus.show_hide.entries.len(), "channel menus rebuilt");
        self.view.borrow_mut().menus = menus;
    }

    fn refresh_menu_entry(&self, id: ChannelId) {
        let channels = &self.models.channels;
        let Ok(position) = channels.full_to_active_index(id) else {
            return;
        };
        let Some(channel) = channels.get(id) else {
            return;
        };
        if !self.view.borrow_mut().menus.refresh_entry(position, &channel) {
            tracing::debug!(channel = %id, position, "no menu entry to refresh");
        }
    }

    fn apply_phase(&self, phase: Phase) {
        let lifecycle = &self.models.lifecycle;
        let presentation = PhasePresentation::for_phase(phase);
        {
            let mut view = self.view.borrow_mut();
            view.presentation = presentation;
            view.status.state = presentation.label;

            match presentation.runtime {
                FieldUpdate::Reset | FieldUpdate::Live => {
                    view.status.runtime = StatusField::shown(runtime_text(Duration::ZERO));
                }
                FieldUpdate::Keep => {}
                FieldUpdate::Hide => view.status.runtime = StatusField::default(),
            }

            match presentation.stats {
                FieldUpdate::Reset => view.status.stats = StatusField::shown(stats_text(0, 0)),
                FieldUpdate::Live => {
                    view.status.stats = StatusField::shown(stats_text(
                        lifecycle.success_count(),
                        lifecycle.error_count(),
                    ));
                }
                FieldUpdate::Keep => {}
                FieldUpdate::Hide => view.status.stats = StatusField::default(),
            }
        }

        match phase {
            Phase::Running => self.collab.scheduler.schedule_tick(self.runtime_refresh),
            Phase::Idle => {
                lifecycle.set_data_file_path(None);
            }
            Phase::Stopped | Phase::DataLoaded => {}
        }

        if matches!(phase, Phase::Idle | Phase::Stopped)
            && !lifecycle.has_data_file()
            && !lifecycle.has_project_file()
        {
            lifecycle.set_window_title_detail("");
        }
    }

    // ==================== Runtime display ====================

    /// Render the elapsed acquisition time; re-arms itself while running
    pub fn on_runtime_tick(&self) {
        let lifecycle = &self.models.lifecycle;
        let was_running = lifecycle.phase().is_running();

        let elapsed = lifecycle
            .communication_start_ms()
            .map(|start| elapsed_between(start, self.collab.clock.now_ms()))
            .unwrap_or(Duration::ZERO);

        {
            let mut view = self.view.borrow_mut();
            if view.status.runtime.visible {
                view.status.runtime.text = runtime_text(elapsed);
            }
        }
        self.models.bus.emit(ChangeEvent::RuntimeTick(elapsed));

        if was_running {
            self.collab.scheduler.schedule_tick(self.runtime_refresh);
        }
    }

    // ==================== Acquisition ====================

    fn acquisition_running(&self) -> bool {
        self.collab.transport.is_active() || self.models.lifecycle.phase().is_running()
    }

    /// Start acquiring the active channels
    pub fn start_acquisition(&self) -> Result<()> {
        let models = &self.models;
        let lifecycle = &models.lifecycle;

        if lifecycle.phase() == Phase::DataLoaded {
            models.discard_loaded_data()?;
        }

        let active = models.channels.active_ids();
        if active.is_empty() {
            tracing::warn!("start refused: no active channels");
            return Err(AcqViewError::NoActiveChannels);
        }

        lifecycle.start(self.collab.clock.now_ms())?;

        if self.collab.transport.start(&active) {
            self.clear_data();
        } else {
            tracing::warn!("transport did not start");
        }

        if lifecycle.x_axis_mode() == XAxisMode::Manual {
            lifecycle.set_x_axis_mode(XAxisMode::Auto);
        }
        if lifecycle.y_axis_mode() == YAxisMode::Manual {
            lifecycle.set_y_axis_mode(YAxisMode::Auto);
        }
        Ok(())
    }

    pub fn stop_acquisition(&self) -> Result<()> {
        let phase = self.models.lifecycle.phase();
        if !phase.is_running() {
            return Err(AcqViewError::IllegalTransition {
                from: phase,
                to: Phase::Stopped,
            });
        }
        self.collab.transport.stop();
        self.models.lifecycle.stop()
    }

    /// Drop acquired data, counters, markers and notes
    pub fn clear_data(&self) {
        let models = &self.models;
        models.lifecycle.reset_stats();
        models.lifecycle.clear_markers();
        if let Err(e) = self.collab.data_files.rewrite_data_file() {
            tracing::warn!("Failed to rewrite data file: {}", e);
        }
        models.notes.clear();
        models.bus.emit(DataEvent::Cleared);
    }

    // ==================== Notes ====================

    pub fn add_note(&self, text: impl Into<String>, key: f64, value: f64) -> usize {
        self.models.notes.add(Note::new(key, value, text))
    }

    /// Write changed notes back into the loaded data file
    pub fn update_data_file_notes(&self) -> Result<()> {
        let models = &self.models;
        if models.lifecycle.phase() != Phase::DataLoaded || !models.notes.is_dirty() {
            return Ok(());
        }
        let path = models
            .lifecycle
            .data_file_path()
            .ok_or_else(|| AcqViewError::persistence(None, "No data file loaded"))?;
        self.collab.data_files.update_note_lines(&path)?;
        models.notes.mark_clean();
        Ok(())
    }

    // ==================== Files and dialogs ====================

    /// Open the register dialog, optionally preloaded with a definitions
    /// file. Returns false if the user declined to discard loaded data.
    pub fn open_register_dialog(&self, definitions: Option<&Path>) -> Result<bool> {
        if self.acquisition_running() {
            return Err(AcqViewError::AcquisitionActive);
        }
        if self.models.lifecycle.phase() == Phase::DataLoaded {
            if !self.collab.dialogs.confirm_discard_loaded_data() {
                tracing::debug!("register dialog cancelled, loaded data kept");
                return Ok(false);
            }
            self.models.discard_loaded_data()?;
        }
        self.collab
            .dialogs
            .show_register_dialog(definitions.map(Path::to_path_buf));
        Ok(true)
    }

    pub fn load_project_file(&self, path: &Path) -> Result<()> {
        if self.acquisition_running() {
            return Err(AcqViewError::AcquisitionActive);
        }
        self.collab.project_files.load_project_file(path)
    }

    pub fn reload_project_file(&self) -> Result<()> {
        if !self.is_enabled(UiAction::ReloadProjectFile) {
            tracing::debug!("reload ignored in phase {}", self.models.lifecycle.phase());
            return Ok(());
        }
        let path = self
            .models
            .lifecycle
            .project_file_path()
            .ok_or_else(|| AcqViewError::persistence(None, "No project file loaded"))?;
        self.load_project_file(&path)
    }

    pub fn import_data_file(&self, path: &Path) -> Result<()> {
        if self.acquisition_running() {
            return Err(AcqViewError::AcquisitionActive);
        }
        self.collab.data_files.load_data_file(path)
    }

    /// Route a file by its suffix. Unknown suffixes are ignored.
    pub fn dispatch_file(&self, path: &Path) -> Result<Option<FileKind>> {
        if self.acquisition_running() {
            tracing::warn!(path = %path.display(), "file refused while acquiring");
            return Err(AcqViewError::AcquisitionActive);
        }

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.models.lifecycle.set_last_dir(Some(dir.to_path_buf()));
        }

        let Some(kind) = FileKind::classify(path) else {
            tracing::debug!(path = %path.display(), "unrecognized file ignored");
            return Ok(None);
        };

        tracing::info!(?kind, path = %path.display(), "dispatching file");
        match kind {
            FileKind::Project => self.collab.project_files.load_project_file(path)?,
            FileKind::DataFile => self.collab.data_files.load_data_file(path)?,
            FileKind::RegisterDefinitions => {
                self.open_register_dialog(Some(path))?;
            }
        }
        Ok(Some(kind))
    }

    /// Dispatch the last of several dropped files. Drops during acquisition
    /// are ignored rather than reported.
    pub fn dispatch_dropped(&self, paths: &[PathBuf]) -> Result<Option<FileKind>> {
        let Some(path) = paths.last() else {
            return Ok(None);
        };
        if self.acquisition_running() {
            tracing::debug!(path = %path.display(), "drop ignored while acquiring");
            return Ok(None);
        }
        self.dispatch_file(path)
    }

    // ==================== Close ====================

    /// Whether closing would lose note changes made to a loaded data file
    pub fn needs_close_confirmation(&self) -> bool {
        self.models.lifecycle.phase() == Phase::DataLoaded && self.models.notes.is_dirty()
    }

    /// Apply the user's answer. `Ok(true)` means the window may close; a
    /// failed save is returned as an error and the window must stay open.
    pub fn resolve_close(&self, decision: CloseDecision) -> Result<bool> {
        if !self.needs_close_confirmation() {
            return Ok(true);
        }
        match decision {
            CloseDecision::Cancel => Ok(false),
            CloseDecision::Discard => Ok(true),
            CloseDecision::Save => {
                self.update_data_file_notes().map_err(|e| {
                    tracing::warn!("Close aborted, notes not saved: {}", e);
                    e
                })?;
                Ok(true)
            }
        }
    }

    // ==================== Cursor and menus ====================

    /// The cursor modifier key was pressed or released
    pub fn on_modifier_changed(&self, held: bool) {
        self.models.lifecycle.set_cursor_active(held);
    }

    pub fn on_focus_lost(&self) {
        self.models.lifecycle.set_cursor_active(false);
    }

    /// Apply a clicked channel menu entry. Returns false for an entry that
    /// no longer maps to an active channel.
    pub fn apply_menu_command(&self, command: MenuCommand) -> Result<bool> {
        match command {
            MenuCommand::ToggleShowHide { position, visible } => {
                let Some(id) = self.models.channels.active_to_id(position) else {
                    tracing::debug!(position, "stale show/hide entry");
                    return Ok(false);
                };
                self.models.channels.set_visible(id, visible)?;
                Ok(true)
            }
            MenuCommand::BringToFront { position } => {
                if position >= self.models.channels.active_count() {
                    tracing::debug!(position, "stale bring-to-front entry");
                    return Ok(false);
                }
                self.models.lifecycle.set_front_channel(Some(position));
                Ok(true)
            }
        }
    }

    // ==================== Projections ====================

    pub fn menus(&self) -> ChannelMenus {
        self.view.borrow().menus.clone()
    }

    /// Plot context menu; `None` while the cursor modifier is held
    pub fn context_menu(&self) -> Option<ContextMenu> {
        let lifecycle = &self.models.lifecycle;
        if lifecycle.cursor_active() {
            return None;
        }
        let view = self.view.borrow();
        Some(ContextMenu::new(&view.menus, lifecycle.highlight_samples()))
    }

    pub fn status(&self) -> StatusView {
        self.view.borrow().status.clone()
    }

    pub fn presentation(&self) -> PhasePresentation {
        self.view.borrow().presentation
    }

    pub fn is_enabled(&self, action: UiAction) -> bool {
        let has_project = self.models.lifecycle.has_project_file();
        self.view.borrow().presentation.allows(action, has_project)
    }

    pub fn window_title(&self) -> String {
        self.models.lifecycle.window_title()
    }
}

impl Drop for PresentationCoordinator {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.models.bus.unsubscribe(id);
        }
    }
}
