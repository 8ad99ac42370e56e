//! Frontend module for egui UI
//!
//! The UI never owns domain state. Every frame it drains transport results
//! into the stores, renders from the projections kept by the
//! [`PresentationCoordinator`], and turns user input into [`AppAction`]s
//! that are applied after rendering.
//!
//! # Main Types
//!
//! - [`AcqViewApp`] - Main application state implementing [`eframe::App`]
//! - [`PresentationCoordinator`] - Derived view state and command routing
//! - [`PlotView`] - Plot rendering with egui_plot
//!
//! # Submodules
//!
//! - `coordinator` - Bus subscriber that keeps menus, status and title in sync
//! - `menus`, `phase_view` - Projections derived from the stores
//! - `runtime` - Runtime display ticks
//! - `dispatch` - File type routing
//! - `dialogs` - Dialog trait and dialogs
//! - `panels`, `status_bar` - Render functions

pub mod coordinator;
pub mod dialogs;
pub mod dispatch;
pub mod menus;
mod panels;
pub mod phase_view;
pub mod plot;
pub mod runtime;
pub mod state;
pub mod status_bar;

pub use coordinator::{CloseDecision, Collaborators, PresentationCoordinator, StatusView};
pub use panels::*;
pub use plot::{PlotData, PlotView};
pub use state::AppAction;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use dialogs::{
    show_dialog, AddNoteAction, AddNoteContext, AddNoteDialog, AddNoteState, CloseConfirmContext,
    CloseConfirmDialog, CloseConfirmState, DialogHost, RegisterAction, RegisterContext,
    RegisterDialog, RegisterState,
};
use phase_view::UiAction;
use plot::{plot_lines, AxisSettings, PlotContext};
use runtime::{FrameTickScheduler, SystemClock};
use status_bar::{render_status_bar, StatusBarContext};

use crate::config::Preferences;
use crate::error::{AcqViewError, Result, ResultExt};
use crate::events::SubscriptionId;
use crate::model::Models;
use crate::persistence::FileHandlers;
use crate::transport::{AcquisitionControl, SampleRouter, TransportBridge};
use crate::types::{Phase, XAxisMode, YAxisMode};

/// Repaint interval while acquiring, so samples are drained promptly
const ACQUISITION_REPAINT: Duration = Duration::from_millis(50);

/// Register dialog request recorded by [`ShellDialogs`]
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterRequest {
    pub definitions: Option<PathBuf>,
}

/// Dialog host backed by native message boxes and egui windows.
///
/// Clones share the pending request, so the coordinator can hold one handle
/// while the app polls another.
#[derive(Debug, Clone, Default)]
pub struct ShellDialogs {
    pending_register: Rc<RefCell<Option<RegisterRequest>>>,
}

impl ShellDialogs {
    pub fn take_register_request(&self) -> Option<RegisterRequest> {
        self.pending_register.borrow_mut().take()
    }
}

impl DialogHost for ShellDialogs {
    fn confirm_discard_loaded_data(&self) -> bool {
        let answer = rfd::MessageDialog::new()
            .set_level(rfd::MessageLevel::Warning)
            .set_title("Discard data file")
            .set_description("The loaded data file will be closed. Continue?")
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        matches!(answer, rfd::MessageDialogResult::Yes)
    }

    fn show_register_dialog(&self, definitions: Option<PathBuf>) {
        *self.pending_register.borrow_mut() = Some(RegisterRequest { definitions });
    }
}

/// Start-up options for [`AcqViewApp`]
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// File to open once the window is up
    pub open_file: Option<PathBuf>,
    /// Number of channels to create at start
    pub initial_channels: usize,
}

/// Main application state
pub struct AcqViewApp {
    models: Models,
    coordinator: Rc<PresentationCoordinator>,
    bridge: Rc<TransportBridge>,
    router: SampleRouter,
    ticks: FrameTickScheduler,
    dialogs: ShellDialogs,
    preferences: Preferences,

    plot_data: Rc<RefCell<PlotData>>,
    plot_subscription: SubscriptionId,
    plot_view: PlotView,

    last_error: Option<String>,
    last_title: String,
    modifier_held: bool,
    focused: bool,
    allow_close: bool,

    register_open: bool,
    register_state: RegisterState,
    register_definitions: Option<PathBuf>,
    add_note_open: bool,
    add_note_state: AddNoteState,
    close_confirm_open: bool,
    close_confirm_state: CloseConfirmState,
    notes_open: bool,
}

impl AcqViewApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        bridge: TransportBridge,
        mut preferences: Preferences,
        options: AppOptions,
    ) -> Self {
        preferences.cleanup_missing_projects();

        let models = Models::new();
        let lifecycle = &models.lifecycle;
        lifecycle.set_x_sliding_secs(preferences.x_sliding_secs);
        lifecycle.set_y_min(preferences.y_min);
        lifecycle.set_y_max(preferences.y_max);
        lifecycle.set_last_dir(preferences.last_dir.clone());

        for _ in 0..options.initial_channels {
            models.channels.add();
        }

        let bridge = Rc::new(bridge);
        let ticks = FrameTickScheduler::new().with_repaint(cc.egui_ctx.clone());
        let dialogs = ShellDialogs::default();
        let files = FileHandlers::new(models.clone());
        let transport: Rc<dyn AcquisitionControl> = bridge.clone();

        let coordinator = PresentationCoordinator::new(
            models.clone(),
            Collaborators {
                transport,
                data_files: Box::new(files.clone()),
                project_files: Box::new(files),
                dialogs: Box::new(dialogs.clone()),
                clock: Box::new(SystemClock),
                scheduler: Box::new(ticks.clone()),
            },
            preferences.runtime_refresh(),
        );

        let plot_data = Rc::new(RefCell::new(PlotData::new()));
        let sink = Rc::clone(&plot_data);
        let channels = Rc::clone(&models.channels);
        let plot_subscription = models
            .bus
            .subscribe(move |event| sink.borrow_mut().handle(event, &channels));

        let mut app = Self {
            router: SampleRouter::new(models.clone()),
            models,
            coordinator,
            bridge,
            ticks,
            dialogs,
            preferences,
            plot_data,
            plot_subscription,
            plot_view: PlotView::new(),
            last_error: None,
            last_title: String::new(),
            modifier_held: false,
            focused: true,
            allow_close: false,
            register_open: false,
            register_state: RegisterState::default(),
            register_definitions: None,
            add_note_open: false,
            add_note_state: AddNoteState::default(),
            close_confirm_open: false,
            close_confirm_state: CloseConfirmState::default(),
            notes_open: false,
        };

        if let Some(path) = options.open_file {
            tracing::info!("Opening {:?} from command line", path);
            let result = app.coordinator.dispatch_file(&path).map(|_| ());
            app.report(result);
        }
        app
    }

    fn report(&mut self, result: Result<()>) {
        match result {
            Ok(()) => {}
            Err(e) => {
                tracing::warn!("{}", e);
                self.last_error = Some(e.to_string());
            }
        }
    }

    // ==================== Per-frame polling ====================

    fn poll_transport(&mut self) {
        if let Some(err) = self.router.drain(&self.bridge) {
            self.last_error = Some(err);
        }
    }

    fn poll_runtime_tick(&self) {
        if self.ticks.take_due(Instant::now()) {
            self.coordinator.on_runtime_tick();
        }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let (modifier, focused, dropped, close_requested) = ctx.input(|i| {
            (
                i.modifiers.ctrl,
                i.focused,
                i.raw
                    .dropped_files
                    .iter()
                    .filter_map(|f| f.path.clone())
                    .collect::<Vec<_>>(),
                i.viewport().close_requested(),
            )
        });

        if self.focused && !focused {
            self.modifier_held = false;
            self.coordinator.on_focus_lost();
        } else if modifier != self.modifier_held {
            self.modifier_held = modifier;
            self.coordinator.on_modifier_changed(modifier);
        }
        self.focused = focused;

        if !dropped.is_empty() {
            let result = self.coordinator.dispatch_dropped(&dropped).map(|_| ());
            self.report(result);
        }

        if close_requested && !self.allow_close && self.coordinator.needs_close_confirmation() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            self.close_confirm_open = true;
        }
    }

    fn sync_title(&mut self, ctx: &egui::Context) {
        let title = self.coordinator.window_title();
        if title != self.last_title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.last_title = title;
        }
    }

    // ==================== Actions ====================

    fn pick_file(&self, name: &str, extension: &str) -> Option<PathBuf> {
        let mut dialog = rfd::FileDialog::new().add_filter(name, &[extension]);
        if let Some(dir) = self.models.lifecycle.last_dir() {
            dialog = dialog.set_directory(dir);
        }
        dialog.pick_file()
    }

    fn handle_action(&mut self, ctx: &egui::Context, action: AppAction) {
        if let Some(gate) = action.gate() {
            if !self.coordinator.is_enabled(gate) {
                tracing::debug!("{:?} ignored, not enabled", gate);
                return;
            }
        }

        let coordinator = Rc::clone(&self.coordinator);
        let lifecycle = Rc::clone(&self.models.lifecycle);
        let result = match action {
            AppAction::StartAcquisition => coordinator
                .start_acquisition()
                .context("Start acquisition"),
            AppAction::StopAcquisition => coordinator.stop_acquisition(),
            AppAction::ClearData => {
                coordinator.clear_data();
                Ok(())
            }
            AppAction::OpenFile(path) => coordinator.dispatch_file(&path).map(|_| ()),
            AppAction::ImportDataFile(path) => coordinator
                .import_data_file(&path)
                .with_context(|| format!("Import {}", path.display())),
            AppAction::LoadProjectFile(path) => coordinator
                .load_project_file(&path)
                .with_context(|| format!("Load {}", path.display()))
                .map(|()| self.preferences.add_recent_project(&path)),
            AppAction::ReloadProjectFile => coordinator.reload_project_file(),
            AppAction::External(action) => {
                tracing::info!("{} is provided by a separate tool", action.label());
                self.last_error = Some(format!("{} is not available", action.label()));
                Ok(())
            }
            AppAction::OpenRegisterDialog => coordinator.open_register_dialog(None).map(|_| ()),
            AppAction::Register(action) => self.apply_register_action(action),
            AppAction::OpenAddNote { key, value } => {
                self.add_note_state = AddNoteState::at(key, value);
                self.add_note_open = true;
                Ok(())
            }
            AppAction::AddNote { text, key, value } => {
                coordinator.add_note(text, key, value);
                Ok(())
            }
            AppAction::ToggleNotesWindow => {
                self.notes_open = !self.notes_open;
                Ok(())
            }
            AppAction::ResolveClose(decision) => self.resolve_close(ctx, decision),
            AppAction::Menu(command) => coordinator.apply_menu_command(command).map(|_| ()),
            AppAction::ToggleHighlightSamples => {
                lifecycle.set_highlight_samples(!lifecycle.highlight_samples());
                Ok(())
            }
            AppAction::ClearMarkers => {
                lifecycle.clear_markers();
                Ok(())
            }
            AppAction::MarkerPlaced => {
                lifecycle.set_markers_active(true);
                Ok(())
            }
            AppAction::SetXAxisMode(mode) => {
                lifecycle.set_x_axis_mode(mode);
                Ok(())
            }
            AppAction::SetXSlidingSecs(secs) => {
                lifecycle.set_x_sliding_secs(secs);
                Ok(())
            }
            AppAction::SetYAxisMode(mode) => {
                lifecycle.set_y_axis_mode(mode);
                Ok(())
            }
            AppAction::SetYMin(min) => {
                lifecycle.set_y_min(min);
                Ok(())
            }
            AppAction::SetYMax(max) => {
                lifecycle.set_y_max(max);
                Ok(())
            }
        };
        self.report(result);
    }

    fn apply_register_action(&mut self, action: RegisterAction) -> Result<()> {
        if self.models.lifecycle.phase().is_running() {
            return Err(AcqViewError::AcquisitionActive);
        }
        let channels = &self.models.channels;
        match action {
            RegisterAction::AddChannel => {
                channels.add();
            }
            RegisterAction::RemoveChannel(id) => {
                channels.remove(id)?;
            }
            RegisterAction::SetActive(id, active) => {
                channels.set_active(id, active)?;
            }
            RegisterAction::SetLabel(id, label) => {
                channels.set_label(id, label)?;
            }
        }
        Ok(())
    }

    fn resolve_close(&mut self, ctx: &egui::Context, decision: CloseDecision) -> Result<()> {
        match self.coordinator.resolve_close(decision) {
            Ok(true) => {
                self.close_confirm_open = false;
                self.allow_close = true;
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                Ok(())
            }
            Ok(false) => {
                self.close_confirm_open = false;
                Ok(())
            }
            Err(e) => {
                self.close_confirm_state.save_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    // ==================== Rendering ====================

    fn render_menu_bar(&self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        let enabled = |a: UiAction| self.coordinator.is_enabled(a);
        let menus = self.coordinator.menus();

        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui
                    .add_enabled(enabled(UiAction::LoadProjectFile), egui::Button::new(UiAction::LoadProjectFile.label()))
                    .clicked()
                {
                    if let Some(path) = self.pick_file("Project file", "mbs") {
                        actions.push(AppAction::LoadProjectFile(path));
                    }
                    ui.close();
                }
                ui.add_enabled_ui(
                    enabled(UiAction::LoadProjectFile) && !self.preferences.recent_projects.is_empty(),
                    |ui| {
                        ui.menu_button("Recent Projects", |ui| {
                            for path in &self.preferences.recent_projects {
                                let name = path
                                    .file_name()
                                    .map(|n| n.to_string_lossy().into_owned())
                                    .unwrap_or_else(|| path.display().to_string());
                                if ui.button(name).on_hover_text(path.display().to_string()).clicked() {
                                    actions.push(AppAction::LoadProjectFile(path.clone()));
                                    ui.close();
                                }
                            }
                        });
                    },
                );
                if ui
                    .add_enabled(enabled(UiAction::ReloadProjectFile), egui::Button::new(UiAction::ReloadProjectFile.label()))
                    .clicked()
                {
                    actions.push(AppAction::ReloadProjectFile);
                    ui.close();
                }
                if ui
                    .add_enabled(enabled(UiAction::ImportDataFile), egui::Button::new(UiAction::ImportDataFile.label()))
                    .clicked()
                {
                    if let Some(path) = self.pick_file("Data file", "csv") {
                        actions.push(AppAction::ImportDataFile(path));
                    }
                    ui.close();
                }

                ui.separator();

                for action in [UiAction::ExportDataCsv, UiAction::ExportImage, UiAction::ExportSettings] {
                    if ui
                        .add_enabled(enabled(action), egui::Button::new(action.label()))
                        .clicked()
                    {
                        actions.push(AppAction::External(action));
                        ui.close();
                    }
                }

                ui.separator();

                if ui.button("Quit").clicked() {
                    ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                    ui.close();
                }
            });

            ui.menu_button("Acquisition", |ui| {
                if ui
                    .add_enabled(enabled(UiAction::Start), egui::Button::new(UiAction::Start.label()))
                    .clicked()
                {
                    actions.push(AppAction::StartAcquisition);
                    ui.close();
                }
                if ui
                    .add_enabled(enabled(UiAction::Stop), egui::Button::new(UiAction::Stop.label()))
                    .clicked()
                {
                    actions.push(AppAction::StopAcquisition);
                    ui.close();
                }
                if ui.button("Clear Data").clicked() {
                    actions.push(AppAction::ClearData);
                    ui.close();
                }

                ui.separator();

                if ui
                    .add_enabled(enabled(UiAction::RegisterSettings), egui::Button::new(UiAction::RegisterSettings.label()))
                    .clicked()
                {
                    actions.push(AppAction::OpenRegisterDialog);
                    ui.close();
                }
                for action in [UiAction::ConnectionSettings, UiAction::LogSettings] {
                    if ui
                        .add_enabled(enabled(action), egui::Button::new(action.label()))
                        .clicked()
                    {
                        actions.push(AppAction::External(action));
                        ui.close();
                    }
                }
            });

            ui.menu_button("View", |ui| {
                ui.add_enabled_ui(menus.show_hide.enabled, |ui| {
                    ui.menu_button("Show/Hide", |ui| {
                        ChannelMenuPanel::render(ui, &menus.show_hide, actions);
                    });
                });
                ui.add_enabled_ui(menus.bring_to_front.enabled, |ui| {
                    ui.menu_button("Bring to Front", |ui| {
                        ChannelMenuPanel::render(ui, &menus.bring_to_front, actions);
                    });
                });

                ui.separator();

                let mut highlight = self.models.lifecycle.highlight_samples();
                if ui.checkbox(&mut highlight, "Highlight Samples").clicked() {
                    actions.push(AppAction::ToggleHighlightSamples);
                }
                let mut notes_open = self.notes_open;
                if ui.checkbox(&mut notes_open, "Notes").clicked() {
                    actions.push(AppAction::ToggleNotesWindow);
                }
            });
        });
    }

    fn legend_rows(&self) -> Vec<LegendRow> {
        let data = self.plot_data.borrow();
        self.models
            .channels
            .channels()
            .into_iter()
            .filter(|c| c.active)
            .enumerate()
            .map(|(position, c)| LegendRow {
                position,
                label: c.label,
                color: c.color,
                visible: c.visible,
                last_value: data.last_value(c.id),
            })
            .collect()
    }

    fn render_plot(&mut self, ui: &mut egui::Ui, actions: &mut Vec<AppAction>) {
        let lifecycle = &self.models.lifecycle;
        let lines = plot_lines(&self.models.channels.channels(), lifecycle.front_channel());
        let notes = self.models.notes.all();
        let plot_ctx = PlotContext {
            lines: &lines,
            notes: &notes,
            axes: AxisSettings {
                x_mode: lifecycle.x_axis_mode(),
                x_sliding_secs: lifecycle.x_sliding_secs(),
                y_mode: lifecycle.y_axis_mode(),
                y_min: lifecycle.y_min(),
                y_max: lifecycle.y_max(),
            },
            cursor_active: lifecycle.cursor_active(),
            highlight_samples: lifecycle.highlight_samples(),
            markers_active: lifecycle.markers_active(),
        };

        let context_menu = self.coordinator.context_menu();
        let point = self.plot_view.context_point();
        let data = self.plot_data.borrow();
        let mut menu_actions = Vec::new();
        let output = self.plot_view.render(ui, &data, &plot_ctx, |ui| {
            if let Some(menu) = &context_menu {
                ContextMenuPanel::render(ui, menu, point, &mut menu_actions);
            } else {
                ui.close();
            }
        });
        actions.extend(menu_actions);

        if output.marker_placed {
            actions.push(AppAction::MarkerPlaced);
        }
        if output.x_interacted && plot_ctx.axes.x_mode != XAxisMode::Manual {
            actions.push(AppAction::SetXAxisMode(XAxisMode::Manual));
        }
        if output.y_interacted && plot_ctx.axes.y_mode != YAxisMode::Manual {
            actions.push(AppAction::SetYAxisMode(YAxisMode::Manual));
        }
    }

    fn render_dialogs(&mut self, ctx: &egui::Context, actions: &mut Vec<AppAction>) {
        if let Some(request) = self.dialogs.take_register_request() {
            self.register_definitions = request.definitions;
            self.register_state = RegisterState::default();
            self.register_open = true;
        }

        if self.register_open {
            let channels = self.models.channels.channels();
            let dialog_ctx = RegisterContext {
                channels: &channels,
                definitions: self.register_definitions.as_deref(),
            };
            if let Some(action) = show_dialog::<RegisterDialog>(
                ctx,
                &mut self.register_open,
                &mut self.register_state,
                dialog_ctx,
            ) {
                actions.push(AppAction::Register(action));
            }
        }

        if let Some(AddNoteAction::Add { text, key, value }) = show_dialog::<AddNoteDialog>(
            ctx,
            &mut self.add_note_open,
            &mut self.add_note_state,
            AddNoteContext,
        ) {
            actions.push(AppAction::AddNote { text, key, value });
        }

        if self.close_confirm_open {
            let name = self
                .models
                .lifecycle
                .data_file_path()
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            if let Some(decision) = show_dialog::<CloseConfirmDialog>(
                ctx,
                &mut self.close_confirm_open,
                &mut self.close_confirm_state,
                CloseConfirmContext {
                    data_file_name: &name,
                },
            ) {
                actions.push(AppAction::ResolveClose(decision));
            }
        }

        if self.notes_open {
            let notes = self.models.notes.all();
            let dirty = self.models.notes.is_dirty();
            egui::Window::new("Notes")
                .open(&mut self.notes_open)
                .default_width(320.0)
                .show(ctx, |ui| NotesPanel::render(ui, &notes, dirty));
        }
    }
}

impl eframe::App for AcqViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_transport();
        self.poll_runtime_tick();
        self.handle_input(ctx);

        if self.models.lifecycle.phase() == Phase::Running {
            ctx.request_repaint_after(ACQUISITION_REPAINT);
        }

        let mut actions = Vec::new();

        // Menu bar
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.render_menu_bar(ui, &mut actions);
        });

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ToolbarPanel::render(ui, |a| self.coordinator.is_enabled(a), &mut actions);
        });

        // Status bar
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let status = self.coordinator.status();
            render_status_bar(
                ui,
                &StatusBarContext {
                    status: &status,
                    running: self.models.lifecycle.phase().is_running(),
                    error_count: self.models.lifecycle.error_count(),
                    last_error: self.last_error.as_deref(),
                },
            );
        });

        egui::SidePanel::right("side_panel")
            .default_width(220.0)
            .show(ctx, |ui| {
                let lifecycle = &self.models.lifecycle;
                ScalePanel::render(
                    ui,
                    ScaleValues {
                        x_mode: lifecycle.x_axis_mode(),
                        x_sliding_secs: lifecycle.x_sliding_secs(),
                        y_mode: lifecycle.y_axis_mode(),
                        y_min: lifecycle.y_min(),
                        y_max: lifecycle.y_max(),
                    },
                    &mut actions,
                );
                ui.separator();
                LegendPanel::render(ui, &self.legend_rows(), &mut actions);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.render_plot(ui, &mut actions);
        });

        self.render_dialogs(ctx, &mut actions);

        for action in actions {
            self.handle_action(ctx, action);
        }
        self.sync_title(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if self.models.lifecycle.phase().is_running() {
            self.bridge.stop();
        }
        self.bridge.shutdown();
        self.models.bus.unsubscribe(self.plot_subscription);

        let lifecycle = &self.models.lifecycle;
        self.preferences.last_dir = lifecycle.last_dir();
        self.preferences.x_sliding_secs = lifecycle.x_sliding_secs();
        self.preferences.y_min = lifecycle.y_min();
        self.preferences.y_max = lifecycle.y_max();
        if let Some(project) = lifecycle.project_file_path() {
            self.preferences.add_recent_project(project);
        }

        if let Err(e) = self.preferences.save() {
            tracing::warn!("Failed to save preferences: {}", e);
        }
    }
}
