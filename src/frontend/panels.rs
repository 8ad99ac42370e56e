//! Panel components for the frontend UI
//!
//! Each panel renders from projections handed in by the app and pushes
//! [`AppAction`]s instead of touching the stores.
//!
//! # Panels
//!
//! - [`ChannelMenuPanel`] - Show/hide and bring-to-front menus
//! - [`ContextMenuPanel`] - Plot context menu
//! - [`ToolbarPanel`] - Start/stop/clear controls
//! - [`ScalePanel`] - Axis scaling controls
//! - [`LegendPanel`] - Active channels with their latest values
//! - [`NotesPanel`] - List of notes

use egui::{RichText, Ui};

use crate::frontend::menus::{ChannelMenu, ContextAction, ContextMenu, MenuCommand, MenuKind};
use crate::frontend::phase_view::UiAction;
use crate::frontend::state::AppAction;
use crate::types::{Note, Rgb, XAxisMode, YAxisMode};

fn swatch(label: &str, color: Rgb) -> RichText {
    RichText::new(format!("■ {}", label)).color(color.to_color32())
}

/// Renders a channel menu as checkboxes or radio buttons
pub struct ChannelMenuPanel;

impl ChannelMenuPanel {
    pub fn render(ui: &mut Ui, menu: &ChannelMenu, actions: &mut Vec<AppAction>) {
        ui.add_enabled_ui(menu.enabled, |ui| {
            if menu.entries.is_empty() {
                ui.weak("No channels");
            }
            for entry in menu.entries.iter().filter(|e| e.visible) {
                let text = swatch(&entry.label, entry.color);
                let clicked = match menu.kind {
                    MenuKind::ShowHide => {
                        let mut checked = entry.checked;
                        ui.checkbox(&mut checked, text).clicked()
                    }
                    MenuKind::BringToFront => ui.radio(entry.checked, text).clicked(),
                };
                if clicked {
                    actions.push(AppAction::Menu(menu.command_for(entry)));
                    ui.close();
                }
            }
        });
    }
}

/// Renders the plot context menu
pub struct ContextMenuPanel;

impl ContextMenuPanel {
    pub fn render(
        ui: &mut Ui,
        menu: &ContextMenu,
        point: Option<[f64; 2]>,
        actions: &mut Vec<AppAction>,
    ) {
        ui.menu_button("Bring to Front", |ui| {
            ChannelMenuPanel::render(ui, &menu.bring_to_front, actions);
        });
        ui.menu_button("Show/Hide", |ui| {
            ChannelMenuPanel::render(ui, &menu.show_hide, actions);
        });

        for group in &menu.groups {
            ui.separator();
            for action in group {
                let clicked = match action {
                    ContextAction::ToggleHighlightSamples => {
                        let mut checked = menu.highlight_samples;
                        ui.checkbox(&mut checked, action.label()).clicked()
                    }
                    ContextAction::AddNote => ui
                        .add_enabled(point.is_some(), egui::Button::new(action.label()))
                        .clicked(),
                    _ => ui.button(action.label()).clicked(),
                };
                if !clicked {
                    continue;
                }
                let app_action = match action {
                    ContextAction::ToggleHighlightSamples => AppAction::ToggleHighlightSamples,
                    ContextAction::ClearData => AppAction::ClearData,
                    ContextAction::ClearMarkers => AppAction::ClearMarkers,
                    ContextAction::ManageNotes => AppAction::ToggleNotesWindow,
                    ContextAction::AddNote => match point {
                        Some([key, value]) => AppAction::OpenAddNote { key, value },
                        None => continue,
                    },
                };
                actions.push(app_action);
                ui.close();
            }
        }
    }
}

/// Start/stop/clear controls
pub struct ToolbarPanel;

impl ToolbarPanel {
    pub fn render(
        ui: &mut Ui,
        is_enabled: impl Fn(UiAction) -> bool,
        actions: &mut Vec<AppAction>,
    ) {
        ui.horizontal(|ui| {
            if ui
                .add_enabled(is_enabled(UiAction::Start), egui::Button::new("▶ Start"))
                .clicked()
            {
                actions.push(AppAction::StartAcquisition);
            }
            if ui
                .add_enabled(is_enabled(UiAction::Stop), egui::Button::new("⏹ Stop"))
                .clicked()
            {
                actions.push(AppAction::StopAcquisition);
            }
            if ui.button("Clear Data").clicked() {
                actions.push(AppAction::ClearData);
            }

            ui.separator();

            if ui
                .add_enabled(
                    is_enabled(UiAction::RegisterSettings),
                    egui::Button::new("Registers..."),
                )
                .clicked()
            {
                actions.push(AppAction::OpenRegisterDialog);
            }
        });
    }
}

/// Axis scaling values shown by [`ScalePanel`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleValues {
    pub x_mode: XAxisMode,
    pub x_sliding_secs: u32,
    pub y_mode: YAxisMode,
    pub y_min: f64,
    pub y_max: f64,
}

/// Axis scaling controls
pub struct ScalePanel;

impl ScalePanel {
    pub fn render(ui: &mut Ui, values: ScaleValues, actions: &mut Vec<AppAction>) {
        ui.heading("Scale");

        ui.label("X axis");
        let mut x_mode = values.x_mode;
        egui::ComboBox::from_id_salt("x_axis_mode")
            .selected_text(x_mode.display_name())
            .show_ui(ui, |ui| {
                for mode in XAxisMode::all() {
                    ui.selectable_value(&mut x_mode, *mode, mode.display_name());
                }
            });
        if x_mode != values.x_mode {
            actions.push(AppAction::SetXAxisMode(x_mode));
        }

        let mut secs = values.x_sliding_secs;
        ui.add_enabled_ui(values.x_mode == XAxisMode::Sliding, |ui| {
            ui.add(egui::DragValue::new(&mut secs).range(1..=86_400).suffix(" s"));
        });
        if secs != values.x_sliding_secs {
            actions.push(AppAction::SetXSlidingSecs(secs));
        }

        ui.separator();

        ui.label("Y axis");
        let mut y_mode = values.y_mode;
        egui::ComboBox::from_id_salt("y_axis_mode")
            .selected_text(y_mode.display_name())
            .show_ui(ui, |ui| {
                for mode in YAxisMode::all() {
                    ui.selectable_value(&mut y_mode, *mode, mode.display_name());
                }
            });
        if y_mode != values.y_mode {
            actions.push(AppAction::SetYAxisMode(y_mode));
        }

        let (mut y_min, mut y_max) = (values.y_min, values.y_max);
        ui.add_enabled_ui(values.y_mode == YAxisMode::MinMax, |ui| {
            ui.horizontal(|ui| {
                ui.label("Min");
                ui.add(egui::DragValue::new(&mut y_min).speed(0.1));
            });
            ui.horizontal(|ui| {
                ui.label("Max");
                ui.add(egui::DragValue::new(&mut y_max).speed(0.1));
            });
        });
        if y_min != values.y_min {
            actions.push(AppAction::SetYMin(y_min));
        }
        if y_max != values.y_max {
            actions.push(AppAction::SetYMax(y_max));
        }
    }
}

/// One row of the legend
#[derive(Debug, Clone, PartialEq)]
pub struct LegendRow {
    pub position: usize,
    pub label: String,
    pub color: Rgb,
    pub visible: bool,
    pub last_value: Option<f64>,
}

/// Active channels with their latest values
pub struct LegendPanel;

impl LegendPanel {
    pub fn render(ui: &mut Ui, rows: &[LegendRow], actions: &mut Vec<AppAction>) {
        ui.heading("Legend");
        if rows.is_empty() {
            ui.weak("No active channels");
            return;
        }
        egui::Grid::new("legend_grid").striped(true).show(ui, |ui| {
            for row in rows {
                let mut visible = row.visible;
                if ui.checkbox(&mut visible, swatch(&row.label, row.color)).clicked() {
                    actions.push(AppAction::Menu(MenuCommand::ToggleShowHide {
                        position: row.position,
                        visible,
                    }));
                }
                let value = row
                    .last_value
                    .map(|v| format!("{:.3}", v))
                    .unwrap_or_else(|| "-".to_string());
                ui.label(RichText::new(value).monospace());
                ui.end_row();
            }
        });
    }
}

/// Notes list window content
pub struct NotesPanel;

impl NotesPanel {
    pub fn render(ui: &mut Ui, notes: &[Note], dirty: bool) {
        if notes.is_empty() {
            ui.weak("No notes");
        }
        for note in notes {
            ui.horizontal(|ui| {
                ui.label(RichText::new(format!("{:.3}, {:.3}", note.key, note.value)).small());
                ui.label(&note.text);
            });
        }
        if dirty {
            ui.separator();
            ui.label(RichText::new("Unsaved changes").small().italics());
        }
    }
}
