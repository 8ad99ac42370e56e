//! Unsaved notes confirmation
//!
//! Shown when the window is closed while a loaded data file has note
//! changes that were not written back.

use super::{Dialog, DialogAction, DialogLayout, DialogState};
use crate::frontend::coordinator::CloseDecision;
use egui::Ui;

#[derive(Debug, Default)]
pub struct CloseConfirmState {
    /// Error of the last failed save, shown until the dialog closes
    pub save_error: Option<String>,
}

impl DialogState for CloseConfirmState {}

/// Context for rendering
pub struct CloseConfirmContext<'a> {
    pub data_file_name: &'a str,
}

pub struct CloseConfirmDialog;

impl Dialog for CloseConfirmDialog {
    type State = CloseConfirmState;
    type Action = CloseDecision;
    type Context<'a> = CloseConfirmContext<'a>;

    fn title(_state: &Self::State) -> &'static str {
        "Save Notes"
    }

    fn layout() -> DialogLayout {
        DialogLayout::Centered { width: 360.0 }
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        ui.label(format!(
            "The notes of {} have been modified.",
            ctx.data_file_name
        ));
        ui.label("Do you want to save the changes to the data file?");

        if let Some(err) = &state.save_error {
            ui.colored_label(egui::Color32::RED, err);
        }

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Save").clicked() {
                // Stays open until the coordinator reports success
                return DialogAction::Action(CloseDecision::Save);
            }
            if ui.button("Discard").clicked() {
                return DialogAction::CloseWithAction(CloseDecision::Discard);
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::CloseWithAction(CloseDecision::Cancel);
            }
            DialogAction::None
        })
        .inner
    }
}
