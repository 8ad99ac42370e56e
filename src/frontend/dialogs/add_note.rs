//! Add note dialog
//!
//! Collects the text of a note anchored at the position where the plot
//! context menu was opened.

use super::{Dialog, DialogAction, DialogLayout, DialogState};
use egui::Ui;

#[derive(Debug, Default)]
pub struct AddNoteState {
    pub text: String,
    /// Plot coordinates the note is anchored at
    pub key: f64,
    pub value: f64,
}

impl DialogState for AddNoteState {
    fn is_valid(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

impl AddNoteState {
    pub fn at(key: f64, value: f64) -> Self {
        Self {
            text: String::new(),
            key,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddNoteAction {
    Add { text: String, key: f64, value: f64 },
}

pub struct AddNoteContext;

pub struct AddNoteDialog;

impl Dialog for AddNoteDialog {
    type State = AddNoteState;
    type Action = AddNoteAction;
    type Context<'a> = AddNoteContext;

    fn title(_state: &Self::State) -> &'static str {
        "Add Note"
    }

    fn layout() -> DialogLayout {
        DialogLayout::Centered { width: 300.0 }
    }

    fn render(
        state: &mut Self::State,
        _ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        ui.label(format!("At {:.3}, {:.3}", state.key, state.value));
        let response = ui.text_edit_singleline(&mut state.text);
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

        ui.separator();

        ui.horizontal(|ui| {
            let add = ui
                .add_enabled(state.is_valid(), egui::Button::new("Add"))
                .clicked();
            if (add || submitted) && state.is_valid() {
                return DialogAction::CloseWithAction(AddNoteAction::Add {
                    text: state.text.trim().to_string(),
                    key: state.key,
                    value: state.value,
                });
            }
            if ui.button("Cancel").clicked() {
                return DialogAction::Close;
            }
            DialogAction::None
        })
        .inner
    }
}
