//! Register settings dialog
//!
//! Lists every channel with its active flag and label. Edits are returned
//! as actions and applied to the registry by the app.

use std::path::Path;

use super::{Dialog, DialogAction, DialogLayout, DialogState};
use crate::types::{Channel, ChannelId};
use egui::Ui;

#[derive(Debug, Default)]
pub struct RegisterState {
    /// Channel whose label is being edited, with the edit buffer
    pub editing: Option<(ChannelId, String)>,
}

impl DialogState for RegisterState {}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterAction {
    AddChannel,
    RemoveChannel(ChannelId),
    SetActive(ChannelId, bool),
    SetLabel(ChannelId, String),
}

pub struct RegisterContext<'a> {
    pub channels: &'a [Channel],
    /// Definitions file the dialog was opened with
    pub definitions: Option<&'a Path>,
}

pub struct RegisterDialog;

impl RegisterDialog {
    fn channel_row(state: &mut RegisterState, channel: &Channel, ui: &mut Ui) -> Option<RegisterAction> {
        let mut action = None;

        let mut active = channel.active;
        if ui.checkbox(&mut active, "").changed() {
            action = Some(RegisterAction::SetActive(channel.id, active));
        }
        ui.colored_label(channel.color.to_color32(), "■");

        match &mut state.editing {
            Some((id, buffer)) if *id == channel.id => {
                let response = ui.text_edit_singleline(buffer);
                if response.lost_focus() {
                    let label = buffer.trim().to_string();
                    state.editing = None;
                    if !label.is_empty() && label != channel.label {
                        action = Some(RegisterAction::SetLabel(channel.id, label));
                    }
                }
            }
            _ => {
                if ui.label(&channel.label).double_clicked() {
                    state.editing = Some((channel.id, channel.label.clone()));
                }
            }
        }

        if ui.small_button("✖").on_hover_text("Remove channel").clicked() {
            action = Some(RegisterAction::RemoveChannel(channel.id));
        }
        action
    }
}

impl Dialog for RegisterDialog {
    type State = RegisterState;
    type Action = RegisterAction;
    type Context<'a> = RegisterContext<'a>;

    fn title(_state: &Self::State) -> &'static str {
        "Register Settings"
    }

    fn layout() -> DialogLayout {
        DialogLayout::Floating {
            width: 420.0,
            height: 360.0,
        }
    }

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action> {
        if let Some(path) = ctx.definitions {
            ui.label(
                egui::RichText::new(format!("Definitions: {}", path.display())).small(),
            );
            ui.separator();
        }

        let mut action = None;
        egui::ScrollArea::vertical()
            .max_height(260.0)
            .show(ui, |ui| {
                if ctx.channels.is_empty() {
                    ui.weak("No channels defined");
                }
                for channel in ctx.channels {
                    ui.horizontal(|ui| {
                        if let Some(a) = Self::channel_row(state, channel, ui) {
                            action = Some(a);
                        }
                    });
                }
            });

        ui.separator();

        ui.horizontal(|ui| {
            if ui.button("Add Channel").clicked() {
                action = Some(RegisterAction::AddChannel);
            }
            if ui.button("Close").clicked() {
                return DialogAction::Close;
            }
            match action.take() {
                Some(a) => DialogAction::Action(a),
                None => DialogAction::None,
            }
        })
        .inner
    }
}
