//! Dialogs
//!
//! Every egui dialog implements [`Dialog`] and is driven through
//! [`show_dialog`]. Questions the coordinator has to ask synchronously go
//! through [`DialogHost`] instead, so they can be answered by a fake in
//! tests.

use std::path::PathBuf;

use egui::{Align2, Context, Ui};

pub mod add_note;
pub mod close_confirm;
pub mod register;

pub use add_note::{AddNoteAction, AddNoteContext, AddNoteDialog, AddNoteState};
pub use close_confirm::{CloseConfirmContext, CloseConfirmDialog, CloseConfirmState};
pub use register::{RegisterAction, RegisterContext, RegisterDialog, RegisterState};

/// Dialog-side collaborator of the presentation coordinator
#[cfg_attr(test, mockall::automock)]
pub trait DialogHost {
    /// Ask whether the loaded data file may be discarded
    fn confirm_discard_loaded_data(&self) -> bool;

    /// Open the register dialog, optionally with a definitions file to import
    fn show_register_dialog(&self, definitions: Option<PathBuf>);
}

/// Outcome of rendering a dialog for one frame
#[derive(Debug, Clone, Default)]
pub enum DialogAction<A> {
    #[default]
    None,
    Close,
    /// Report `A` and close
    CloseWithAction(A),
    /// Report `A` and stay open
    Action(A),
}

impl<A> DialogAction<A> {
    pub fn should_close(&self) -> bool {
        matches!(self, Self::Close | Self::CloseWithAction(_))
    }

    pub fn into_action(self) -> Option<A> {
        if let Self::CloseWithAction(a) | Self::Action(a) = self {
            Some(a)
        } else {
            None
        }
    }
}

/// Per-dialog input state, reset whenever the dialog closes
pub trait DialogState: Default {
    fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether the dialog holds enough input to perform its action
    fn is_valid(&self) -> bool {
        true
    }
}

/// Where and how large a dialog window opens
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DialogLayout {
    /// Fixed width, pinned to the middle of the viewport
    Centered { width: f32 },
    /// Free-floating and resizable
    Floating { width: f32, height: f32 },
}

impl DialogLayout {
    fn window<'a>(self, title: &'static str) -> egui::Window<'a> {
        let window = egui::Window::new(title).collapsible(false);
        match self {
            Self::Centered { width } => window
                .resizable(false)
                .default_width(width)
                .anchor(Align2::CENTER_CENTER, [0.0, 0.0]),
            Self::Floating { width, height } => window
                .resizable(true)
                .default_width(width)
                .default_height(height),
        }
    }
}

/// A dialog with typed state, actions and render context
pub trait Dialog {
    type State: DialogState;
    type Action;
    type Context<'a>;

    fn title(state: &Self::State) -> &'static str;

    fn layout() -> DialogLayout;

    fn render(
        state: &mut Self::State,
        ctx: Self::Context<'_>,
        ui: &mut Ui,
    ) -> DialogAction<Self::Action>;
}

/// Render `D` while `is_open` is set
///
/// Closing clears the flag and resets the state. Returns the action the
/// dialog reported this frame, if any.
pub fn show_dialog<D: Dialog>(
    ctx: &Context,
    is_open: &mut bool,
    state: &mut D::State,
    dialog_ctx: D::Context<'_>,
) -> Option<D::Action> {
    if !*is_open {
        return None;
    }

    let outcome = D::layout()
        .window(D::title(state))
        .show(ctx, |ui| D::render(state, dialog_ctx, ui))
        .and_then(|response| response.inner)
        .unwrap_or(DialogAction::None);

    if outcome.should_close() {
        *is_open = false;
        state.reset();
    }
    outcome.into_action()
}
