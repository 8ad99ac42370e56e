//! Actions produced by the UI
//!
//! Panels and menus return `AppAction`s instead of mutating state directly;
//! the app applies them after rendering, outside of any UI borrow.

use std::path::PathBuf;

use crate::frontend::coordinator::CloseDecision;
use crate::frontend::dialogs::RegisterAction;
use crate::frontend::menus::MenuCommand;
use crate::frontend::phase_view::UiAction;
use crate::types::{XAxisMode, YAxisMode};

/// Actions that any panel can emit
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    // Acquisition
    StartAcquisition,
    StopAcquisition,
    ClearData,

    // Files
    /// Route a file by its suffix
    OpenFile(PathBuf),
    ImportDataFile(PathBuf),
    LoadProjectFile(PathBuf),
    ReloadProjectFile,
    /// Settings and export actions served by other components
    External(UiAction),

    // Dialogs
    OpenRegisterDialog,
    Register(RegisterAction),
    /// Open the add-note dialog at plot coordinates
    OpenAddNote { key: f64, value: f64 },
    AddNote { text: String, key: f64, value: f64 },
    ToggleNotesWindow,
    ResolveClose(CloseDecision),

    // Plot
    Menu(MenuCommand),
    ToggleHighlightSamples,
    ClearMarkers,
    MarkerPlaced,
    SetXAxisMode(XAxisMode),
    SetXSlidingSecs(u32),
    SetYAxisMode(YAxisMode),
    SetYMin(f64),
    SetYMax(f64),
}

impl AppAction {
    /// The phase-gated UI action this maps to, if any
    pub fn gate(&self) -> Option<UiAction> {
        match self {
            AppAction::StartAcquisition => Some(UiAction::Start),
            AppAction::StopAcquisition => Some(UiAction::Stop),
            AppAction::ImportDataFile(_) => Some(UiAction::ImportDataFile),
            AppAction::LoadProjectFile(_) => Some(UiAction::LoadProjectFile),
            AppAction::ReloadProjectFile => Some(UiAction::ReloadProjectFile),
            AppAction::OpenRegisterDialog => Some(UiAction::RegisterSettings),
            AppAction::External(action) => Some(*action),
            _ => None,
        }
    }
}
