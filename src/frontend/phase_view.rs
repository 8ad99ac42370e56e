//! Per-phase presentation table
//!
//! The enabled actions and status fields depend on the lifecycle phase
//! alone, apart from the project-file gate on [`UiAction::ReloadProjectFile`].

use crate::types::Phase;

/// User-triggerable actions whose availability depends on the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiAction {
    Start,
    Stop,
    ConnectionSettings,
    LogSettings,
    RegisterSettings,
    ImportDataFile,
    LoadProjectFile,
    ReloadProjectFile,
    ExportDataCsv,
    ExportImage,
    ExportSettings,
}

impl UiAction {
    pub fn all() -> &'static [UiAction] {
        &[
            UiAction::Start,
            UiAction::Stop,
            UiAction::ConnectionSettings,
            UiAction::LogSettings,
            UiAction::RegisterSettings,
            UiAction::ImportDataFile,
            UiAction::LoadProjectFile,
            UiAction::ReloadProjectFile,
            UiAction::ExportDataCsv,
            UiAction::ExportImage,
            UiAction::ExportSettings,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            UiAction::Start => "Start",
            UiAction::Stop => "Stop",
            UiAction::ConnectionSettings => "Connection Settings...",
            UiAction::LogSettings => "Log Settings...",
            UiAction::RegisterSettings => "Register Settings...",
            UiAction::ImportDataFile => "Import Data File...",
            UiAction::LoadProjectFile => "Load Project File...",
            UiAction::ReloadProjectFile => "Reload Project File",
            UiAction::ExportDataCsv => "Export Data (CSV)...",
            UiAction::ExportImage => "Export Image...",
            UiAction::ExportSettings => "Export Settings...",
        }
    }
}

/// How a status field reacts to entering a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Show the zero value
    Reset,
    /// Show the current counters
    Live,
    /// Leave text and visibility untouched
    Keep,
    /// Hide and empty the field
    Hide,
}

/// Everything the shell derives from the phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasePresentation {
    pub label: &'static str,
    pub enabled: &'static [UiAction],
    pub runtime: FieldUpdate,
    pub stats: FieldUpdate,
}

const IDLE_ACTIONS: &[UiAction] = &[
    UiAction::Start,
    UiAction::ConnectionSettings,
    UiAction::LogSettings,
    UiAction::RegisterSettings,
    UiAction::ImportDataFile,
    UiAction::LoadProjectFile,
    UiAction::ExportSettings,
    UiAction::ReloadProjectFile,
];

const RUNNING_ACTIONS: &[UiAction] = &[UiAction::Stop];

const STOPPED_ACTIONS: &[UiAction] = &[
    UiAction::Start,
    UiAction::ConnectionSettings,
    UiAction::LogSettings,
    UiAction::RegisterSettings,
    UiAction::ImportDataFile,
    UiAction::LoadProjectFile,
    UiAction::ExportDataCsv,
    UiAction::ExportSettings,
    UiAction::ExportImage,
    UiAction::ReloadProjectFile,
];

const DATA_LOADED_ACTIONS: &[UiAction] = &[
    UiAction::Start,
    UiAction::ConnectionSettings,
    UiAction::LogSettings,
    UiAction::RegisterSettings,
    UiAction::ImportDataFile,
    UiAction::LoadProjectFile,
    UiAction::ExportImage,
];

impl PhasePresentation {
    pub fn for_phase(phase: Phase) -> Self {
        match phase {
            Phase::Idle => Self {
                label: "Stopped",
                enabled: IDLE_ACTIONS,
                runtime: FieldUpdate::Reset,
                stats: FieldUpdate::Reset,
            },
            Phase::Running => Self {
                label: "Running",
                enabled: RUNNING_ACTIONS,
                runtime: FieldUpdate::Reset,
                stats: FieldUpdate::Live,
            },
            Phase::Stopped => Self {
                label: "Stopped",
                enabled: STOPPED_ACTIONS,
                runtime: FieldUpdate::Keep,
                stats: FieldUpdate::Keep,
            },
            Phase::DataLoaded => Self {
                label: "Data File loaded",
                enabled: DATA_LOADED_ACTIONS,
                runtime: FieldUpdate::Hide,
                stats: FieldUpdate::Hide,
            },
        }
    }

    /// Whether `action` is enabled, given whether a project file is associated
    pub fn allows(&self, action: UiAction, has_project_file: bool) -> bool {
        if action == UiAction::ReloadProjectFile && !has_project_file {
            return false;
        }
        self.enabled.contains(&action)
    }
}

/// Counter text shown in the status bar
pub fn stats_text(successes: u64, errors: u64) -> String {
    format!("Success: {}\tErrors: {}", successes, errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_only_allows_stop() {
        let p = PhasePresentation::for_phase(Phase::Running);
        for action in UiAction::all() {
            assert_eq!(p.allows(*action, true), *action == UiAction::Stop);
        }
        assert_eq!(p.label, "Running");
    }

    #[test]
    fn test_reload_gated_on_project_file() {
        for phase in [Phase::Idle, Phase::Stopped] {
            let p = PhasePresentation::for_phase(phase);
            assert!(!p.allows(UiAction::ReloadProjectFile, false));
            assert!(p.allows(UiAction::ReloadProjectFile, true));
        }
        let loaded = PhasePresentation::for_phase(Phase::DataLoaded);
        assert!(!loaded.allows(UiAction::ReloadProjectFile, true));
    }

    #[test]
    fn test_export_availability() {
        let idle = PhasePresentation::for_phase(Phase::Idle);
        assert!(!idle.allows(UiAction::ExportDataCsv, false));
        assert!(!idle.allows(UiAction::ExportImage, false));
        assert!(idle.allows(UiAction::ExportSettings, false));

        let stopped = PhasePresentation::for_phase(Phase::Stopped);
        assert!(stopped.allows(UiAction::ExportDataCsv, false));

        let loaded = PhasePresentation::for_phase(Phase::DataLoaded);
        assert!(!loaded.allows(UiAction::ExportDataCsv, false));
        assert!(!loaded.allows(UiAction::ExportSettings, false));
        assert!(loaded.allows(UiAction::ExportImage, false));
        assert_eq!(loaded.label, "Data File loaded");
        assert_eq!(loaded.stats, FieldUpdate::Hide);
    }

    #[test]
    fn test_stats_text() {
        assert_eq!(stats_text(0, 0), "Success: 0\tErrors: 0");
        assert_eq!(stats_text(12, 3), "Success: 12\tErrors: 3");
    }
}
