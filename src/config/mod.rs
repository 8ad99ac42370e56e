//! User preferences for acqview
//!
//! Preferences are stored as pretty-printed JSON in the platform data
//! directory:
//! - **Linux**: `~/.local/share/dev.acqview/`
//! - **macOS**: `~/Library/Application Support/dev.acqview/`
//! - **Windows**: `%APPDATA%\dev.acqview\`
//!
//! The same directory receives the rolling log files written by the binary.

use crate::error::{AcqViewError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.acqview";

/// Preferences filename
pub const PREFERENCES_FILE: &str = "preferences.json";

/// Maximum number of recent project files to remember
pub const MAX_RECENT_PROJECTS: usize = 8;

/// Default runtime display refresh interval
pub const DEFAULT_RUNTIME_REFRESH_MS: u64 = 250;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        AcqViewError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            AcqViewError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the preferences file
pub fn preferences_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(PREFERENCES_FILE))
}

// ==================== Preferences ====================

/// Persistent user preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Version for future migration support
    #[serde(default = "default_version")]
    pub version: u32,

    /// Directory last used in a file dialog
    #[serde(default)]
    pub last_dir: Option<PathBuf>,

    /// Recently opened project files, most recent first
    #[serde(default)]
    pub recent_projects: Vec<PathBuf>,

    /// Initial width of the sliding x window in seconds
    #[serde(default = "default_x_sliding_secs")]
    pub x_sliding_secs: u32,

    /// Initial lower bound for the min/max y scaling
    #[serde(default)]
    pub y_min: f64,

    /// Initial upper bound for the min/max y scaling
    #[serde(default = "default_y_max")]
    pub y_max: f64,

    /// Runtime display refresh interval in milliseconds
    #[serde(default = "default_runtime_refresh_ms")]
    pub runtime_refresh_ms: u64,

    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_version() -> u32 {
    1
}

fn default_x_sliding_secs() -> u32 {
    30
}

fn default_y_max() -> f64 {
    10.0
}

fn default_runtime_refresh_ms() -> u64 {
    DEFAULT_RUNTIME_REFRESH_MS
}

fn default_true() -> bool {
    true
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: 1,
            last_dir: None,
            recent_projects: Vec::new(),
            x_sliding_secs: default_x_sliding_secs(),
            y_min: 0.0,
            y_max: default_y_max(),
            runtime_refresh_ms: DEFAULT_RUNTIME_REFRESH_MS,
            dark_mode: true,
        }
    }
}

impl Preferences {
    /// Load preferences from the default location
    pub fn load() -> Result<Self> {
        let path = preferences_path().ok_or_else(|| {
            AcqViewError::Config("Could not determine preferences path".to_string())
        })?;
        Self::load_from(&path)
    }

    /// Load preferences from an explicit path; a missing file yields defaults
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| AcqViewError::Config(format!("Failed to read preferences: {}", e)))?;

        let prefs: Self = serde_json::from_str(&content)
            .map_err(|e| AcqViewError::Config(format!("Failed to parse preferences: {}", e)))?;
        prefs.validated()
    }

    /// Load preferences, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load preferences, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save preferences to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(PREFERENCES_FILE))
    }

    /// Save preferences to an explicit path
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            AcqViewError::Config(format!("Failed to serialize preferences: {}", e))
        })?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| AcqViewError::Config(format!("Failed to write preferences: {}", e)))
    }

    fn validated(self) -> Result<Self> {
        if self.runtime_refresh_ms == 0 {
            return Err(AcqViewError::Config(
                "runtime_refresh_ms must be greater than zero".to_string(),
            ));
        }
        if self.y_min >= self.y_max {
            return Err(AcqViewError::Config(format!(
                "y_min ({}) must be below y_max ({})",
                self.y_min, self.y_max
            )));
        }
        Ok(self)
    }

    /// Runtime display refresh interval
    pub fn runtime_refresh(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.runtime_refresh_ms)
    }

    /// Add or move a project file to the front of the recent list
    pub fn add_recent_project(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.recent_projects.retain(|p| *p != path);
        self.recent_projects.insert(0, path);
        self.recent_projects.truncate(MAX_RECENT_PROJECTS);
    }

    /// Drop recent entries whose files no longer exist
    pub fn cleanup_missing_projects(&mut self) {
        self.recent_projects.retain(|p| p.exists());
    }
}
