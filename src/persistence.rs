//! File collaborators
//!
//! The core never touches storage itself. It reaches data and project files
//! through the two traits below; [`FileHandlers`] is the implementation the
//! binary wires in.
//!
//! # Data file layout
//!
//! ```text
//! //acqview data log
//! //Note;12.5;3.2;pump switched on
//! Time (ms);Pressure;Flow
//! 0;1.2;0.4
//! 100;1.3;0.5
//! ```
//!
//! Lines starting with `//` are comments; `//Note;` comments carry one
//! annotation each. The first non-comment line is the header. Fields are
//! separated by `;` or `,`.

use std::path::{Path, PathBuf};

use crate::error::{AcqViewError, Result};
use crate::events::DataEvent;
use crate::model::Models;
use crate::types::{Note, Phase, SampleBatch};

const COMMENT_PREFIX: &str = "//";
const NOTE_PREFIX: &str = "//Note;";

/// Access to recorded data files
#[cfg_attr(test, mockall::automock)]
pub trait DataFileHandler {
    /// Import a data file and enter the DataLoaded phase
    fn load_data_file(&self, path: &Path) -> Result<()>;

    /// Write the current notes back into a loaded data file
    fn update_note_lines(&self, path: &Path) -> Result<()>;

    /// Restart the log written during acquisition
    fn rewrite_data_file(&self) -> Result<()>;
}

/// Access to project files
#[cfg_attr(test, mockall::automock)]
pub trait ProjectFileHandler {
    fn load_project_file(&self, path: &Path) -> Result<()>;
}

/// Parsed contents of a data file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataFileContents {
    /// Channel labels from the header, time column excluded
    pub labels: Vec<String>,
    /// `(timestamp_ms, values)` per data line
    pub rows: Vec<(i64, Vec<f64>)>,
    pub notes: Vec<Note>,
}

fn split_fields(line: &str) -> Vec<&str> {
    let separator = if line.contains(';') { ';' } else { ',' };
    line.split(separator).map(str::trim).collect()
}

fn parse_note(line: &str) -> Option<Note> {
    let rest = line.strip_prefix(NOTE_PREFIX)?;
    let mut fields = rest.splitn(3, ';');
    let key = fields.next()?.trim().parse().ok()?;
    let value = fields.next()?.trim().parse().ok()?;
    let text = fields.next().unwrap_or_default();
    Some(Note::new(key, value, text))
}

fn format_note(note: &Note) -> String {
    format!("{}{};{};{}", NOTE_PREFIX, note.key, note.value, note.text)
}

/// Parse data file text
pub fn parse_data_file(content: &str) -> Result<DataFileContents> {
    let mut contents = DataFileContents::default();
    let mut header_seen = false;

    for (line_no, line) in content.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(COMMENT_PREFIX) {
            if let Some(note) = parse_note(line) {
                contents.notes.push(note);
            }
            continue;
        }

        let fields = split_fields(line);
        if !header_seen {
            header_seen = true;
            contents.labels = fields.iter().skip(1).map(|s| s.to_string()).collect();
            continue;
        }

        let bad_line = || {
            AcqViewError::persistence(None, format!("Invalid data on line {}", line_no + 1))
        };
        let timestamp = fields
            .first()
            .and_then(|f| f.parse::<f64>().ok())
            .ok_or_else(bad_line)? as i64;
        let values = fields
            .iter()
            .skip(1)
            .map(|f| f.parse::<f64>().map_err(|_| bad_line()))
            .collect::<Result<Vec<_>>>()?;
        contents.rows.push((timestamp, values));
    }

    if !header_seen {
        return Err(AcqViewError::persistence(None, "Data file has no header line"));
    }
    Ok(contents)
}

/// Replace the note comments of a data file with `notes`.
///
/// New note lines go after the remaining leading comments, directly before
/// the header.
pub fn replace_note_lines(content: &str, notes: &[Note]) -> String {
    let mut out = Vec::new();
    let mut inserted = false;

    for line in content.lines() {
        if line.starts_with(NOTE_PREFIX) {
            continue;
        }
        if !inserted && !line.starts_with(COMMENT_PREFIX) {
            out.extend(notes.iter().map(format_note));
            inserted = true;
        }
        out.push(line.to_string());
    }
    if !inserted {
        out.extend(notes.iter().map(format_note));
    }

    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// File collaborators used by the application
#[derive(Debug, Clone)]
pub struct FileHandlers {
    models: Models,
}

impl FileHandlers {
    pub fn new(models: Models) -> Self {
        Self { models }
    }

    fn read(path: &Path) -> Result<String> {
        std::fs::read_to_string(path)
            .map_err(|e| AcqViewError::persistence(Some(path.to_path_buf()), e.to_string()))
    }

    fn apply(&self, path: PathBuf, contents: DataFileContents) -> Result<()> {
        let models = &self.models;

        match models.lifecycle.phase() {
            Phase::Running => return Err(AcqViewError::AcquisitionActive),
            Phase::DataLoaded => models.discard_loaded_data()?,
            Phase::Idle | Phase::Stopped => {}
        }
        models.channels.clear();
        models.notes.clear();

        for label in &contents.labels {
            let id = models.channels.add();
            models.channels.set_label(id, label.clone())?;
        }
        for note in contents.notes {
            models.notes.add(note);
        }
        models.notes.mark_clean();

        models.lifecycle.enter_data_loaded()?;
        models.lifecycle.set_data_file_path(Some(path));

        models.bus.emit(DataEvent::Cleared);
        for (timestamp_ms, values) in contents.rows {
            let results = values.into_iter().map(|v| (true, v)).collect();
            models
                .bus
                .emit(DataEvent::SamplesReceived(SampleBatch::new(timestamp_ms, results)));
        }
        Ok(())
    }
}

impl DataFileHandler for FileHandlers {
    fn load_data_file(&self, path: &Path) -> Result<()> {
        let content = Self::read(path)?;
        let contents = parse_data_file(&content).map_err(|e| match e {
            AcqViewError::Persistence { message, .. } => {
                AcqViewError::persistence(Some(path.to_path_buf()), message)
            }
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            channels = contents.labels.len(),
            rows = contents.rows.len(),
            notes = contents.notes.len(),
            "data file loaded"
        );
        self.apply(path.to_path_buf(), contents)
    }

    fn update_note_lines(&self, path: &Path) -> Result<()> {
        let content = Self::read(path)?;
        let updated = replace_note_lines(&content, &self.models.notes.all());
        std::fs::write(path, updated)
            .map_err(|e| AcqViewError::persistence(Some(path.to_path_buf()), e.to_string()))?;
        tracing::info!(path = %path.display(), "notes written to data file");
        Ok(())
    }

    fn rewrite_data_file(&self) -> Result<()> {
        // No log is written during acquisition
        tracing::debug!("data log rewrite requested");
        Ok(())
    }
}

impl ProjectFileHandler for FileHandlers {
    fn load_project_file(&self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(AcqViewError::persistence(
                Some(path.to_path_buf()),
                "Project file does not exist",
            ));
        }
        tracing::info!(path = %path.display(), "project file associated");
        self.models
            .lifecycle
            .set_project_file_path(Some(path.to_path_buf()));
        Ok(())
    }
}
