//! Test data builders for creating store contents

use std::path::PathBuf;

use acqview::model::Models;
use acqview::types::{ChannelId, Note};

/// Builder for pre-populated stores
pub struct ModelsBuilder {
    channels: usize,
    inactive: Vec<usize>,
    labels: Vec<(usize, String)>,
    notes: Vec<Note>,
    data_file: Option<PathBuf>,
    project_file: Option<PathBuf>,
}

impl ModelsBuilder {
    pub fn new() -> Self {
        Self {
            channels: 0,
            inactive: Vec::new(),
            labels: Vec::new(),
            notes: Vec::new(),
            data_file: None,
            project_file: None,
        }
    }

    pub fn channels(mut self, count: usize) -> Self {
        self.channels = count;
        self
    }

    /// Deactivate the channel at this full index
    pub fn inactive(mut self, index: usize) -> Self {
        self.inactive.push(index);
        self
    }

    pub fn label(mut self, index: usize, label: &str) -> Self {
        self.labels.push((index, label.to_string()));
        self
    }

    pub fn note(mut self, key: f64, value: f64, text: &str) -> Self {
        self.notes.push(Note::new(key, value, text));
        self
    }

    /// Finish in the DataLoaded phase with this file associated
    pub fn data_loaded(mut self, path: &str) -> Self {
        self.data_file = Some(PathBuf::from(path));
        self
    }

    pub fn project_file(mut self, path: &str) -> Self {
        self.project_file = Some(PathBuf::from(path));
        self
    }

    pub fn build(self) -> (Models, Vec<ChannelId>) {
        let models = Models::new();
        let ids: Vec<ChannelId> = (0..self.channels).map(|_| models.channels.add()).collect();

        // Labels first: inactive channels cannot be renamed
        for (index, label) in self.labels {
            models.channels.set_label(ids[index], label).unwrap();
        }
        for index in self.inactive {
            models.channels.set_active(ids[index], false).unwrap();
        }
        for note in self.notes {
            models.notes.add(note);
        }
        if let Some(path) = self.project_file {
            models.lifecycle.set_project_file_path(Some(path));
        }
        if let Some(path) = self.data_file {
            models.lifecycle.enter_data_loaded().unwrap();
            models.lifecycle.set_data_file_path(Some(path));
        }
        (models, ids)
    }
}

impl Default for ModelsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_models_builder() {
        let (models, ids) = ModelsBuilder::new()
            .channels(3)
            .inactive(1)
            .label(0, "Pressure")
            .note(1.0, 2.0, "n")
            .build();

        assert_eq!(ids.len(), 3);
        assert_eq!(models.channels.active_count(), 2);
        assert_eq!(models.channels.label(ids[0]).as_deref(), Some("Pressure"));
        assert_eq!(models.notes.len(), 1);
    }
}
