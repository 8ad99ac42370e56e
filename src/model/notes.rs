//! Annotation store
//!
//! Ordered notes placed on the plot, plus a single dirty flag that tells the
//! close flow whether unsaved annotations would be lost.

use std::cell::RefCell;
use std::rc::Rc;

use crate::events::{ChangeBus, NoteEvent};
use crate::types::Note;

#[derive(Debug, Default)]
struct NotesState {
    notes: Vec<Note>,
    dirty: bool,
}

/// Ordered user annotations with a store-level dirty flag
#[derive(Debug)]
pub struct AnnotationStore {
    state: RefCell<NotesState>,
    bus: Rc<ChangeBus>,
}

impl AnnotationStore {
    pub fn new(bus: Rc<ChangeBus>) -> Self {
        Self {
            state: RefCell::new(NotesState::default()),
            bus,
        }
    }

    /// Append a note and mark the store dirty
    pub fn add(&self, note: Note) -> usize {
        let (index, became_dirty) = {
            let mut state = self.state.borrow_mut();
            state.notes.push(note);
            let became_dirty = !state.dirty;
            state.dirty = true;
            (state.notes.len() - 1, became_dirty)
        };

        tracing::debug!(index, "note added");
        self.bus.emit(NoteEvent::Added(index));
        if became_dirty {
            self.bus.emit(NoteEvent::DirtyChanged(true));
        }
        index
    }

    /// Remove every note. An empty store is left untouched.
    pub fn clear(&self) {
        let became_dirty = {
            let mut state = self.state.borrow_mut();
            if state.notes.is_empty() {
                return;
            }
            state.notes.clear();
            let became_dirty = !state.dirty;
            state.dirty = true;
            became_dirty
        };

        tracing::debug!("notes cleared");
        self.bus.emit(NoteEvent::Cleared);
        if became_dirty {
            self.bus.emit(NoteEvent::DirtyChanged(true));
        }
    }

    /// Snapshot of all notes in insertion order
    pub fn all(&self) -> Vec<Note> {
        self.state.borrow().notes.clone()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.borrow().notes.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.state.borrow().dirty
    }

    /// Record that the current notes have been persisted
    pub fn mark_clean(&self) {
        {
            let mut state = self.state.borrow_mut();
            if !state.dirty {
                return;
            }
            state.dirty = false;
        }
        self.bus.emit(NoteEvent::DirtyChanged(false));
    }

    /// Ask whoever owns the loaded data file to write the notes back into it
    pub fn request_data_file_update(&self) {
        self.bus.emit(NoteEvent::DataFileUpdateRequested);
    }
}
