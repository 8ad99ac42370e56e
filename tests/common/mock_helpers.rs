//! Fake collaborators and a coordinator harness
//!
//! Each fake keeps its state behind `Rc`, so the harness can hand a clone
//! to the coordinator and still inspect what happened.

use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use acqview::error::{AcqViewError, Result};
use acqview::frontend::coordinator::{Collaborators, PresentationCoordinator, RUNTIME_REFRESH};
use acqview::frontend::dialogs::DialogHost;
use acqview::frontend::runtime::{Clock, TickScheduler};
use acqview::model::Models;
use acqview::persistence::{DataFileHandler, FileHandlers, ProjectFileHandler};
use acqview::transport::AcquisitionControl;
use acqview::types::ChannelId;

/// Transport that records start/stop requests
#[derive(Clone)]
pub struct FakeTransport {
    pub starts: Rc<RefCell<Vec<Vec<ChannelId>>>>,
    pub stops: Rc<Cell<usize>>,
    pub active: Rc<Cell<bool>>,
    /// Whether start requests succeed
    pub accept: Rc<Cell<bool>>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            starts: Rc::default(),
            stops: Rc::default(),
            active: Rc::default(),
            accept: Rc::new(Cell::new(true)),
        }
    }
}

impl AcquisitionControl for FakeTransport {
    fn start(&self, channels: &[ChannelId]) -> bool {
        self.starts.borrow_mut().push(channels.to_vec());
        let accepted = self.accept.get();
        self.active.set(accepted);
        accepted
    }

    fn stop(&self) {
        self.stops.set(self.stops.get() + 1);
        self.active.set(false);
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Data file collaborator that records calls
#[derive(Clone, Default)]
pub struct FakeDataFiles {
    pub loaded: Rc<RefCell<Vec<PathBuf>>>,
    pub note_writes: Rc<RefCell<Vec<PathBuf>>>,
    pub rewrites: Rc<Cell<usize>>,
    pub fail_note_writes: Rc<Cell<bool>>,
    pub fail_rewrites: Rc<Cell<bool>>,
}

impl DataFileHandler for FakeDataFiles {
    fn load_data_file(&self, path: &Path) -> Result<()> {
        self.loaded.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn update_note_lines(&self, path: &Path) -> Result<()> {
        if self.fail_note_writes.get() {
            return Err(AcqViewError::persistence(
                Some(path.to_path_buf()),
                "Permission denied",
            ));
        }
        self.note_writes.borrow_mut().push(path.to_path_buf());
        Ok(())
    }

    fn rewrite_data_file(&self) -> Result<()> {
        self.rewrites.set(self.rewrites.get() + 1);
        if self.fail_rewrites.get() {
            return Err(AcqViewError::persistence(None, "Disk full"));
        }
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FakeProjectFiles {
    pub loaded: Rc<RefCell<Vec<PathBuf>>>,
}

impl ProjectFileHandler for FakeProjectFiles {
    fn load_project_file(&self, path: &Path) -> Result<()> {
        self.loaded.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// Dialog host with a scripted answer
#[derive(Clone)]
pub struct FakeDialogs {
    pub confirm_discard: Rc<Cell<bool>>,
    pub confirmations: Rc<Cell<usize>>,
    pub register_requests: Rc<RefCell<Vec<Option<PathBuf>>>>,
}

impl Default for FakeDialogs {
    fn default() -> Self {
        Self {
            confirm_discard: Rc::new(Cell::new(true)),
            confirmations: Rc::default(),
            register_requests: Rc::default(),
        }
    }
}

impl DialogHost for FakeDialogs {
    fn confirm_discard_loaded_data(&self) -> bool {
        self.confirmations.set(self.confirmations.get() + 1);
        self.confirm_discard.get()
    }

    fn show_register_dialog(&self, definitions: Option<PathBuf>) {
        self.register_requests.borrow_mut().push(definitions);
    }
}

/// Manually advanced clock
#[derive(Clone, Default)]
pub struct FakeClock {
    pub now_ms: Rc<Cell<i64>>,
}

impl FakeClock {
    pub fn advance(&self, by: Duration) {
        self.now_ms.set(self.now_ms.get() + by.as_millis() as i64);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.get()
    }
}

/// Scheduler that records requested delays
#[derive(Clone, Default)]
pub struct FakeScheduler {
    pub scheduled: Rc<RefCell<Vec<Duration>>>,
}

impl FakeScheduler {
    pub fn count(&self) -> usize {
        self.scheduled.borrow().len()
    }
}

impl TickScheduler for FakeScheduler {
    fn schedule_tick(&self, delay: Duration) {
        self.scheduled.borrow_mut().push(delay);
    }
}

/// A coordinator wired to fakes
pub struct Harness {
    pub models: Models,
    pub coordinator: Rc<PresentationCoordinator>,
    pub transport: FakeTransport,
    pub data_files: FakeDataFiles,
    pub project_files: FakeProjectFiles,
    pub dialogs: FakeDialogs,
    pub clock: FakeClock,
    pub scheduler: FakeScheduler,
}

impl Harness {
    pub fn new(models: Models) -> Self {
        let transport = FakeTransport::default();
        let data_files = FakeDataFiles::default();
        let project_files = FakeProjectFiles::default();
        let dialogs = FakeDialogs::default();
        let clock = FakeClock::default();
        let scheduler = FakeScheduler::default();

        let coordinator = PresentationCoordinator::new(
            models.clone(),
            Collaborators {
                transport: Rc::new(transport.clone()),
                data_files: Box::new(data_files.clone()),
                project_files: Box::new(project_files.clone()),
                dialogs: Box::new(dialogs.clone()),
                clock: Box::new(clock.clone()),
                scheduler: Box::new(scheduler.clone()),
            },
            RUNTIME_REFRESH,
        );

        Self {
            models,
            coordinator,
            transport,
            data_files,
            project_files,
            dialogs,
            clock,
            scheduler,
        }
    }
}

/// A coordinator wired to the real file handlers
pub fn coordinator_with_files(models: &Models) -> (Rc<PresentationCoordinator>, FakeTransport) {
    let transport = FakeTransport::default();
    let files = FileHandlers::new(models.clone());
    let coordinator = PresentationCoordinator::new(
        models.clone(),
        Collaborators {
            transport: Rc::new(transport.clone()),
            data_files: Box::new(files.clone()),
            project_files: Box::new(files),
            dialogs: Box::new(FakeDialogs::default()),
            clock: Box::new(FakeClock::default()),
            scheduler: Box::new(FakeScheduler::default()),
        },
        RUNTIME_REFRESH,
    );
    (coordinator, transport)
}
