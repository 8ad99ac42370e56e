//! # acqview: live data-acquisition viewer
//!
//! A viewer that polls numeric samples from a device into labeled channels,
//! plots them live and lets the user annotate and scale the recording. The
//! core is a reactive state layer: observable stores publish fine-grained
//! change events on a single bus, and a presentation coordinator keeps every
//! derived view element in sync with them.
//!
//! ## Architecture
//!
//! - **Model**: [`model::ChannelRegistry`], [`model::AnnotationStore`] and
//!   [`model::LifecycleState`], sharing one [`events::ChangeBus`]
//! - **Frontend**: [`frontend::PresentationCoordinator`] derives menus,
//!   status text and enabled actions; [`frontend::AcqViewApp`] renders them
//!   with eframe/egui
//! - **Transport**: a worker thread polls the device and talks to the UI
//!   over crossbeam channels through [`transport::TransportBridge`]
//! - **Persistence**: data and project file collaborators behind traits
//!
//! All stores live on the UI thread and use `Rc`/`RefCell`; only transport
//! messages cross threads.
//!
//! ## Configuration
//!
//! Preferences (last directory, recent projects, axis defaults) are stored
//! in the platform data directory under `dev.acqview`.
//!
//! ## Example
//!
//! ```
//! use acqview::model::Models;
//! use acqview::types::Phase;
//!
//! let models = Models::new();
//! let id = models.channels.add();
//! models.channels.set_label(id, "Pressure").unwrap();
//!
//! models.lifecycle.start(0).unwrap();
//! assert_eq!(models.lifecycle.phase(), Phase::Running);
//! ```

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod frontend;
pub mod model;
pub mod persistence;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use app::AcqViewApp;
pub use error::{AcqViewError, Result};
pub use events::{ChangeBus, ChangeEvent};
pub use model::Models;
pub use types::{Channel, ChannelId, Note, Phase};
