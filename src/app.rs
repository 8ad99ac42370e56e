//! Application module
//!
//! Re-exports the main application type and its start-up options from the
//! frontend module.

pub use crate::frontend::{AcqViewApp, AppOptions};
