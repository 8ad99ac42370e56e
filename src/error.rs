//! Error handling for acqview
//!
//! Every rejected operation in the core maps onto one variant here. A
//! rejected mutator never changes state and never emits a change event, so
//! callers can treat an `Err` as "nothing happened".

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{ChannelId, Phase};

/// Main error type for acqview operations
#[derive(Error, Debug)]
pub enum AcqViewError {
    /// The lifecycle state machine does not allow this transition
    #[error("Illegal transition from {from} to {to}")]
    IllegalTransition { from: Phase, to: Phase },

    /// Counters can only be updated while acquisition is running
    #[error("Acquisition is not running (phase: {0})")]
    NotRunning(Phase),

    /// No channel with this id exists in the registry
    #[error("Channel {0} not found")]
    ChannelNotFound(ChannelId),

    /// The channel exists but does not take part in acquisition
    #[error("Channel {0} is not active")]
    NotActive(ChannelId),

    /// Acquisition needs at least one active channel
    #[error("There are no active channels. Please select at least one channel.")]
    NoActiveChannels,

    /// File dispatch or dialogs are refused while acquisition runs
    #[error("Operation refused while acquisition is running")]
    AcquisitionActive,

    /// Data or project file collaborator failed
    #[error("Persistence error ({path:?}): {message}")]
    Persistence {
        path: Option<PathBuf>,
        message: String,
    },

    /// Transport collaborator failed
    #[error("Transport error: {0}")]
    Transport(String),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AcqViewError>,
    },
}

impl AcqViewError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AcqViewError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a persistence error for a file
    pub fn persistence(path: Option<PathBuf>, message: impl Into<String>) -> Self {
        AcqViewError::Persistence {
            path,
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for AcqViewError {
    fn from(err: serde_json::Error) -> Self {
        AcqViewError::Serialization(err.to_string())
    }
}

/// Result type alias for acqview operations
pub type Result<T> = std::result::Result<T, AcqViewError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
