//! Thread boundary between the acquisition transport and the UI thread.
//!
//! The transport runs on its own thread and never touches the stores. It
//! reports poll results over a bounded crossbeam channel; the UI thread
//! drains them each frame through [`SampleRouter`], which is the only place
//! results enter the core.

pub mod mock;

use std::cell::Cell;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::events::DataEvent;
use crate::model::Models;
use crate::types::{ChannelId, SampleBatch};

/// Control surface of the acquisition transport
#[cfg_attr(test, mockall::automock)]
pub trait AcquisitionControl {
    /// Begin polling the given channels. Returns false if the transport
    /// refused to start.
    fn start(&self, channels: &[ChannelId]) -> bool;

    fn stop(&self);

    fn is_active(&self) -> bool;
}

/// Commands sent from the UI thread to the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    /// Start polling these channels, in active order
    Start(Vec<ChannelId>),
    Stop,
    /// Shut down the transport thread
    Shutdown,
}

/// Messages sent from the transport to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub enum TransportMessage {
    /// One completed poll cycle
    Samples(SampleBatch),
    /// The transport reported a failure
    Error(String),
    /// Transport thread is shutting down
    Shutdown,
}

/// Channel capacity for commands (UI → transport)
const CMD_CHANNEL_CAPACITY: usize = 64;
/// Channel capacity for messages (transport → UI).
/// 4,096 cycles ≈ 40s at a 10 ms poll interval.
const MSG_CHANNEL_CAPACITY: usize = 4_096;

/// UI-side handle for communicating with the transport thread
pub struct TransportBridge {
    cmd_tx: Sender<TransportCommand>,
    msg_rx: Receiver<TransportMessage>,
    active: Cell<bool>,
}

impl TransportBridge {
    /// Create a new bridge: `(bridge_for_ui, cmd_rx, msg_tx)`.
    ///
    /// The transport thread owns `cmd_rx` and `msg_tx`.
    pub fn new() -> (Self, Receiver<TransportCommand>, Sender<TransportMessage>) {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAPACITY);
        let (msg_tx, msg_rx) = bounded(MSG_CHANNEL_CAPACITY);
        (
            Self {
                cmd_tx,
                msg_rx,
                active: Cell::new(false),
            },
            cmd_rx,
            msg_tx,
        )
    }

    /// Drain all pending messages
    pub fn drain(&self) -> Vec<TransportMessage> {
        let mut msgs = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            msgs.push(msg);
        }
        msgs
    }

    pub fn send_command(&self, cmd: TransportCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    pub fn shutdown(&self) {
        self.active.set(false);
        let _ = self.cmd_tx.send(TransportCommand::Shutdown);
    }
}

impl AcquisitionControl for TransportBridge {
    fn start(&self, channels: &[ChannelId]) -> bool {
        let sent = self.send_command(TransportCommand::Start(channels.to_vec()));
        if !sent {
            tracing::warn!("transport thread is gone, cannot start acquisition");
        }
        self.active.set(sent);
        sent
    }

    fn stop(&self) {
        if !self.send_command(TransportCommand::Stop) {
            tracing::warn!("transport thread is gone, stop not delivered");
        }
        self.active.set(false);
    }

    fn is_active(&self) -> bool {
        self.active.get()
    }
}

/// Routes transport results into the stores and onto the bus
#[derive(Debug, Clone)]
pub struct SampleRouter {
    models: Models,
}

impl SampleRouter {
    pub fn new(models: Models) -> Self {
        Self { models }
    }

    /// Apply one transport message. Returns the error text of failures so
    /// the caller can surface them.
    pub fn route(&self, msg: TransportMessage) -> Option<String> {
        match msg {
            TransportMessage::Samples(batch) => {
                let lifecycle = &self.models.lifecycle;
                match lifecycle.record_results(batch.success_count(), batch.error_count()) {
                    Ok(()) => self.models.bus.emit(DataEvent::SamplesReceived(batch)),
                    // Late results after a stop are dropped
                    Err(e) => tracing::debug!("dropping samples: {}", e),
                }
                None
            }
            TransportMessage::Error(message) => {
                tracing::warn!("transport error: {}", message);
                Some(message)
            }
            TransportMessage::Shutdown => {
                tracing::debug!("transport shut down");
                None
            }
        }
    }

    /// Route every message waiting on the bridge. Returns the last error.
    pub fn drain(&self, bridge: &TransportBridge) -> Option<String> {
        bridge
            .drain()
            .into_iter()
            .fold(None, |last, msg| self.route(msg).or(last))
    }
}
