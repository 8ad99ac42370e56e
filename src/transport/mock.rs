//! Mock transport for exercising the viewer without a device
//!
//! Runs a polling loop on its own thread and produces synthetic values for
//! every requested channel. Each channel gets a pattern chosen by its
//! position; an optional failure period makes some reads report errors so
//! the error counter moves too.
//!
//! Available patterns:
//! - [`MockDataPattern::Constant`] - Fixed value
//! - [`MockDataPattern::Sine`] - Sinusoidal wave with configurable frequency/amplitude
//! - [`MockDataPattern::Sawtooth`] - Linear ramp that resets periodically
//! - [`MockDataPattern::Square`] - Square wave alternating between two values
//! - [`MockDataPattern::Triangle`] - Triangle wave

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::{TransportCommand, TransportMessage};
use crate::types::{ChannelId, SampleBatch};

/// Pattern for generating mock data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockDataPattern {
    /// Constant value
    Constant(f64),
    /// Sine wave with frequency and amplitude
    Sine {
        frequency: f64,
        amplitude: f64,
        offset: f64,
    },
    /// Sawtooth wave
    Sawtooth { period: f64, amplitude: f64 },
    /// Square wave
    Square { period: f64, amplitude: f64 },
    /// Triangle wave
    Triangle { period: f64, amplitude: f64 },
}

impl Default for MockDataPattern {
    fn default() -> Self {
        MockDataPattern::Sine {
            frequency: 1.0,
            amplitude: 100.0,
            offset: 0.0,
        }
    }
}

impl MockDataPattern {
    /// Pattern assigned to the channel at this active position
    pub fn for_position(position: usize) -> Self {
        let scale = 1.0 + position as f64;
        match position % 4 {
            0 => MockDataPattern::Sine {
                frequency: 0.2 * scale,
                amplitude: 10.0,
                offset: 5.0 * scale,
            },
            1 => MockDataPattern::Sawtooth {
                period: 4.0,
                amplitude: 20.0,
            },
            2 => MockDataPattern::Square {
                period: 2.0 * scale,
                amplitude: 7.5,
            },
            _ => MockDataPattern::Triangle {
                period: 6.0,
                amplitude: 12.0,
            },
        }
    }

    /// Generate a value based on the pattern and elapsed time
    pub fn value_at(&self, elapsed_secs: f64) -> f64 {
        match *self {
            MockDataPattern::Constant(v) => v,
            MockDataPattern::Sine {
                frequency,
                amplitude,
                offset,
            } => offset + amplitude * (2.0 * std::f64::consts::PI * frequency * elapsed_secs).sin(),
            MockDataPattern::Sawtooth { period, amplitude } => {
                let t = elapsed_secs % period;
                amplitude * (t / period)
            }
            MockDataPattern::Square { period, amplitude } => {
                let t = elapsed_secs % period;
                if t < period / 2.0 {
                    amplitude
                } else {
                    -amplitude
                }
            }
            MockDataPattern::Triangle { period, amplitude } => {
                let t = elapsed_secs % period;
                let half = period / 2.0;
                if t < half {
                    amplitude * (2.0 * t / half - 1.0)
                } else {
                    amplitude * (1.0 - 2.0 * (t - half) / half)
                }
            }
        }
    }
}

/// Settings of the mock polling loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockTransportConfig {
    /// Time between poll cycles
    pub poll_interval: Duration,
    /// Every n-th read fails; `None` never fails
    pub fail_every: Option<u64>,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            fail_every: Some(97),
        }
    }
}

/// The mock transport worker that runs the polling loop
pub struct MockTransport {
    config: MockTransportConfig,
    command_rx: Receiver<TransportCommand>,
    message_tx: Sender<TransportMessage>,
    running: Arc<AtomicBool>,
    /// Channels being polled, in active order
    channels: Vec<(ChannelId, MockDataPattern)>,
    collecting: bool,
    start_time: Instant,
    last_poll_time: Instant,
    reads: u64,
}

impl MockTransport {
    pub fn new(
        config: MockTransportConfig,
        command_rx: Receiver<TransportCommand>,
        message_tx: Sender<TransportMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            command_rx,
            message_tx,
            running,
            channels: Vec::new(),
            collecting: false,
            start_time: Instant::now(),
            last_poll_time: Instant::now(),
            reads: 0,
        }
    }

    /// Spawn the worker on a named thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        std::thread::Builder::new()
            .name("acqview-mock-transport".to_string())
            .spawn(move || {
                let mut worker = self;
                worker.run();
            })
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!("Mock transport started");

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();

            if self.collecting {
                self.poll();
            }

            self.rate_limit();
        }

        let _ = self.message_tx.send(TransportMessage::Shutdown);
        tracing::info!("Mock transport stopped");
    }

    /// Process pending commands from the UI
    fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    fn handle_command(&mut self, cmd: TransportCommand) {
        match cmd {
            TransportCommand::Start(ids) => {
                tracing::debug!(channels = ids.len(), "mock acquisition started");
                self.channels = ids
                    .into_iter()
                    .enumerate()
                    .map(|(pos, id)| (id, MockDataPattern::for_position(pos)))
                    .collect();
                self.start_time = Instant::now();
                self.collecting = true;
            }
            TransportCommand::Stop => {
                tracing::debug!("mock acquisition stopped");
                self.collecting = false;
            }
            TransportCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Build one poll cycle
    fn sample(&mut self, elapsed_secs: f64) -> SampleBatch {
        let fail_every = self.config.fail_every.filter(|n| *n > 0);
        let mut results = Vec::with_capacity(self.channels.len());
        for (_, pattern) in &self.channels {
            self.reads += 1;
            if fail_every.is_some_and(|n| self.reads % n == 0) {
                results.push((false, 0.0));
            } else {
                results.push((true, pattern.value_at(elapsed_secs)));
            }
        }
        SampleBatch::new(chrono::Utc::now().timestamp_millis(), results)
    }

    fn poll(&mut self) {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let batch = self.sample(elapsed);
        if self
            .message_tx
            .try_send(TransportMessage::Samples(batch))
            .is_err()
        {
            tracing::trace!("message queue full, poll cycle dropped");
        }
    }

    /// Sleep to maintain the poll interval
    fn rate_limit(&mut self) {
        let elapsed = self.last_poll_time.elapsed();
        if elapsed < self.config.poll_interval {
            std::thread::sleep(self.config.poll_interval - elapsed);
        }
        self.last_poll_time = Instant::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn create_test_worker(
        config: MockTransportConfig,
    ) -> (
        MockTransport,
        Receiver<TransportMessage>,
        Sender<TransportCommand>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(16);
        let (msg_tx, msg_rx) = bounded(16);
        let running = Arc::new(AtomicBool::new(true));
        let worker = MockTransport::new(config, cmd_rx, msg_tx, running);
        (worker, msg_rx, cmd_tx)
    }

    #[test]
    fn test_patterns() {
        assert_eq!(MockDataPattern::Constant(4.0).value_at(10.0), 4.0);

        let saw = MockDataPattern::Sawtooth {
            period: 2.0,
            amplitude: 10.0,
        };
        assert!((saw.value_at(1.0) - 5.0).abs() < 1e-9);

        let square = MockDataPattern::Square {
            period: 2.0,
            amplitude: 3.0,
        };
        assert_eq!(square.value_at(0.5), 3.0);
        assert_eq!(square.value_at(1.5), -3.0);

        let tri = MockDataPattern::Triangle {
            period: 4.0,
            amplitude: 1.0,
        };
        assert!((tri.value_at(0.0) + 1.0).abs() < 1e-9);
        assert!((tri.value_at(2.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_and_stop_commands() {
        let (mut worker, _msg_rx, cmd_tx) = create_test_worker(MockTransportConfig::default());

        cmd_tx
            .send(TransportCommand::Start(vec![ChannelId(1), ChannelId(4)]))
            .unwrap();
        worker.process_commands();
        assert!(worker.collecting);
        assert_eq!(worker.channels.len(), 2);

        cmd_tx.send(TransportCommand::Stop).unwrap();
        worker.process_commands();
        assert!(!worker.collecting);
    }

    #[test]
    fn test_poll_produces_one_result_per_channel() {
        let config = MockTransportConfig {
            poll_interval: Duration::from_millis(1),
            fail_every: Some(3),
        };
        let (mut worker, msg_rx, cmd_tx) = create_test_worker(config);
        cmd_tx
            .send(TransportCommand::Start(vec![ChannelId(0), ChannelId(1), ChannelId(2)]))
            .unwrap();
        worker.process_commands();
        worker.poll();

        match msg_rx.try_recv().unwrap() {
            TransportMessage::Samples(batch) => {
                assert_eq!(batch.results.len(), 3);
                assert_eq!(batch.error_count(), 1);
                assert!(!batch.results[2].0);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_shutdown_command() {
        let (mut worker, _msg_rx, cmd_tx) = create_test_worker(MockTransportConfig::default());
        cmd_tx.send(TransportCommand::Shutdown).unwrap();
        worker.process_commands();
        assert!(!worker.running.load(Ordering::SeqCst));
    }

    #[test]
    fn test_disconnected_commands_stop_worker() {
        let (mut worker, _msg_rx, cmd_tx) = create_test_worker(MockTransportConfig::default());
        drop(cmd_tx);
        worker.process_commands();
        assert!(!worker.running.load(Ordering::SeqCst));
    }
}
