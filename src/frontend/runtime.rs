//! Runtime display timing
//!
//! The elapsed-time field in the status bar is refreshed by a one-shot tick
//! that re-arms itself while acquisition runs. Time and scheduling are
//! traits so the tick logic can be driven deterministically.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Wall clock in milliseconds since the Unix epoch
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// System time through chrono
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Arms a single future runtime tick
#[cfg_attr(test, mockall::automock)]
pub trait TickScheduler {
    fn schedule_tick(&self, delay: Duration);
}

/// Tick scheduler polled once per UI frame.
///
/// Clones share the same deadline, so the coordinator can own one handle
/// while the frame loop polls another.
#[derive(Clone, Default)]
pub struct FrameTickScheduler {
    due: Rc<Cell<Option<Instant>>>,
    repaint: Option<egui::Context>,
}

impl FrameTickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the UI when a tick becomes due
    pub fn with_repaint(mut self, ctx: egui::Context) -> Self {
        self.repaint = Some(ctx);
        self
    }

    /// Consume the pending tick if its deadline has passed
    pub fn take_due(&self, now: Instant) -> bool {
        match self.due.get() {
            Some(deadline) if deadline <= now => {
                self.due.set(None);
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.due.get().is_some()
    }
}

impl TickScheduler for FrameTickScheduler {
    fn schedule_tick(&self, delay: Duration) {
        self.due.set(Some(Instant::now() + delay));
        if let Some(ctx) = &self.repaint {
            ctx.request_repaint_after(delay);
        }
    }
}

/// Format elapsed time as `H hours, M minutes S seconds`
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{} hours, {} minutes {} seconds", hours, minutes, seconds)
}

/// Status bar text for the runtime field
pub fn runtime_text(elapsed: Duration) -> String {
    format!("Runtime: {}", format_elapsed(elapsed))
}

/// Elapsed time between two epoch timestamps, clamped at zero
pub fn elapsed_between(start_ms: i64, now_ms: i64) -> Duration {
    Duration::from_millis(now_ms.saturating_sub(start_ms).max(0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::ZERO), "0 hours, 0 minutes 0 seconds");
        assert_eq!(
            format_elapsed(Duration::from_millis(3_725_000)),
            "1 hours, 2 minutes 5 seconds"
        );
        // Partial seconds are truncated
        assert_eq!(
            format_elapsed(Duration::from_millis(59_999)),
            "0 hours, 0 minutes 59 seconds"
        );
    }

    #[test]
    fn test_runtime_text() {
        assert_eq!(
            runtime_text(Duration::ZERO),
            "Runtime: 0 hours, 0 minutes 0 seconds"
        );
    }

    #[test]
    fn test_elapsed_between_clamps() {
        assert_eq!(elapsed_between(1_000, 4_000), Duration::from_secs(3));
        assert_eq!(elapsed_between(5_000, 4_000), Duration::ZERO);
    }

    #[test]
    fn test_frame_scheduler() {
        let scheduler = FrameTickScheduler::new();
        let poller = scheduler.clone();
        assert!(!poller.take_due(Instant::now()));

        scheduler.schedule_tick(Duration::ZERO);
        assert!(poller.is_pending());
        assert!(poller.take_due(Instant::now() + Duration::from_millis(1)));
        assert!(!poller.take_due(Instant::now()));
    }

    #[test]
    fn test_frame_scheduler_waits_for_deadline() {
        let scheduler = FrameTickScheduler::new();
        scheduler.schedule_tick(Duration::from_secs(60));
        assert!(!scheduler.take_due(Instant::now()));
        assert!(scheduler.is_pending());
    }
}
