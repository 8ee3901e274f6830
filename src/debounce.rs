//! Coalescing of rapid view-change notifications.
//!
//! A [`Debouncer`] owns a single pending deadline. Triggering it while a
//! deadline is pending replaces the deadline, so a burst of notifications
//! collapses into one action that becomes due once the burst has been quiet
//! for the configured window. Time is passed in, never read, which keeps the
//! behaviour deterministic.

use std::time::{Duration, Instant};

/// Default quiet window.
pub const DEFAULT_QUIET: Duration = Duration::from_millis(100);

/// Host capability to run work on a later update tick.
///
/// The engine asks for a tick no earlier than `at`; the host is expected to
/// call back into the engine's `tick` on or after that instant. Requests may
/// be repeated; only the latest one matters.
pub trait TickScheduler {
    /// Request a host update tick at or after `at`.
    fn request_tick(&mut self, at: Instant);
}

/// Single-slot pending timer with cancel-and-reschedule semantics.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

impl Debouncer {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub fn new(quiet: Duration) -> Self {
        Self { quiet, deadline: None }
    }

    /// Quiet window.
    #[must_use]
    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Arm (or re-arm) the timer and return the new deadline.
    pub fn trigger(&mut self, now: Instant) -> Instant {
        let deadline = now + self.quiet;
        self.deadline = Some(deadline);
        deadline
    }

    /// Pending deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True while a deadline is pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drop the pending deadline.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Clear and report the deadline if it has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_not_due_before_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::default();
        d.trigger(t0);
        assert!(!d.fire_if_due(t0 + ms(99)));
        assert!(d.is_pending());
        assert!(d.fire_if_due(t0 + ms(100)));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_fires_once() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(10));
        d.trigger(t0);
        assert!(d.fire_if_due(t0 + ms(20)));
        assert!(!d.fire_if_due(t0 + ms(30)));
    }

    #[test]
    fn test_retrigger_restarts_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(100));
        d.trigger(t0);
        d.trigger(t0 + ms(80));
        assert!(!d.fire_if_due(t0 + ms(120)));
        assert_eq!(d.deadline(), Some(t0 + ms(180)));
        assert!(d.fire_if_due(t0 + ms(180)));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(ms(5));
        d.trigger(t0);
        d.cancel();
        assert!(!d.fire_if_due(t0 + ms(50)));
    }
}
