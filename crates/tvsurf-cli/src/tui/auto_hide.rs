//! One-shot debounce timer that collapses the channel list.

use std::time::{Duration, Instant};

/// Debounced auto-hide countdown.
///
/// Holds at most one pending deadline; arming replaces it.
#[derive(Debug, Clone)]
pub struct AutoHideTimer {
    /// Inactivity period.
    delay: Duration,
    /// Pending deadline.
    deadline: Option<Instant>,
}

impl AutoHideTimer {
    /// Creates an idle timer.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// (Re)starts the countdown from `now`, cancelling any pending one.
    #[allow(clippy::arithmetic_side_effects)]
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Cancels the pending countdown.
    pub const fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Returns the pending deadline.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consumes the deadline if it has passed. Returns `true` exactly once per arm.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}
