//! Slot watchdog
//!
//! Every confirmed slot edge proves the carousel is still moving. If no edge
//! arrives within the window, the rotation is considered stalled.

use embassy_time::{Duration, Instant};

/// Default watchdog window in milliseconds
pub const DEFAULT_WATCHDOG_MS: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Watchdog {
    window: Duration,
    deadline: Instant,
}

impl Watchdog {
    /// Arm the watchdog at `now`
    pub fn arm(now: Instant, window: Duration) -> Self {
        Self {
            window,
            deadline: now + window,
        }
    }

    /// Push the deadline out to `now + window`
    pub fn refresh(&mut self, now: Instant) {
        self.deadline = now + self.window;
    }

    /// Instant at which the watchdog fires
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}
