//! S-curve velocity profile
//!
//! The carousel starts and stops with a sigmoid frequency ramp so drinks do
//! not slosh. Progress through a ramp of length `T` at time `t` is
//!
//! ```text
//! 2 (t/T)^2            for t < T/2
//! 1 - 2 ((T - t)/T)^2  otherwise
//! ```
//!
//! All math is integer, in permille of the frequency span.

use embassy_time::Duration;

use crate::config::RampConfig;

/// Full scale of [`s_curve_permille`]
pub const PERMILLE: u32 = 1000;

/// S-curve progress at `elapsed` out of `total`, in permille
///
/// Monotonic in `elapsed`, 0 at the start, [`PERMILLE`] at or past the end,
/// and symmetric: `f(t) + f(T - t) == PERMILLE`.
pub fn s_curve_permille(elapsed: u32, total: u32) -> u32 {
    if total == 0 || elapsed >= total {
        return PERMILLE;
    }
    let t = elapsed as u64;
    let total = total as u64;
    let scale = 2 * PERMILLE as u64;
    if 2 * t < total {
        (scale * t * t / (total * total)) as u32
    } else {
        let rest = total - t;
        PERMILLE - (scale * rest * rest / (total * total)) as u32
    }
}

/// A sequence of frequencies moving from one rate to another along the
/// S-curve. Yields one value per step; the last value is exactly `to`.
#[derive(Debug, Clone)]
pub struct Ramp {
    from: u32,
    to: u32,
    step: u16,
    steps: u16,
}

impl Ramp {
    pub fn new(from: u32, to: u32, steps: u16) -> Self {
        Self {
            from,
            to,
            step: 0,
            steps,
        }
    }

    /// Steps not yet yielded
    pub fn remaining(&self) -> u16 {
        self.steps - self.step
    }

    fn at(&self, step: u16) -> u32 {
        let progress = s_curve_permille(step as u32, self.steps as u32) as i64;
        let span = self.to as i64 - self.from as i64;
        (self.from as i64 + span * progress / PERMILLE as i64) as u32
    }
}

impl Iterator for Ramp {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;
        Some(self.at(self.step))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining() as usize;
        (n, Some(n))
    }
}

/// Carousel acceleration and deceleration planner
#[derive(Debug, Clone, Copy)]
pub struct SCurve {
    ramp: RampConfig,
}

impl SCurve {
    pub fn new(ramp: RampConfig) -> Self {
        Self { ramp }
    }

    /// Floor frequency: pulses start and stop here
    pub fn min_frequency_hz(&self) -> u32 {
        self.ramp.min_frequency_hz
    }

    /// Cruise frequency
    pub fn max_frequency_hz(&self) -> u32 {
        self.ramp.max_frequency_hz
    }

    /// Time between two frequency updates
    pub fn step_interval(&self) -> Duration {
        let steps = self.ramp.steps.max(1) as u64;
        Duration::from_micros(self.ramp.duration_ms as u64 * 1000 / steps)
    }

    /// Full ramp from the floor to the cruise frequency
    pub fn accelerate(&self) -> Ramp {
        Ramp::new(
            self.ramp.min_frequency_hz,
            self.ramp.max_frequency_hz,
            self.ramp.steps,
        )
    }

    /// Ramp from `from_hz` down to the floor
    ///
    /// A deceleration that starts below the cruise frequency is shortened in
    /// proportion to the span left to cover.
    pub fn decelerate_from(&self, from_hz: u32) -> Ramp {
        let min = self.ramp.min_frequency_hz;
        let span = self.ramp.max_frequency_hz.saturating_sub(min) as u64;
        let left = from_hz.saturating_sub(min) as u64;
        let steps = if span == 0 || left == 0 {
            0
        } else {
            let full = self.ramp.steps as u64;
            (full * left.min(span)).div_ceil(span) as u16
        };
        Ramp::new(from_hz.max(min), min, steps)
    }
}
