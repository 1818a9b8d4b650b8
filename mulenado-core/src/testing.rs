//! Test doubles shared by the table and bot tests

use embassy_time::Timer;
use mulenado_hal::pwm;
use mulenado_hal::sim::{SimInput, SimLine};

use crate::table::{Table, TurnPhase};
use crate::traits::{Direction, StepperDriver, StepperError};

/// Stepper that records what it was told
#[derive(Debug, Default)]
pub struct FakeDrive {
    pub direction: Direction,
    pub enabled: bool,
    pub frequency: u32,
    pub peak: u32,
    pub writes: usize,
    /// Fail every frequency write after this many successful ones
    pub fail_after: Option<usize>,
}

impl StepperDriver for FakeDrive {
    fn set_direction(&mut self, dir: Direction) -> Result<(), StepperError> {
        self.direction = dir;
        Ok(())
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn enable(&mut self) -> Result<(), StepperError> {
        self.enabled = true;
        Ok(())
    }

    fn disable(&mut self) -> Result<(), StepperError> {
        self.enabled = false;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), StepperError> {
        if self.fail_after.is_some_and(|limit| self.writes >= limit) {
            return Err(StepperError::Pulse(pwm::ErrorKind::Other));
        }
        self.writes += 1;
        self.frequency = frequency_hz;
        self.peak = self.peak.max(frequency_hz);
        Ok(())
    }

    fn frequency(&self) -> u32 {
        self.frequency
    }
}

/// Produce `count` endstop edges, 20 ms apart
pub async fn pulses(line: &SimLine, count: usize) {
    for _ in 0..count {
        Timer::after_millis(20).await;
        line.pulse();
    }
}

/// Emit one endstop edge per slot while the motor is driven
///
/// Never returns; race it against the future under test.
pub async fn follow_motor<M: StepperDriver, const N: usize>(
    table: &Table<M, SimInput<'_>, N>,
    line: &SimLine,
) {
    loop {
        Timer::after_millis(15).await;
        if matches!(
            table.phase(),
            TurnPhase::Accelerating | TurnPhase::Cruising
        ) {
            line.pulse();
        }
    }
}
