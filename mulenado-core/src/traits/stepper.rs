//! Stepper motor driver trait
//!
//! The carousel drives its stepper open-loop with a pulse train. This trait
//! abstracts over how the pulses are produced (PWM slice, PIO, bit-banged
//! timer) and how enable/direction are wired.

use mulenado_hal::pwm;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation
    Clockwise,
    /// Counter-clockwise rotation
    #[default]
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Errors that can occur with stepper operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// Enable or direction pin could not be driven
    Pin(embedded_hal::digital::ErrorKind),
    /// Pulse generator rejected the request
    Pulse(pwm::ErrorKind),
}

impl StepperError {
    pub fn pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        StepperError::Pin(err.kind())
    }

    pub fn pulse<E: pwm::Error>(err: E) -> Self {
        StepperError::Pulse(err.kind())
    }
}

/// Trait for pulse-driven stepper motors
///
/// Frequencies are step pulses per second. A frequency of 0 stops the pulse
/// train but leaves the driver enabled (holding torque).
pub trait StepperDriver {
    /// Set the rotation direction
    ///
    /// Direction should only be changed while no pulses are produced.
    fn set_direction(&mut self, dir: Direction) -> Result<(), StepperError>;

    /// Get the current direction
    fn direction(&self) -> Direction;

    /// Energize the driver
    fn enable(&mut self) -> Result<(), StepperError>;

    /// Release the driver; the motor is free to rotate
    fn disable(&mut self) -> Result<(), StepperError>;

    /// Check if the driver is energized
    fn is_enabled(&self) -> bool;

    /// Set the step pulse frequency in Hz (0 stops pulses)
    fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), StepperError>;

    /// Get the current step pulse frequency in Hz
    fn frequency(&self) -> u32;

    /// Stop pulses and release the driver immediately
    ///
    /// Both steps are attempted even if the first fails; the first error is
    /// returned.
    fn halt(&mut self) -> Result<(), StepperError> {
        let pulses = self.set_frequency(0);
        let driver = self.disable();
        pulses.and(driver)
    }

    /// Check if the motor is stopped
    fn is_stopped(&self) -> bool {
        self.frequency() == 0
    }
}

impl<T: StepperDriver + ?Sized> StepperDriver for &mut T {
    fn set_direction(&mut self, dir: Direction) -> Result<(), StepperError> {
        T::set_direction(self, dir)
    }

    fn direction(&self) -> Direction {
        T::direction(self)
    }

    fn enable(&mut self) -> Result<(), StepperError> {
        T::enable(self)
    }

    fn disable(&mut self) -> Result<(), StepperError> {
        T::disable(self)
    }

    fn is_enabled(&self) -> bool {
        T::is_enabled(self)
    }

    fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), StepperError> {
        T::set_frequency(self, frequency_hz)
    }

    fn frequency(&self) -> u32 {
        T::frequency(self)
    }

    fn halt(&mut self) -> Result<(), StepperError> {
        T::halt(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_opposite() {
        assert_eq!(Direction::Clockwise.opposite(), Direction::CounterClockwise);
        assert_eq!(Direction::default(), Direction::CounterClockwise);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            StepperError::pin(embedded_hal::digital::ErrorKind::Other),
            StepperError::Pin(embedded_hal::digital::ErrorKind::Other)
        );
        assert_eq!(
            StepperError::pulse(pwm::ErrorKind::Other),
            StepperError::Pulse(pwm::ErrorKind::Other)
        );
    }
}
