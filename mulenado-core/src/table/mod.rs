//! Carousel controller
//!
//! The table is a rotating platform with a fixed number of slots. A stepper
//! turns it open-loop; an endstop that fires once per slot is the only
//! position feedback.

pub mod carousel;
pub mod phase;
pub mod slots;

pub use carousel::Table;
pub use phase::{TurnEvent, TurnPhase};
pub use slots::{Shift, SlotArray, SlotShift, DEFAULT_SLOT_COUNT};

use crate::traits::StepperError;

/// Errors that can occur while rotating the carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnError {
    /// A rotation is already in progress
    AlreadyTurning,
    /// No slot edge arrived within the watchdog window
    MotionTimeout,
    /// Stepper driver failure
    Motor(StepperError),
    /// Endstop could not be read
    Sensor(embedded_hal::digital::ErrorKind),
}

impl From<StepperError> for TurnError {
    fn from(err: StepperError) -> Self {
        TurnError::Motor(err)
    }
}
