//! Hardware abstraction traits
//!
//! These traits define the interface between the carousel logic and the
//! concrete motor and station drivers.

pub mod dispenser;
pub mod stepper;

pub use dispenser::{Dispenser, DispenserError, DispenserFuture};
pub use stepper::{Direction, StepperDriver, StepperError};
