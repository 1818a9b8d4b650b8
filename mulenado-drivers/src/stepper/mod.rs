//! Stepper driver implementations

pub mod pulse;

pub use pulse::{PulseStepper, PulseStepperConfig};
