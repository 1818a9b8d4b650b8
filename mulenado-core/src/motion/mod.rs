//! Motion planning
//!
//! S-curve frequency ramps for the carousel stepper and the slot watchdog.

pub mod profile;
pub mod watchdog;

pub use profile::{s_curve_permille, Ramp, SCurve, PERMILLE};
pub use watchdog::Watchdog;
