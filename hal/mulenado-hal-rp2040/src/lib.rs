//! RP2040-specific HAL for the drink carousel
//!
//! GPIO inputs and outputs from `embassy-rp` already implement the
//! `embedded-hal` digital traits and `embedded-hal-async::digital::Wait`, so
//! the firmware hands them to the core directly. This crate only adds the
//! pieces `embassy-rp` does not cover:
//!
//! - [`pwm::RpPwm`]: one PWM slice channel implementing
//!   `mulenado_hal::PwmOutput` (frequency and duty together)

#![no_std]

pub mod pwm;

pub use pwm::{PwmChannel, RpPwm, RpPwmError};
