//! Mulenado Hardware Abstraction Layer
//!
//! The carousel core only needs four things from the hardware: read a
//! digital level, write a digital level, run a PWM output at a given
//! frequency and duty cycle, and wait for an edge on an input.
//!
//! Digital levels and edge waits come straight from `embedded-hal` 1.0 and
//! `embedded-hal-async`, so any chip HAL that implements those traits plugs
//! in unchanged. PWM frequency control is not part of `embedded-hal`, so this
//! crate defines [`pwm::PwmOutput`] for it.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  mulenado-core / mulenado-drivers       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  mulenado-hal (this crate - traits)     │
//! └─────────────────────────────────────────┘
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ mulenado-hal- │       │   hal::sim    │
//! │    rp2040     │       │ (host tests)  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Edge subscriptions
//!
//! An edge wait registers interest when its future is first polled and
//! releases it when the future is dropped.

#![no_std]
#![deny(unsafe_code)]

pub mod pwm;
#[cfg(feature = "sim")]
pub mod sim;

pub use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};
pub use embedded_hal_async::digital::Wait;
pub use pwm::{Duty, PwmOutput};
