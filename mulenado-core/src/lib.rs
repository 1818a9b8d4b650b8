//! Board-agnostic core logic for the drink carousel
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (stepper, dispensing station)
//! - Drink order model
//! - Motion planning (S-curve ramps, slot watchdog)
//! - Carousel controller
//! - Orchestrator (queue, station fan-out, run loop)
//! - Configuration type definitions
//!
//! Everything runs on a single-threaded cooperative executor. Shared state
//! lives in `Cell`/`RefCell`, so the table and bot are `!Sync`.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod bot;
pub mod config;
pub mod motion;
pub mod order;
pub mod table;
pub mod traits;

#[cfg(test)]
mod testing;
