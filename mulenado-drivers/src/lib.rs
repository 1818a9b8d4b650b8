//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in mulenado-core:
//!
//! - Stepper drivers (step/dir/enable pulse train)
//! - Hobby servo positioning
//! - Dispensing stations (cup dropper)

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod dispenser;
pub mod servo;
pub mod stepper;
