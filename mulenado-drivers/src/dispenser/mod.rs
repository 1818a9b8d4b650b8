//! Dispensing station implementations

pub mod cup;

pub use cup::CupDispenser;
