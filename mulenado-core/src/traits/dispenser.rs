//! Station capability trait
//!
//! Every station bolted to the carousel frame adds one ingredient to the
//! drink parked in front of it. The bot only knows stations through this
//! trait, so methods return boxed futures to keep it object safe.

use alloc::boxed::Box;
use core::future::Future;
use core::pin::Pin;

use mulenado_hal::pwm;

use crate::order::Drink;

/// Errors that can occur while a station acts on a drink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispenserError {
    /// Station slot is occupied although nothing was released
    StationConflict,
    /// Actuator output failed
    Actuator(pwm::ErrorKind),
    /// Station sensor could not be read
    Sensor(embedded_hal::digital::ErrorKind),
    /// Sensor never confirmed the action
    SettleTimeout,
}

impl DispenserError {
    pub fn actuator<E: pwm::Error>(err: E) -> Self {
        DispenserError::Actuator(err.kind())
    }

    pub fn sensor<E: embedded_hal::digital::Error>(err: E) -> Self {
        DispenserError::Sensor(err.kind())
    }
}

/// Future returned by every station operation
pub type DispenserFuture<'a> = Pin<Box<dyn Future<Output = Result<bool, DispenserError>> + 'a>>;

/// A dispensing station at a fixed carousel offset
pub trait Dispenser {
    /// Act on the drink in front of the station
    ///
    /// `current` is the drink in this station's slot (none when the slot is
    /// empty, which succeeds without touching hardware). `next` is a snapshot
    /// of the drink one slot upstream.
    fn accept_task<'a>(
        &'a mut self,
        current: Option<&'a mut Drink>,
        next: Option<Drink>,
    ) -> DispenserFuture<'a>;

    /// Notification that `drink` arrives on the next rotation
    fn heads_up<'a>(&'a mut self, drink: &'a Drink) -> DispenserFuture<'a>;

    /// Exercise the station hardware in a fixed sequence
    fn self_test(&mut self) -> DispenserFuture<'_>;

    /// Tag for log lines
    fn name(&self) -> &'static str {
        "station"
    }
}
