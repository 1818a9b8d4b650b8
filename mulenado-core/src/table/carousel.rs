//! Rotation control
//!
//! A rotation runs two futures side by side: the motion profile, which
//! writes step frequencies on a timer, and slot tracking, which counts
//! endstop edges against a watchdog. Whichever finishes first decides how
//! the rotation ends:
//!
//! ```text
//! motion   → stop requested   → decelerate → Ok(false)
//! motion   → driver error     → halt       → Err(Motor)
//! tracking → all slots seen   → decelerate → Ok(true)
//! tracking → timeout / sensor → halt       → Err(..)
//! ```
//!
//! The edge subscription lives inside the tracking future, so it ends on
//! every one of these paths.

use core::cell::{Cell, Ref, RefCell, RefMut};

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use embedded_hal::digital::Error as _;
use embedded_hal_async::digital::Wait;

use super::phase::{TurnEvent, TurnPhase};
use super::slots::{SlotArray, DEFAULT_SLOT_COUNT};
use super::TurnError;
use crate::config::{ConfigError, TableConfig};
use crate::motion::{SCurve, Watchdog};
use crate::order::Drink;
use crate::traits::{Direction, StepperDriver, StepperError};

/// The rotating carousel
///
/// Only one rotation can be in flight; state lives in `Cell`s so `turn`
/// takes `&self` and overlapping calls are rejected instead of queued.
pub struct Table<M, E, const N: usize = DEFAULT_SLOT_COUNT> {
    drive: RefCell<M>,
    endstop: RefCell<E>,
    slots: RefCell<SlotArray<N>>,
    config: TableConfig,
    profile: SCurve,
    turning: Cell<bool>,
    slots_to_turn_left: Cell<u16>,
    phase: Cell<TurnPhase>,
    stop: Signal<NoopRawMutex, ()>,
}

/// Motor ownership for the duration of one rotation
///
/// Dropping it without `settled` (future cancelled, error path that could
/// not stop cleanly) cuts the motor.
struct Rotation<'a, M: StepperDriver> {
    drive: RefMut<'a, M>,
    turning: &'a Cell<bool>,
    phase: &'a Cell<TurnPhase>,
    settled: bool,
}

impl<M: StepperDriver> Drop for Rotation<'_, M> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("TABLE: rotation abandoned, halting motor");
            if let Err(e) = self.drive.halt() {
                error!("TABLE: halt failed: {:?}", e);
            }
        }
        self.phase.set(TurnPhase::Idle);
        self.turning.set(false);
    }
}

impl<M: StepperDriver, E: Wait, const N: usize> Table<M, E, N> {
    /// Create a table with every slot empty
    pub fn new(drive: M, endstop: E, config: TableConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            drive: RefCell::new(drive),
            endstop: RefCell::new(endstop),
            slots: RefCell::new(SlotArray::new()),
            profile: SCurve::new(config.ramp),
            config,
            turning: Cell::new(false),
            slots_to_turn_left: Cell::new(0),
            phase: Cell::new(TurnPhase::Idle),
            stop: Signal::new(),
        })
    }

    /// Rotate `slots` positions in `direction`
    ///
    /// Resolves `Ok(true)` once every slot edge has been seen and the motor
    /// has ramped down, `Ok(false)` if [`Table::request_stop`] cut the
    /// rotation short.
    pub async fn turn(&self, slots: u16, direction: Direction) -> Result<bool, TurnError> {
        if self.turning.get() {
            warn!(
                "TABLE: already turning, {} slots left",
                self.slots_to_turn_left.get()
            );
            return Err(TurnError::AlreadyTurning);
        }
        if slots == 0 {
            return Ok(true);
        }
        let (Ok(drive), Ok(mut endstop)) =
            (self.drive.try_borrow_mut(), self.endstop.try_borrow_mut())
        else {
            return Err(TurnError::AlreadyTurning);
        };

        self.stop.reset();
        self.slots_to_turn_left.set(slots);
        self.turning.set(true);
        debug!("TABLE: turning {} slots {:?}", slots, direction);

        let mut rotation = Rotation {
            drive,
            turning: &self.turning,
            phase: &self.phase,
            settled: false,
        };

        let outcome = match rotation
            .drive
            .set_direction(direction)
            .and_then(|()| rotation.drive.enable())
        {
            Ok(()) => {
                let motion = self.accelerate_and_cruise(&mut rotation.drive);
                let tracking = self.track_slots(&mut endstop, direction);
                match select(motion, tracking).await {
                    Either::First(Ok(())) => Ok(false),
                    Either::First(Err(e)) => Err(TurnError::Motor(e)),
                    Either::Second(Ok(())) => Ok(true),
                    Either::Second(Err(e)) => Err(e),
                }
            }
            Err(e) => Err(TurnError::Motor(e)),
        };

        let result = match outcome {
            Ok(completed) => {
                if completed {
                    self.advance(TurnEvent::SlotsConfirmed);
                } else {
                    info!(
                        "TABLE: stop requested, {} slots left",
                        self.slots_to_turn_left.get()
                    );
                    self.advance(TurnEvent::StopRequested);
                }
                self.decelerate(&mut rotation.drive)
                    .await
                    .map(|()| completed)
                    .map_err(TurnError::Motor)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(_) => self.advance(TurnEvent::Halted),
            Err(e) => {
                error!("TABLE: rotation failed: {:?}", e);
                self.advance(TurnEvent::Fault);
                if let Err(halt) = rotation.drive.halt() {
                    error!("TABLE: halt failed: {:?}", halt);
                }
            }
        }
        rotation.settled = true;
        result
    }

    /// Run `self_test_turns` single-slot rotations counter-clockwise
    pub async fn self_test(&self) -> Result<bool, TurnError> {
        info!("TABLE: self test, {} turns", self.config.self_test_turns);
        for _ in 0..self.config.self_test_turns {
            self.turn(1, Direction::CounterClockwise).await?;
        }
        info!("TABLE: self test passed");
        Ok(true)
    }

    /// Ask the rotation in progress to ramp down and stop
    pub fn request_stop(&self) {
        if self.turning.get() {
            self.stop.signal(());
        }
    }

    async fn accelerate_and_cruise(&self, drive: &mut M) -> Result<(), StepperError> {
        self.advance(TurnEvent::Start);
        drive.set_frequency(self.profile.min_frequency_hz())?;

        let interval = self.profile.step_interval();
        let mut at = Instant::now();
        for frequency in self.profile.accelerate() {
            at += interval;
            if let Either::Second(()) = select(Timer::at(at), self.stop.wait()).await {
                return Ok(());
            }
            drive.set_frequency(frequency)?;
        }

        self.advance(TurnEvent::RampComplete);
        trace!("TABLE: cruising at {} Hz", drive.frequency());
        self.stop.wait().await;
        Ok(())
    }

    async fn track_slots(&self, endstop: &mut E, direction: Direction) -> Result<(), TurnError> {
        let shift = self.config.slot_shift.for_direction(direction);
        let mut watchdog = Watchdog::arm(Instant::now(), self.watchdog_window());

        while self.slots_to_turn_left.get() > 0 {
            match select(endstop.wait_for_rising_edge(), Timer::at(watchdog.deadline())).await {
                Either::First(Ok(())) => {
                    let left = self.slots_to_turn_left.get() - 1;
                    self.slots_to_turn_left.set(left);
                    if let Some(drink) = self.slots.borrow_mut().shift(shift) {
                        debug!("TABLE: order {} left the carousel", drink.id.0);
                    }
                    watchdog.refresh(Instant::now());
                    trace!("TABLE: slot confirmed, {} left", left);
                }
                Either::First(Err(e)) => return Err(TurnError::Sensor(e.kind())),
                Either::Second(()) => {
                    warn!(
                        "TABLE: no slot edge for {} ms",
                        watchdog.window().as_millis()
                    );
                    return Err(TurnError::MotionTimeout);
                }
            }
        }
        Ok(())
    }

    async fn decelerate(&self, drive: &mut M) -> Result<(), StepperError> {
        let ramp = self.profile.decelerate_from(drive.frequency());
        let interval = self.profile.step_interval();
        let mut at = Instant::now();
        for frequency in ramp {
            at += interval;
            Timer::at(at).await;
            drive.set_frequency(frequency)?;
        }
        drive.halt()
    }
}

impl<M, E, const N: usize> Table<M, E, N> {
    fn advance(&self, event: TurnEvent) {
        self.phase.set(self.phase.get().transition(event));
    }

    fn watchdog_window(&self) -> Duration {
        Duration::from_millis(self.config.watchdog_ms as u64)
    }

    pub fn is_turning(&self) -> bool {
        self.turning.get()
    }

    /// Slot edges still expected by the current (or last) rotation
    pub fn slots_to_turn_left(&self) -> u16 {
        self.slots_to_turn_left.get()
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase.get()
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn slot_count(&self) -> usize {
        N
    }

    /// Any slot holds a drink
    pub fn is_occupied(&self) -> bool {
        self.slots.borrow().is_occupied()
    }

    /// Snapshot of slot `index`
    pub fn slot(&self, index: usize) -> Option<Drink> {
        self.slots.borrow().get(index)
    }

    /// Put `drink` in the leading slot, returning the drink it displaced
    pub fn load_front(&self, drink: Drink) -> Option<Drink> {
        self.slots.borrow_mut().load_front(drink)
    }

    pub fn slots(&self) -> Ref<'_, SlotArray<N>> {
        self.slots.borrow()
    }

    /// Mutable access for station fan-out
    ///
    /// Must be released before the next rotation starts.
    pub fn slots_mut(&self) -> RefMut<'_, SlotArray<N>> {
        self.slots.borrow_mut()
    }
}
