//! Drink orchestrator
//!
//! The bot owns the carousel, the stations and the queue of accepted orders.
//! A run repeats one tick until nothing is left anywhere:
//!
//! 1. load one queued order into the leading slot
//! 2. let every station act on the drink in front of it, concurrently
//! 3. rotate one slot
//!
//! Failures in steps 2 and 3 are logged, counted and handed to the
//! [`FailurePolicy`]; they never abort a tick by themselves.

pub mod policy;
pub mod queue;
pub mod station;

pub use policy::{FailurePolicy, Verdict};
pub use queue::{PendingQueue, QueueOrder, QUEUE_CAPACITY};
pub use station::Station;

use core::cell::{Cell, RefCell};

use embassy_futures::join::join_array;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::digital::Wait;
use heapless::Vec;

use crate::config::{BotConfig, ConfigError};
use crate::order::{Drink, OrderId};
use crate::table::{Table, TurnError, DEFAULT_SLOT_COUNT};
use crate::traits::{Direction, DispenserError, DispenserFuture, StepperDriver};

/// Errors reported by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BotError {
    /// Pending queue is at capacity
    QueueFull,
    /// A run is in progress
    Busy,
    /// Failure policy ended the run
    Stalled,
    /// Carousel failure
    Table(TurnError),
    /// Station failure
    Station { offset: u8, error: DispenserError },
    /// Invalid construction parameters
    Config(ConfigError),
}

impl From<TurnError> for BotError {
    fn from(err: TurnError) -> Self {
        BotError::Table(err)
    }
}

impl From<ConfigError> for BotError {
    fn from(err: ConfigError) -> Self {
        BotError::Config(err)
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RunSummary {
    pub ticks: u32,
    pub rotations: u32,
    pub rotation_failures: u32,
    pub station_failures: u32,
}

/// The orchestrator
///
/// `S` is the number of stations, `N` the number of carousel slots.
pub struct Bot<'d, M, E, const S: usize, const N: usize = DEFAULT_SLOT_COUNT> {
    table: Table<M, E, N>,
    stations: RefCell<[Station<'d>; S]>,
    queue: RefCell<PendingQueue>,
    config: BotConfig,
    next_id: Cell<OrderId>,
    active: Cell<bool>,
    wake: Signal<NoopRawMutex, ()>,
}

impl<'d, M: StepperDriver, E: Wait, const S: usize, const N: usize> Bot<'d, M, E, S, N> {
    /// Create a bot; station offsets must be distinct and below `N`
    pub fn new(
        table: Table<M, E, N>,
        stations: [Station<'d>; S],
        config: BotConfig,
    ) -> Result<Self, BotError> {
        if !station::offsets_valid(&stations, N) {
            return Err(BotError::Config(ConfigError::StationOffset));
        }
        info!("BOT: initialize, {} stations, {} slots", S, N);
        Ok(Self {
            table,
            stations: RefCell::new(stations),
            queue: RefCell::new(PendingQueue::new(config.queue_order)),
            config,
            next_id: Cell::new(OrderId(1)),
            active: Cell::new(false),
            wake: Signal::new(),
        })
    }

    /// Queue a new drink and wake the run loop if it is idle
    pub fn accept_drink(&self) -> Result<OrderId, BotError> {
        let id = self.next_id.get();
        if self.queue.borrow_mut().push(Drink::new(id)).is_err() {
            warn!("BOT: queue full, order rejected");
            return Err(BotError::QueueFull);
        }
        self.next_id.set(id.next());
        info!("BOT: drink requested, order {}", id.0);

        if !self.active.get() {
            self.wake.signal(());
        }
        Ok(id)
    }

    /// Serve orders forever: wait for a wake-up, run until empty, repeat
    pub async fn serve(&self) -> ! {
        loop {
            self.wake.wait().await;
            match self.run().await {
                Ok(summary) => info!(
                    "BOT: no active drinks anymore ({} ticks, {} rotation failures, {} station failures)",
                    summary.ticks,
                    summary.rotation_failures,
                    summary.station_failures
                ),
                Err(e) => error!("BOT: run ended: {:?}", e),
            }
        }
    }

    /// Cycle until the carousel and the queue are both empty
    pub async fn run(&self) -> Result<RunSummary, BotError> {
        let Some(_active) = ActiveGuard::claim(&self.active) else {
            return Err(BotError::Busy);
        };
        self.run_ticks().await
    }

    async fn run_ticks(&self) -> Result<RunSummary, BotError> {
        let mut summary = RunSummary::default();
        let mut streak: u16 = 0;

        while self.table.is_occupied() || !self.queue.borrow().is_empty() {
            summary.ticks += 1;
            self.load_next();
            summary.station_failures += self.dispense().await;

            match self.table.turn(1, Direction::CounterClockwise).await {
                Ok(_) => {
                    summary.rotations += 1;
                    streak = 0;
                }
                Err(e) => {
                    error!("BOT: {:?}", e);
                    summary.rotation_failures += 1;
                    streak = streak.saturating_add(1);
                }
            }

            if self.config.failure_policy.judge(streak) == Verdict::Halt {
                error!("BOT: {} rotations failed in a row, stopping", streak);
                return Err(BotError::Stalled);
            }
        }
        Ok(summary)
    }

    fn load_next(&self) {
        let Some(drink) = self.queue.borrow_mut().pop() else {
            return;
        };
        debug!("BOT: loading order {}", drink.id.0);
        if let Some(displaced) = self.table.load_front(drink) {
            warn!("BOT: order {} displaced from leading slot", displaced.id.0);
        }
    }

    /// Fan out one task per station, wait for all, return the failure count
    ///
    /// Stations work on a copy of the slots; the table stays readable while
    /// they run and the results are written back afterwards.
    async fn dispense(&self) -> u32 {
        let snapshot = *self.table.slots();
        let mut work = snapshot;
        let mut stations = self.stations.borrow_mut();

        let results = {
            let mut cells: Vec<Option<&mut Drink>, N> =
                work.as_mut_slice().iter_mut().map(Option::as_mut).collect();
            let tasks: [DispenserFuture<'_>; S] = stations.each_mut().map(|station| {
                let offset = station.offset as usize;
                let current = cells.get_mut(offset).and_then(Option::take);
                let next = offset.checked_sub(1).and_then(|i| snapshot.get(i));
                station.dispenser.accept_task(current, next)
            });
            join_array(tasks).await
        };

        let mut slots = self.table.slots_mut();
        let mut failures = 0;
        for (station, result) in stations.iter().zip(results) {
            let offset = station.offset as usize;
            if let (Some(before), Some(after)) = (snapshot.get(offset), work.get(offset)) {
                // Skip slots that moved on while the station worked
                if let Some(live) = slots.get_mut(offset).filter(|live| live.id == before.id) {
                    *live = after;
                }
            }
            if let Err(e) = result {
                error!("BOT: {} at slot {}: {:?}", station.name(), offset, e);
                failures += 1;
            }
        }
        failures
    }

    /// Exercise the carousel, then every station in order
    ///
    /// Holds the machine like a run does; orders accepted meanwhile start a
    /// run once the test is over.
    pub async fn self_test(&self) -> Result<bool, BotError> {
        let result = match ActiveGuard::claim(&self.active) {
            Some(_active) => self.exercise().await,
            None => {
                warn!("BOT: self test refused while running");
                return Err(BotError::Busy);
            }
        };
        if !self.queue.borrow().is_empty() {
            self.wake.signal(());
        }
        result
    }

    async fn exercise(&self) -> Result<bool, BotError> {
        info!("BOT: self test");
        self.table.self_test().await?;

        let mut stations = self.stations.borrow_mut();
        for station in stations.iter_mut() {
            info!("BOT: self test {} at slot {}", station.name(), station.offset);
            station
                .dispenser
                .self_test()
                .await
                .map_err(|error| BotError::Station {
                    offset: station.offset,
                    error,
                })?;
        }
        info!("BOT: self test passed");
        Ok(true)
    }
}

/// Marks the bot active until dropped
struct ActiveGuard<'a>(&'a Cell<bool>);

impl<'a> ActiveGuard<'a> {
    fn claim(active: &'a Cell<bool>) -> Option<Self> {
        if active.replace(true) {
            None
        } else {
            Some(Self(active))
        }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl<M, E, const S: usize, const N: usize> Bot<'_, M, E, S, N> {
    /// A run or self test is in progress
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Orders waiting to be loaded
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    pub fn table(&self) -> &Table<M, E, N> {
        &self.table
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }
}
