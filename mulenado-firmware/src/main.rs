//! Mulenado firmware for RP2040-based boards
//!
//! Boots the board, loads the embedded machine configuration, wires the
//! carousel stepper, slot endstop and cup station, then hands control to
//! the bot and the order button tasks.

#![no_std]
#![no_main]

extern crate alloc;

mod config;
mod tasks;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embedded_alloc::LlffHeap as Heap;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use mulenado_core::bot::{Bot, Station};
use mulenado_core::table::Table;
use mulenado_drivers::dispenser::CupDispenser;
use mulenado_drivers::stepper::{PulseStepper, PulseStepperConfig};
use mulenado_hal_rp2040::{PwmChannel, RpPwm};

use crate::tasks::MachineBot;

#[global_allocator]
static HEAP: Heap = Heap::empty();

// Station futures and trait objects live here
const HEAP_SIZE: usize = 8 * 1024;

static BOT: StaticCell<MachineBot> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("==================");
    info!("= Mulenado v.0.1 =");
    info!("==================");

    init_heap();
    let p = embassy_rp::init(Default::default());

    let machine = config::load();

    // Carousel stepper: STEP GPIO11 (slice 5 B), DIR GPIO10, EN GPIO12
    let step = RpPwm::new(
        Pwm::new_output_b(p.PWM_SLICE5, p.PIN_11, PwmConfig::default()),
        PwmChannel::B,
    );
    let dir = Output::new(p.PIN_10, Level::Low);
    let enable = Output::new(p.PIN_12, Level::High);
    let drive = unwrap!(PulseStepper::new(
        step,
        enable,
        dir,
        PulseStepperConfig::from(&machine.stepper),
    ));

    // One rising edge per slot of travel
    let endstop = Input::new(p.PIN_16, Pull::Up);

    let table = unwrap!(Table::new(drive, endstop, machine.table));

    info!("Carousel initialized");

    // Cup station: servo GPIO4 (slice 2 A), detector GPIO17
    let servo = RpPwm::new(
        Pwm::new_output_a(p.PWM_SLICE2, p.PIN_4, PwmConfig::default()),
        PwmChannel::A,
    );
    let detector_pull = if machine.cup.detector_active_low {
        Pull::Up
    } else {
        Pull::Down
    };
    let detector = Input::new(p.PIN_17, detector_pull);
    let mut cup = CupDispenser::new(servo, detector, machine.cup);
    if let Err(e) = cup.arm() {
        warn!("Cup gate failed to arm: {:?}", e);
    }

    info!("Cup station initialized at offset {}", machine.cup.offset);

    let stations = [Station::new(machine.cup.offset, cup)];
    let bot: &'static MachineBot = BOT.init(unwrap!(Bot::new(table, stations, machine.bot)));

    let button = Input::new(p.PIN_24, Pull::Up);

    spawner
        .spawn(tasks::bot_task(bot, machine.bot.self_test_on_boot))
        .unwrap();
    spawner.spawn(tasks::order_button_task(button, bot)).unwrap();

    info!("All tasks spawned, firmware running");

    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}

/// Initialize the heap allocator
fn init_heap() {
    use core::mem::MaybeUninit;
    static mut HEAP_MEM: [MaybeUninit<u8>; HEAP_SIZE] = [MaybeUninit::uninit(); HEAP_SIZE];
    #[allow(static_mut_refs)]
    unsafe {
        HEAP.init(HEAP_MEM.as_ptr() as usize, HEAP_SIZE)
    }
}
