//! Embassy async tasks
//!
//! The bot is shared by reference; both tasks run on the thread executor.

pub mod bot;
pub mod order_button;

use embassy_rp::gpio::{Input, Output};
use mulenado_core::bot::Bot;
use mulenado_drivers::stepper::PulseStepper;
use mulenado_hal_rp2040::RpPwm;

pub use bot::bot_task;
pub use order_button::order_button_task;

/// Carousel stepper as wired on the board
pub type CarouselDrive = PulseStepper<RpPwm<'static>, Output<'static>, Output<'static>>;

/// The bot with one cup station on a ten-slot carousel
pub type MachineBot = Bot<'static, CarouselDrive, Input<'static>, 1>;
