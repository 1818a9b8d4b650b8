//! Order button task
//!
//! Each press of the (active low) button queues one drink.

use defmt::*;
use embassy_rp::gpio::Input;
use embassy_time::Timer;

use super::MachineBot;

/// Ignore contact bounce for this long after a press
const DEBOUNCE_MS: u64 = 50;

#[embassy_executor::task]
pub async fn order_button_task(mut button: Input<'static>, bot: &'static MachineBot) {
    info!("Order button task started");

    loop {
        button.wait_for_falling_edge().await;

        match bot.accept_drink() {
            Ok(id) => info!("Order {} accepted", id.0),
            Err(e) => warn!("Order rejected: {:?}", e),
        }

        Timer::after_millis(DEBOUNCE_MS).await;
        button.wait_for_high().await;
        Timer::after_millis(DEBOUNCE_MS).await;
    }
}
