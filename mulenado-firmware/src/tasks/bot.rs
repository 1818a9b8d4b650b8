//! Bot task
//!
//! Optionally commissions the machine, then serves orders forever.

use defmt::*;

use super::MachineBot;

#[embassy_executor::task]
pub async fn bot_task(bot: &'static MachineBot, self_test: bool) {
    info!("Bot task started");

    if self_test {
        match bot.self_test().await {
            Ok(_) => info!("Self-test passed"),
            Err(e) => error!("Self-test failed: {:?}", e),
        }
    }

    bot.serve().await
}
