//! Embedded machine configuration
//!
//! `build.rs` validates `machine.toml` and serializes it with postcard.
//! Decoding failures fall back to the built-in defaults.

use defmt::*;

use mulenado_core::config::MachineConfig;
use mulenado_core::table::DEFAULT_SLOT_COUNT;

const EMBEDDED_CONFIG: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/machine.bin"));

/// Decode the embedded configuration
pub fn load() -> MachineConfig {
    let config = match postcard::from_bytes::<MachineConfig>(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to decode embedded config: {:?}", Debug2Format(&e));
            error!("Using default configuration");
            return MachineConfig::default();
        }
    };

    match config.validate(DEFAULT_SLOT_COUNT) {
        Ok(()) => {
            info!("Loaded embedded configuration");
            config
        }
        Err(e) => {
            error!("Embedded config rejected: {:?}", e);
            error!("Using default configuration");
            MachineConfig::default()
        }
    }
}
