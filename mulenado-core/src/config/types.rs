//! Configuration type definitions
//!
//! Defaults carry the reference machine's constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bot::{FailurePolicy, QueueOrder};
use crate::motion::watchdog::DEFAULT_WATCHDOG_MS;
use crate::table::SlotShift;

/// Configuration rejected by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Ramp has no steps, no duration or a zero floor frequency
    EmptyRamp,
    /// Ramp floor is above its ceiling
    InvertedRamp,
    /// Watchdog window of zero would fire immediately
    ZeroWatchdog,
    /// Station offsets overlap or fall outside the carousel
    StationOffset,
}

/// Carousel acceleration ramp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RampConfig {
    /// Step frequency at start and stop (Hz)
    pub min_frequency_hz: u32,
    /// Cruise step frequency (Hz)
    pub max_frequency_hz: u32,
    /// Time to reach cruise from the floor (ms)
    pub duration_ms: u32,
    /// Number of frequency updates per ramp
    pub steps: u16,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            min_frequency_hz: 200,
            max_frequency_hz: 2000,
            duration_ms: 200,
            steps: 100,
        }
    }
}

impl RampConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps == 0 || self.duration_ms == 0 || self.min_frequency_hz == 0 {
            return Err(ConfigError::EmptyRamp);
        }
        if self.min_frequency_hz > self.max_frequency_hz {
            return Err(ConfigError::InvertedRamp);
        }
        Ok(())
    }
}

/// Carousel controller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableConfig {
    pub ramp: RampConfig,
    /// Maximum time between two slot edges (ms)
    pub watchdog_ms: u32,
    /// How a confirmed slot moves drinks along the slot array
    pub slot_shift: SlotShift,
    /// Single-slot rotations performed by the self-test
    pub self_test_turns: u8,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            ramp: RampConfig::default(),
            watchdog_ms: DEFAULT_WATCHDOG_MS,
            slot_shift: SlotShift::default(),
            self_test_turns: 3,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.ramp.validate()?;
        if self.watchdog_ms == 0 {
            return Err(ConfigError::ZeroWatchdog);
        }
        Ok(())
    }
}

/// Orchestrator configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BotConfig {
    pub queue_order: QueueOrder,
    pub failure_policy: FailurePolicy,
    /// Run the commissioning self-test once at boot
    pub self_test_on_boot: bool,
}

/// Carousel stepper driver wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StepperConfig {
    /// Enable pin is active low
    pub enable_inverted: bool,
    /// Swap the direction pin levels
    pub direction_inverted: bool,
    /// Step pulse duty cycle (%)
    pub pulse_duty_percent: u8,
}

impl Default for StepperConfig {
    fn default() -> Self {
        Self {
            enable_inverted: true,
            direction_inverted: false,
            pulse_duty_percent: 50,
        }
    }
}

/// Cup station configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CupConfig {
    /// Carousel slot the station faces
    pub offset: u8,
    /// Servo pulse width that drops a cup (µs)
    pub release_pulse_us: u32,
    /// Servo pulse width that holds the stack (µs)
    pub armed_pulse_us: u32,
    /// Hold time for each servo position (ms)
    pub dwell_ms: u32,
    /// Servo frame rate (Hz)
    pub servo_frequency_hz: u32,
    /// Detector reads low while a cup is present
    pub detector_active_low: bool,
    /// Give up waiting for the detector after this long (ms)
    pub settle_timeout_ms: Option<u32>,
}

impl Default for CupConfig {
    fn default() -> Self {
        Self {
            offset: 0,
            release_pulse_us: 2200,
            armed_pulse_us: 800,
            dwell_ms: 700,
            servo_frequency_hz: 50,
            detector_active_low: true,
            settle_timeout_ms: None,
        }
    }
}

/// Complete machine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MachineConfig {
    pub table: TableConfig,
    pub bot: BotConfig,
    pub stepper: StepperConfig,
    pub cup: CupConfig,
}

impl MachineConfig {
    /// Check every section; `slot_count` bounds station offsets
    pub fn validate(&self, slot_count: usize) -> Result<(), ConfigError> {
        self.table.validate()?;
        if self.cup.offset as usize >= slot_count {
            return Err(ConfigError::StationOffset);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(MachineConfig::default().validate(10), Ok(()));
    }

    #[test]
    fn test_reference_constants() {
        let config = MachineConfig::default();
        assert_eq!(config.table.ramp.min_frequency_hz, 200);
        assert_eq!(config.table.ramp.max_frequency_hz, 2000);
        assert_eq!(config.table.watchdog_ms, 3000);
        assert_eq!(config.cup.dwell_ms, 700);
        assert_eq!(config.cup.release_pulse_us, 2200);
        assert_eq!(config.cup.armed_pulse_us, 800);
        assert!(!config.bot.self_test_on_boot);
    }

    #[test]
    fn test_ramp_validation() {
        let mut ramp = RampConfig::default();
        ramp.steps = 0;
        assert_eq!(ramp.validate(), Err(ConfigError::EmptyRamp));

        let mut ramp = RampConfig::default();
        ramp.min_frequency_hz = 3000;
        assert_eq!(ramp.validate(), Err(ConfigError::InvertedRamp));
    }

    #[test]
    fn test_zero_watchdog_rejected() {
        let mut table = TableConfig::default();
        table.watchdog_ms = 0;
        assert_eq!(table.validate(), Err(ConfigError::ZeroWatchdog));
    }

    #[test]
    fn test_cup_offset_bounded() {
        let mut config = MachineConfig::default();
        config.cup.offset = 10;
        assert_eq!(config.validate(10), Err(ConfigError::StationOffset));
    }
}
