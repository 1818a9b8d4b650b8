//! PWM slice output
//!
//! Each RP2040 PWM slice has one 16-bit counter, an 8.4 fixed-point clock
//! divider and two compare channels (A and B). The step pulse train and the
//! servo each get a slice of their own, so retuning the counter for one
//! output never disturbs another.

use embassy_rp::pwm::{Config, Pwm};
use mulenado_hal::pwm::{self, Duty, ErrorType, PwmOutput};

/// Which compare channel of the slice drives the pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmChannel {
    A,
    B,
}

/// PWM configuration failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RpPwmError {
    /// Requested frequency cannot be reached with the integer divider
    FrequencyOutOfRange,
}

impl pwm::Error for RpPwmError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// Counter settings for one output frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceTiming {
    /// Integer clock divider (1..=255)
    pub divider: u8,
    /// Counter wrap value
    pub top: u16,
}

/// Pick the smallest integer divider that lets the counter reach
/// `frequency_hz` from `clk_sys_hz`.
pub fn slice_timing(clk_sys_hz: u32, frequency_hz: u32) -> Option<SliceTiming> {
    if frequency_hz == 0 {
        return None;
    }
    let ticks = clk_sys_hz / frequency_hz;
    if ticks < 2 {
        return None;
    }
    let divider = ticks / (u16::MAX as u32 + 1) + 1;
    if divider > u8::MAX as u32 {
        return None;
    }
    let top = ticks / divider - 1;
    Some(SliceTiming {
        divider: divider as u8,
        top: top.min(u16::MAX as u32) as u16,
    })
}

/// One channel of an `embassy-rp` PWM slice
pub struct RpPwm<'d> {
    pwm: Pwm<'d>,
    channel: PwmChannel,
    config: Config,
}

impl<'d> RpPwm<'d> {
    /// Wrap a slice configured for output on `channel`. The output starts
    /// disabled.
    pub fn new(mut pwm: Pwm<'d>, channel: PwmChannel) -> Self {
        let mut config = Config::default();
        config.enable = false;
        pwm.set_config(&config);
        Self {
            pwm,
            channel,
            config,
        }
    }

    fn set_compare(&mut self, compare: u16) {
        match self.channel {
            PwmChannel::A => self.config.compare_a = compare,
            PwmChannel::B => self.config.compare_b = compare,
        }
    }
}

impl ErrorType for RpPwm<'_> {
    type Error = RpPwmError;
}

impl PwmOutput for RpPwm<'_> {
    fn set_output(&mut self, frequency_hz: u32, duty: Duty) -> Result<(), Self::Error> {
        let timing = slice_timing(embassy_rp::clocks::clk_sys_freq(), frequency_hz)
            .ok_or(RpPwmError::FrequencyOutOfRange)?;

        self.config.top = timing.top;
        self.config.divider = timing.divider.into();
        self.set_compare(duty.compare_for(timing.top));
        self.config.enable = true;
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.set_compare(0);
        self.config.enable = false;
        self.pwm.set_config(&self.config);
        Ok(())
    }
}
