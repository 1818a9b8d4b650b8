//! Step/direction/enable stepper driver
//!
//! Works with any "dumb" stepper driver (A4988, DRV8825, TMC2209 in
//! standalone mode): a PWM output produces the step pulse train, two GPIOs
//! select direction and energize the coils.
//!
//! # Pin levels
//!
//! | Signal    | Default                          |
//! |-----------|----------------------------------|
//! | enable    | active low (`enable_inverted`)   |
//! | direction | low = clockwise, high = counter-clockwise |

use embedded_hal::digital::{OutputPin, PinState};
use mulenado_core::config::StepperConfig;
use mulenado_core::traits::{Direction, StepperDriver, StepperError};
use mulenado_hal::{Duty, PwmOutput};

/// Pulse stepper configuration
#[derive(Debug, Clone, Copy)]
pub struct PulseStepperConfig {
    /// Enable pin is active low
    pub enable_inverted: bool,
    /// Swap the direction pin levels
    pub direction_inverted: bool,
    /// Step pulse duty cycle
    pub duty: Duty,
}

impl Default for PulseStepperConfig {
    fn default() -> Self {
        Self {
            enable_inverted: true,
            direction_inverted: false,
            duty: Duty::HALF,
        }
    }
}

impl From<&StepperConfig> for PulseStepperConfig {
    fn from(config: &StepperConfig) -> Self {
        Self {
            enable_inverted: config.enable_inverted,
            direction_inverted: config.direction_inverted,
            duty: Duty::from_percent(config.pulse_duty_percent),
        }
    }
}

/// Stepper driven by a PWM step output and enable/direction GPIOs
pub struct PulseStepper<STEP, EN, DIR> {
    step: STEP,
    enable_pin: EN,
    dir_pin: DIR,
    config: PulseStepperConfig,
    /// Current frequency in Hz
    frequency_hz: u32,
    direction: Direction,
    enabled: bool,
}

impl<STEP: PwmOutput, EN: OutputPin, DIR: OutputPin> PulseStepper<STEP, EN, DIR> {
    /// Create a driver with pulses stopped and coils released
    pub fn new(
        step: STEP,
        enable_pin: EN,
        dir_pin: DIR,
        config: PulseStepperConfig,
    ) -> Result<Self, StepperError> {
        let mut stepper = Self {
            step,
            enable_pin,
            dir_pin,
            config,
            frequency_hz: 0,
            direction: Direction::Clockwise,
            enabled: false,
        };
        stepper.step.disable().map_err(StepperError::pulse)?;
        stepper.drive_enable(false)?;
        stepper.set_direction(Direction::Clockwise)?;
        Ok(stepper)
    }

    fn drive_enable(&mut self, enabled: bool) -> Result<(), StepperError> {
        // Active low: low = enabled
        let high = enabled != self.config.enable_inverted;
        self.enable_pin
            .set_state(PinState::from(high))
            .map_err(StepperError::pin)?;
        self.enabled = enabled;
        Ok(())
    }

    /// Release the pins
    pub fn free(self) -> (STEP, EN, DIR) {
        (self.step, self.enable_pin, self.dir_pin)
    }
}

impl<STEP: PwmOutput, EN: OutputPin, DIR: OutputPin> StepperDriver for PulseStepper<STEP, EN, DIR> {
    fn set_direction(&mut self, dir: Direction) -> Result<(), StepperError> {
        let high = (dir == Direction::CounterClockwise) != self.config.direction_inverted;
        self.dir_pin
            .set_state(PinState::from(high))
            .map_err(StepperError::pin)?;
        self.direction = dir;
        Ok(())
    }

    fn direction(&self) -> Direction {
        self.direction
    }

    fn enable(&mut self) -> Result<(), StepperError> {
        self.drive_enable(true)
    }

    fn disable(&mut self) -> Result<(), StepperError> {
        self.drive_enable(false)
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_frequency(&mut self, frequency_hz: u32) -> Result<(), StepperError> {
        if frequency_hz == 0 {
            self.step.disable().map_err(StepperError::pulse)?;
        } else {
            self.step
                .set_output(frequency_hz, self.config.duty)
                .map_err(StepperError::pulse)?;
        }
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    fn frequency(&self) -> u32 {
        self.frequency_hz
    }
}
