//! Hobby servo positioning
//!
//! A hobby servo reads the width of a pulse repeated every frame (20 ms at
//! the usual 50 Hz). Pulse widths are given in microseconds.

use mulenado_hal::{Duty, PwmOutput};

/// Standard servo frame rate
pub const DEFAULT_FRAME_HZ: u32 = 50;

pub struct Servo<P> {
    pwm: P,
    frequency_hz: u32,
}

impl<P: PwmOutput> Servo<P> {
    pub fn new(pwm: P, frequency_hz: u32) -> Self {
        Self {
            pwm,
            frequency_hz,
        }
    }

    /// Frame period in µs
    pub fn frame_us(&self) -> u32 {
        1_000_000 / self.frequency_hz.max(1)
    }

    /// Hold the servo at `pulse_us`
    pub fn set_pulse_width_us(&mut self, pulse_us: u32) -> Result<(), P::Error> {
        let duty = Duty::from_ratio(pulse_us, self.frame_us());
        self.pwm.set_output(self.frequency_hz, duty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mulenado_hal::sim::{SimError, SimPwmChannel};

    #[test]
    fn test_pulse_width_to_duty() {
        let channel = SimPwmChannel::new();
        let mut servo = Servo::new(channel.output(), DEFAULT_FRAME_HZ);
        assert_eq!(servo.frame_us(), 20_000);

        servo.set_pulse_width_us(2_200).unwrap();
        assert_eq!(channel.frequency_hz(), 50);
        assert_eq!(channel.duty().basis_points(), 1_100);

        servo.set_pulse_width_us(800).unwrap();
        assert_eq!(channel.duty().basis_points(), 400);
    }

    #[test]
    fn test_failed_write_reported() {
        let channel = SimPwmChannel::new();
        channel.fail_after(0);
        let mut servo = Servo::new(channel.output(), DEFAULT_FRAME_HZ);
        assert_eq!(servo.set_pulse_width_us(1_500), Err(SimError::Fault));
        assert!(!channel.is_enabled());
    }
}
