//! PWM output abstraction
//!
//! `embedded-hal` 1.0 only models the duty cycle of a PWM channel. Step pulse
//! trains and hobby servos also need the period, so the contract here sets
//! both at once.

pub use embedded_hal::pwm::{Error, ErrorKind, ErrorType};

/// Duty cycle in basis points (hundredths of a percent, 0..=10_000)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Duty(u16);

impl Duty {
    /// Basis points for a 100% duty cycle
    pub const MAX_BASIS_POINTS: u16 = 10_000;

    /// Output held low
    pub const OFF: Self = Self(0);

    /// Square wave
    pub const HALF: Self = Self(5_000);

    /// Output held high
    pub const FULL: Self = Self(Self::MAX_BASIS_POINTS);

    /// Create from basis points, saturating at 100%
    pub const fn from_basis_points(basis_points: u16) -> Self {
        if basis_points > Self::MAX_BASIS_POINTS {
            Self(Self::MAX_BASIS_POINTS)
        } else {
            Self(basis_points)
        }
    }

    /// Create from a whole percentage, saturating at 100%
    pub const fn from_percent(percent: u8) -> Self {
        Self::from_basis_points(percent as u16 * 100)
    }

    /// Create from a high time over a period (e.g. a servo pulse width in µs
    /// over a 20_000 µs frame). A zero period yields [`Duty::OFF`].
    pub fn from_ratio(high: u32, period: u32) -> Self {
        if period == 0 {
            return Self::OFF;
        }
        let bp = (high as u64 * Self::MAX_BASIS_POINTS as u64) / period as u64;
        Self::from_basis_points(bp.min(Self::MAX_BASIS_POINTS as u64) as u16)
    }

    /// Duty cycle in basis points
    pub const fn basis_points(self) -> u16 {
        self.0
    }

    /// Compare value for a counter that counts `0..=top` and holds the output
    /// high while the count is below the compare value.
    pub fn compare_for(self, top: u16) -> u16 {
        let steps = top as u32 + 1;
        let compare = steps * self.0 as u32 / Self::MAX_BASIS_POINTS as u32;
        compare.min(u16::MAX as u32) as u16
    }
}

/// PWM output with frequency control
///
/// Implementations own one physical channel. A frequency of zero is not a
/// valid output setting; use [`PwmOutput::disable`] to stop the channel.
pub trait PwmOutput: ErrorType {
    /// Start (or retune) the output at `frequency_hz` with the given duty
    fn set_output(&mut self, frequency_hz: u32, duty: Duty) -> Result<(), Self::Error>;

    /// Stop the output, leaving the pin at its idle (low) level
    fn disable(&mut self) -> Result<(), Self::Error>;
}

impl<T: PwmOutput + ?Sized> PwmOutput for &mut T {
    fn set_output(&mut self, frequency_hz: u32, duty: Duty) -> Result<(), Self::Error> {
        T::set_output(self, frequency_hz, duty)
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        T::disable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duty_saturates() {
        assert_eq!(Duty::from_basis_points(12_000), Duty::FULL);
        assert_eq!(Duty::from_percent(150), Duty::FULL);
        assert_eq!(Duty::from_percent(50), Duty::HALF);
    }

    #[test]
    fn test_duty_from_servo_pulse() {
        // 2200 µs high in a 20 ms frame
        assert_eq!(Duty::from_ratio(2_200, 20_000).basis_points(), 1_100);
        // 800 µs high in a 20 ms frame
        assert_eq!(Duty::from_ratio(800, 20_000).basis_points(), 400);
        assert_eq!(Duty::from_ratio(5, 0), Duty::OFF);
    }

    #[test]
    fn test_compare_for_top() {
        assert_eq!(Duty::HALF.compare_for(999), 500);
        assert_eq!(Duty::OFF.compare_for(999), 0);
        assert_eq!(Duty::FULL.compare_for(999), 1_000);
        // Full duty on a 16-bit counter cannot exceed u16::MAX
        assert_eq!(Duty::FULL.compare_for(u16::MAX), u16::MAX);
    }
}
