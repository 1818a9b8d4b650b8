//! Failure handling for the run loop
//!
//! Station and rotation failures never abort a tick on their own; the
//! policy decides after each rotation whether the run may go on.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FailurePolicy {
    /// Log every failure and keep cycling
    #[default]
    Continue,
    /// End the run once this many rotations in a row have failed
    HaltAfter { consecutive_rotation_failures: u16 },
}

/// What the run loop does next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Verdict {
    Continue,
    Halt,
}

impl FailurePolicy {
    /// Judge the run after a rotation, given the current failure streak
    pub fn judge(self, consecutive_rotation_failures: u16) -> Verdict {
        match self {
            FailurePolicy::Continue => Verdict::Continue,
            FailurePolicy::HaltAfter {
                consecutive_rotation_failures: limit,
            } => {
                if limit > 0 && consecutive_rotation_failures >= limit {
                    Verdict::Halt
                } else {
                    Verdict::Continue
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continue_never_halts() {
        assert_eq!(FailurePolicy::Continue.judge(u16::MAX), Verdict::Continue);
    }

    #[test]
    fn test_halt_after_streak() {
        let policy = FailurePolicy::HaltAfter {
            consecutive_rotation_failures: 2,
        };
        assert_eq!(policy.judge(0), Verdict::Continue);
        assert_eq!(policy.judge(1), Verdict::Continue);
        assert_eq!(policy.judge(2), Verdict::Halt);
    }
}
