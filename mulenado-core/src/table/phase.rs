//! Rotation phases
//!
//! Every motor write a rotation makes is a function of the current phase.

/// Where a rotation is in its velocity profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnPhase {
    /// No pulses, driver released
    #[default]
    Idle,
    /// Ramping up from the floor frequency
    Accelerating,
    /// Holding the cruise frequency
    Cruising,
    /// Ramping down towards the floor frequency
    Decelerating,
}

/// Inputs that move a rotation between phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TurnEvent {
    /// A rotation was requested
    Start,
    /// Acceleration ramp reached the cruise frequency
    RampComplete,
    /// Every requested slot has been confirmed
    SlotsConfirmed,
    /// Caller asked the rotation to stop early
    StopRequested,
    /// Pulses have stopped and the driver is released
    Halted,
    /// Motor, sensor or watchdog failure
    Fault,
}

impl TurnPhase {
    /// Process an event and return the next phase
    pub fn transition(self, event: TurnEvent) -> Self {
        use TurnEvent::*;
        use TurnPhase::*;

        match (self, event) {
            (_, Fault) | (_, Halted) => Idle,

            (Idle, Start) => Accelerating,
            (Accelerating, RampComplete) => Cruising,
            (Accelerating | Cruising, SlotsConfirmed | StopRequested) => Decelerating,

            // Invalid transitions stay in current phase
            (phase, _) => phase,
        }
    }
}
