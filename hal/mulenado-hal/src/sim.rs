//! Simulated pins for host-side tests
//!
//! A [`SimLine`] is one digital wire. Tests own the line and hand out
//! [`SimInput`] / [`SimOutput`] views to the code under test, then drive or
//! observe the wire directly. [`SimPwmChannel`] records what a PWM output was
//! asked to do and can be told to fail.
//!
//! Everything here is single-threaded (`Cell` based), matching the
//! cooperative executor the core runs on.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::pubsub::{PubSubChannel, Subscriber};
use embedded_hal::digital::{self, ErrorType, InputPin, OutputPin, StatefulOutputPin};
use embedded_hal_async::digital::Wait;

use crate::pwm::{self, Duty, PwmOutput};

/// Edges buffered per listener
const EDGE_CAPACITY: usize = 8;

/// Concurrent listeners per line
const MAX_LISTENERS: usize = 4;

type EdgeChannel = PubSubChannel<NoopRawMutex, bool, EDGE_CAPACITY, MAX_LISTENERS, 1>;
type EdgeSubscriber<'a> = Subscriber<'a, NoopRawMutex, bool, EDGE_CAPACITY, MAX_LISTENERS, 1>;

/// Simulated pin failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    /// Fault injected by the test
    Fault,
    /// More concurrent edge waits than the line supports
    TooManyListeners,
}

impl digital::Error for SimError {
    fn kind(&self) -> digital::ErrorKind {
        digital::ErrorKind::Other
    }
}

impl pwm::Error for SimError {
    fn kind(&self) -> pwm::ErrorKind {
        pwm::ErrorKind::Other
    }
}

/// A simulated digital wire
pub struct SimLine {
    high: Cell<bool>,
    fault: Cell<bool>,
    listeners: Cell<usize>,
    edges: EdgeChannel,
}

impl SimLine {
    /// Create a line at the given initial level
    pub const fn new(high: bool) -> Self {
        Self {
            high: Cell::new(high),
            fault: Cell::new(false),
            listeners: Cell::new(0),
            edges: PubSubChannel::new(),
        }
    }

    /// Drive the line. Listeners see an edge only if the level changes.
    pub fn set_level(&self, high: bool) {
        if self.high.replace(high) != high {
            self.edges.immediate_publisher().publish_immediate(high);
        }
    }

    /// Drive the line high
    pub fn set_high(&self) {
        self.set_level(true);
    }

    /// Drive the line low
    pub fn set_low(&self) {
        self.set_level(false);
    }

    /// Produce one rising edge followed by a falling edge
    pub fn pulse(&self) {
        self.set_high();
        self.set_low();
    }

    /// Current level
    pub fn is_high(&self) -> bool {
        self.high.get()
    }

    /// Make every read, write and wait on this line fail
    pub fn set_fault(&self, fault: bool) {
        self.fault.set(fault);
    }

    /// Number of edge waits currently registered on this line
    pub fn listener_count(&self) -> usize {
        self.listeners.get()
    }

    /// Input view of this line
    pub fn input(&self) -> SimInput<'_> {
        SimInput { line: self }
    }

    /// Output view of this line
    pub fn output(&self) -> SimOutput<'_> {
        SimOutput { line: self }
    }

    fn check(&self) -> Result<(), SimError> {
        if self.fault.get() {
            Err(SimError::Fault)
        } else {
            Ok(())
        }
    }

    fn listen(&self) -> Result<EdgeListener<'_>, SimError> {
        let subscriber = self
            .edges
            .subscriber()
            .map_err(|_| SimError::TooManyListeners)?;
        self.listeners.set(self.listeners.get() + 1);
        Ok(EdgeListener {
            subscriber,
            count: &self.listeners,
        })
    }
}

/// Registered interest in a line's edges; released on drop
struct EdgeListener<'a> {
    subscriber: EdgeSubscriber<'a>,
    count: &'a Cell<usize>,
}

impl EdgeListener<'_> {
    async fn wait_for(&mut self, level: Option<bool>) {
        loop {
            let high = self.subscriber.next_message_pure().await;
            if level.map_or(true, |want| want == high) {
                return;
            }
        }
    }
}

impl Drop for EdgeListener<'_> {
    fn drop(&mut self) {
        self.count.set(self.count.get().saturating_sub(1));
    }
}

/// Input view of a [`SimLine`]
pub struct SimInput<'a> {
    line: &'a SimLine,
}

impl SimInput<'_> {
    async fn edge(&mut self, level: Option<bool>) -> Result<(), SimError> {
        self.line.check()?;
        let mut listener = self.line.listen()?;
        listener.wait_for(level).await;
        Ok(())
    }
}

impl ErrorType for SimInput<'_> {
    type Error = SimError;
}

impl InputPin for SimInput<'_> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.line.check()?;
        Ok(self.line.is_high())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}

impl Wait for SimInput<'_> {
    async fn wait_for_high(&mut self) -> Result<(), Self::Error> {
        if self.is_high()? {
            return Ok(());
        }
        self.edge(Some(true)).await
    }

    async fn wait_for_low(&mut self) -> Result<(), Self::Error> {
        if self.is_low()? {
            return Ok(());
        }
        self.edge(Some(false)).await
    }

    async fn wait_for_rising_edge(&mut self) -> Result<(), Self::Error> {
        self.edge(Some(true)).await
    }

    async fn wait_for_falling_edge(&mut self) -> Result<(), Self::Error> {
        self.edge(Some(false)).await
    }

    async fn wait_for_any_edge(&mut self) -> Result<(), Self::Error> {
        self.edge(None).await
    }
}

/// Output view of a [`SimLine`]
pub struct SimOutput<'a> {
    line: &'a SimLine,
}

impl ErrorType for SimOutput<'_> {
    type Error = SimError;
}

impl OutputPin for SimOutput<'_> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.line.check()?;
        self.line.set_low();
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.line.check()?;
        self.line.set_high();
        Ok(())
    }
}

impl StatefulOutputPin for SimOutput<'_> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.line.is_high())
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.line.is_high())
    }
}

/// A simulated PWM channel
pub struct SimPwmChannel {
    frequency_hz: Cell<u32>,
    peak_frequency_hz: Cell<u32>,
    duty: Cell<Duty>,
    enabled: Cell<bool>,
    writes: Cell<usize>,
    fail_after: Cell<Option<usize>>,
}

impl Default for SimPwmChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl SimPwmChannel {
    /// Create a disabled channel
    pub const fn new() -> Self {
        Self {
            frequency_hz: Cell::new(0),
            peak_frequency_hz: Cell::new(0),
            duty: Cell::new(Duty::OFF),
            enabled: Cell::new(false),
            writes: Cell::new(0),
            fail_after: Cell::new(None),
        }
    }

    /// Output view of this channel
    pub fn output(&self) -> SimPwm<'_> {
        SimPwm { channel: self }
    }

    /// Frequency last written (0 when disabled)
    pub fn frequency_hz(&self) -> u32 {
        self.frequency_hz.get()
    }

    /// Highest frequency ever written
    pub fn peak_frequency_hz(&self) -> u32 {
        self.peak_frequency_hz.get()
    }

    /// Duty last written
    pub fn duty(&self) -> Duty {
        self.duty.get()
    }

    /// Whether the channel is currently producing output
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Number of successful `set_output` calls
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Fail every `set_output` once `writes` successful writes have happened
    pub fn fail_after(&self, writes: usize) {
        self.fail_after.set(Some(writes));
    }
}

/// Output view of a [`SimPwmChannel`]
pub struct SimPwm<'a> {
    channel: &'a SimPwmChannel,
}

impl pwm::ErrorType for SimPwm<'_> {
    type Error = SimError;
}

impl PwmOutput for SimPwm<'_> {
    fn set_output(&mut self, frequency_hz: u32, duty: Duty) -> Result<(), Self::Error> {
        let channel = self.channel;
        if channel
            .fail_after
            .get()
            .is_some_and(|limit| channel.writes.get() >= limit)
        {
            return Err(SimError::Fault);
        }
        channel.frequency_hz.set(frequency_hz);
        channel
            .peak_frequency_hz
            .set(channel.peak_frequency_hz.get().max(frequency_hz));
        channel.duty.set(duty);
        channel.enabled.set(true);
        channel.writes.set(channel.writes.get() + 1);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), Self::Error> {
        self.channel.frequency_hz.set(0);
        self.channel.enabled.set(false);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;

    #[test]
    fn test_level_changes_publish_edges() {
        let line = SimLine::new(false);
        let mut input = line.input();

        block_on(async {
            let (result, ()) = join(input.wait_for_rising_edge(), async {
                line.set_low(); // no change, no edge
                line.set_high();
            })
            .await;
            assert_eq!(result, Ok(()));
        });
        assert!(line.is_high());
    }

    #[test]
    fn test_listener_released_on_completion() {
        let line = SimLine::new(true);
        let mut input = line.input();

        block_on(async {
            let (result, ()) = join(input.wait_for_falling_edge(), async {
                line.set_low();
            })
            .await;
            assert_eq!(result, Ok(()));
        });
        assert_eq!(line.listener_count(), 0);
    }

    #[test]
    fn test_fault_injection() {
        let line = SimLine::new(false);
        line.set_fault(true);
        assert_eq!(line.input().is_high(), Err(SimError::Fault));
        assert_eq!(line.output().set_high(), Err(SimError::Fault));
        assert!(!line.is_high());
    }

    #[test]
    fn test_pwm_records_and_fails() {
        let channel = SimPwmChannel::new();
        let mut pwm = channel.output();

        pwm.set_output(1_000, Duty::HALF).unwrap();
        pwm.set_output(400, Duty::HALF).unwrap();
        assert_eq!(channel.frequency_hz(), 400);
        assert_eq!(channel.peak_frequency_hz(), 1_000);
        assert_eq!(channel.write_count(), 2);

        channel.fail_after(2);
        assert_eq!(pwm.set_output(500, Duty::HALF), Err(SimError::Fault));

        pwm.disable().unwrap();
        assert!(!channel.is_enabled());
        assert_eq!(channel.frequency_hz(), 0);
    }
}
