//! Cup dropping station
//!
//! A servo-operated gate holds a stack of cups above the carousel. Swinging
//! the gate to the release position lets the bottom cup fall; swinging it
//! back re-arms the stack. A detector under the gate sees the cup land.
//!
//! The detector is active low by default (pull-up, a cup pulls the line
//! low), so a landing cup shows up as a falling edge. Glitch filtering is
//! expected from the pin layer.

use alloc::boxed::Box;
use core::pin::pin;

use embassy_futures::select::{select, Either};
use embassy_time::{with_timeout, Duration, Timer};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;
use mulenado_core::config::CupConfig;
use mulenado_core::order::Drink;
use mulenado_core::traits::{Dispenser, DispenserError, DispenserFuture};
use mulenado_hal::PwmOutput;

use crate::servo::Servo;

/// Cup station: servo gate plus landing detector
pub struct CupDispenser<P, D> {
    servo: Servo<P>,
    detector: D,
    config: CupConfig,
}

impl<P: PwmOutput, D: InputPin + Wait> CupDispenser<P, D> {
    pub fn new(servo_pwm: P, detector: D, config: CupConfig) -> Self {
        Self {
            servo: Servo::new(servo_pwm, config.servo_frequency_hz),
            detector,
            config,
        }
    }

    pub fn config(&self) -> &CupConfig {
        &self.config
    }

    /// Move the gate to the armed position
    pub fn arm(&mut self) -> Result<(), DispenserError> {
        self.servo
            .set_pulse_width_us(self.config.armed_pulse_us)
            .map_err(DispenserError::actuator)
    }

    /// Detector currently sees a cup
    pub fn cup_present(&mut self) -> Result<bool, DispenserError> {
        let low = self.detector.is_low().map_err(DispenserError::sensor)?;
        Ok(low == self.config.detector_active_low)
    }

    async fn dispense(&mut self, drink: &mut Drink) -> Result<bool, DispenserError> {
        if self.cup_present()? {
            error!("CUP: already a cup in position");
            return Err(DispenserError::StationConflict);
        }

        let Self {
            servo,
            detector,
            config,
        } = self;

        // Listen before the gate moves so a fast drop is not missed
        let mut settle = pin!(wait_settled(detector, config));
        let mut release = pin!(release_cycle(servo, config));

        match select(&mut settle, &mut release).await {
            Either::First(settled) => {
                // Always finish re-arming before reporting
                release.await?;
                settled?;
            }
            Either::Second(released) => {
                released?;
                settle.await?;
            }
        }

        info!("CUP: cup registered in position, order {}", drink.id.0);
        drink.cup.done = true;
        Ok(true)
    }

    async fn exercise(&mut self) -> Result<bool, DispenserError> {
        info!("CUP: self-test sequence");
        let dwell = self.config.dwell_ms as u64;
        for pulse_us in [
            self.config.armed_pulse_us,
            self.config.release_pulse_us,
            self.config.armed_pulse_us,
        ] {
            self.servo
                .set_pulse_width_us(pulse_us)
                .map_err(DispenserError::actuator)?;
            Timer::after_millis(dwell).await;
        }
        Ok(true)
    }
}

async fn wait_settled<D: Wait>(detector: &mut D, config: &CupConfig) -> Result<(), DispenserError> {
    let edge = async {
        let result = if config.detector_active_low {
            detector.wait_for_falling_edge().await
        } else {
            detector.wait_for_rising_edge().await
        };
        result.map_err(DispenserError::sensor)
    };

    match config.settle_timeout_ms {
        None => edge.await,
        Some(ms) => with_timeout(Duration::from_millis(ms as u64), edge)
            .await
            .map_err(|_| {
                warn!("CUP: no cup detected within {} ms", ms);
                DispenserError::SettleTimeout
            })?,
    }
}

async fn release_cycle<P: PwmOutput>(
    servo: &mut Servo<P>,
    config: &CupConfig,
) -> Result<(), DispenserError> {
    info!("CUP: releasing cup");
    servo
        .set_pulse_width_us(config.release_pulse_us)
        .map_err(DispenserError::actuator)?;
    Timer::after_millis(config.dwell_ms as u64).await;
    servo
        .set_pulse_width_us(config.armed_pulse_us)
        .map_err(DispenserError::actuator)
}

impl<P: PwmOutput, D: InputPin + Wait> Dispenser for CupDispenser<P, D> {
    fn accept_task<'a>(
        &'a mut self,
        current: Option<&'a mut Drink>,
        _next: Option<Drink>,
    ) -> DispenserFuture<'a> {
        Box::pin(async move {
            match current {
                Some(drink) => self.dispense(drink).await,
                None => Ok(true),
            }
        })
    }

    fn heads_up<'a>(&'a mut self, _drink: &'a Drink) -> DispenserFuture<'a> {
        Box::pin(async { Ok(true) })
    }

    fn self_test(&mut self) -> DispenserFuture<'_> {
        Box::pin(self.exercise())
    }

    fn name(&self) -> &'static str {
        "cup"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::join::join;
    use embassy_time::Instant;
    use mulenado_core::order::OrderId;
    use mulenado_hal::pwm;
    use mulenado_hal::sim::{SimInput, SimLine, SimPwm, SimPwmChannel};

    fn fast_config() -> CupConfig {
        CupConfig {
            dwell_ms: 20,
            ..CupConfig::default()
        }
    }

    fn cup<'a>(
        channel: &'a SimPwmChannel,
        detector: &'a SimLine,
        config: CupConfig,
    ) -> CupDispenser<SimPwm<'a>, SimInput<'a>> {
        CupDispenser::new(channel.output(), detector.input(), config)
    }

    #[test]
    fn test_empty_slot_is_noop() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());

        assert_eq!(block_on(cup.accept_task(None, None)), Ok(true));
        assert_eq!(channel.write_count(), 0);
        assert_eq!(detector.listener_count(), 0);
    }

    #[test]
    fn test_occupied_station_conflicts() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(false); // low: cup already there
        let mut cup = cup(&channel, &detector, fast_config());
        let mut drink = Drink::new(OrderId(1));

        let result = block_on(cup.accept_task(Some(&mut drink), None));

        assert_eq!(result, Err(DispenserError::StationConflict));
        assert_eq!(channel.write_count(), 0);
        assert!(!drink.cup.done);
    }

    #[test]
    fn test_drop_waits_for_edge_and_rearm() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());
        let mut drink = Drink::new(OrderId(3));
        let start = Instant::now();

        let (result, ()) = block_on(join(cup.accept_task(Some(&mut drink), None), async {
            Timer::after_millis(5).await;
            detector.set_low();
        }));

        assert_eq!(result, Ok(true));
        assert!(drink.cup.done);
        assert!(start.elapsed() >= Duration::from_millis(20));
        // release then armed
        assert_eq!(channel.write_count(), 2);
        assert_eq!(channel.duty().basis_points(), 400);
        assert_eq!(detector.listener_count(), 0);
    }

    #[test]
    fn test_late_edge_still_completes() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());
        let mut drink = Drink::new(OrderId(4));

        let (result, ()) = block_on(join(cup.accept_task(Some(&mut drink), None), async {
            Timer::after_millis(40).await;
            detector.set_low();
        }));

        assert_eq!(result, Ok(true));
        assert!(drink.cup.done);
    }

    #[test]
    fn test_active_high_detector() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(false);
        let config = CupConfig {
            detector_active_low: false,
            ..fast_config()
        };
        let mut cup = cup(&channel, &detector, config);
        let mut drink = Drink::new(OrderId(5));

        let (result, ()) = block_on(join(cup.accept_task(Some(&mut drink), None), async {
            Timer::after_millis(5).await;
            detector.set_high();
        }));

        assert_eq!(result, Ok(true));
    }

    #[test]
    fn test_settle_timeout() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let config = CupConfig {
            settle_timeout_ms: Some(50),
            ..fast_config()
        };
        let mut cup = cup(&channel, &detector, config);
        let mut drink = Drink::new(OrderId(6));

        let result = block_on(cup.accept_task(Some(&mut drink), None));

        assert_eq!(result, Err(DispenserError::SettleTimeout));
        assert!(!drink.cup.done);
        // Gate is re-armed even though no cup arrived
        assert_eq!(channel.duty().basis_points(), 400);
        assert_eq!(detector.listener_count(), 0);
    }

    #[test]
    fn test_servo_failure_reported() {
        let channel = SimPwmChannel::new();
        channel.fail_after(0);
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());
        let mut drink = Drink::new(OrderId(7));

        let result = block_on(cup.accept_task(Some(&mut drink), None));

        assert_eq!(result, Err(DispenserError::Actuator(pwm::ErrorKind::Other)));
        assert_eq!(detector.listener_count(), 0);
    }

    #[test]
    fn test_self_test_sequence() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());
        let start = Instant::now();

        assert_eq!(block_on(cup.self_test()), Ok(true));

        assert!(start.elapsed() >= Duration::from_millis(60));
        assert_eq!(channel.write_count(), 3);
        assert_eq!(channel.duty().basis_points(), 400);
    }

    #[test]
    fn test_heads_up_succeeds() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());
        let drink = Drink::new(OrderId(8));

        assert_eq!(block_on(cup.heads_up(&drink)), Ok(true));
        assert_eq!(cup.name(), "cup");
    }

    #[test]
    fn test_arm_and_presence() {
        let channel = SimPwmChannel::new();
        let detector = SimLine::new(true);
        let mut cup = cup(&channel, &detector, fast_config());

        cup.arm().unwrap();
        assert_eq!(channel.duty().basis_points(), 400);
        assert_eq!(cup.cup_present(), Ok(false));
        detector.set_low();
        assert_eq!(cup.cup_present(), Ok(true));
    }
}
