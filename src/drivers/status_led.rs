//! Single-colour status LED driver.
//!
//! One GPIO, active-high. Applies [`IndicatorStep`]s produced by
//! [`StatusIndicator`](crate::app::indicator::StatusIndicator) and plays the
//! boot blink sequence.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the pin is a `PinDriver<Output>`. On host/test any
//! `OutputPin` works; the driver also tracks the last level it drove.

use std::thread;
use std::time::Duration;

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::indicator::IndicatorStep;

/// Number of blinks played at boot.
pub const STARTUP_BLINKS: u8 = 3;
/// On-time of each boot blink.
pub const STARTUP_ON: Duration = Duration::from_millis(150);
/// Off-time of each boot blink.
pub const STARTUP_OFF: Duration = Duration::from_millis(100);

pub struct StatusLed<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and drive it LOW.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.set(false);
        led
    }

    /// Drive the LED. A failed write is logged; the tracked level is left unchanged.
    pub fn set(&mut self, lit: bool) {
        if self.pin.set_state(PinState::from(lit)).is_err() {
            warn!("Status LED: GPIO write failed");
            return;
        }
        self.lit = lit;
    }

    /// Drive the level of `step` and return how long to hold it.
    pub fn apply(&mut self, step: IndicatorStep) -> Duration {
        self.set(step.level);
        step.hold
    }

    /// Blink [`STARTUP_BLINKS`] times so an operator can see the board booted.
    pub fn startup_sequence(&mut self) {
        for _ in 0..STARTUP_BLINKS {
            self.set(true);
            thread::sleep(STARTUP_ON);
            self.set(false);
            thread::sleep(STARTUP_OFF);
        }
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    #[derive(Default)]
    struct TracePin {
        levels: Vec<bool>,
    }

    impl embedded_hal::digital::ErrorType for TracePin {
        type Error = Infallible;
    }

    impl OutputPin for TracePin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn starts_dark() {
        let led = StatusLed::new(TracePin::default());
        assert!(!led.is_lit());
        assert_eq!(led.pin.levels, [false]);
    }

    #[test]
    fn apply_drives_level_and_returns_hold() {
        let mut led = StatusLed::new(TracePin::default());
        let hold = led.apply(IndicatorStep {
            level: true,
            hold: Duration::from_millis(500),
        });
        assert!(led.is_lit());
        assert_eq!(hold, Duration::from_millis(500));
    }

    #[test]
    fn startup_blinks_three_times_and_ends_dark() {
        let mut led = StatusLed::new(TracePin::default());
        led.startup_sequence();
        let highs = led.pin.levels.iter().filter(|l| **l).count();
        assert_eq!(highs, usize::from(STARTUP_BLINKS));
        assert!(!led.is_lit());
    }
}
