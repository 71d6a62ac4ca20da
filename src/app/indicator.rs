//! Status indicator logic.
//!
//! Pure function of the connection level: solid ON while connected
//! (re-checked every second), slow blink while disconnected. The
//! [`StatusLed`](crate::drivers::status_led::StatusLed) driver applies each
//! step to the pin and sleeps for `hold`.

use core::time::Duration;

use crate::config::SystemConfig;

/// One iteration of the indicator task: drive `level`, then wait `hold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorStep {
    pub level: bool,
    pub hold: Duration,
}

pub struct StatusIndicator {
    blink_level: bool,
    connected_hold: Duration,
    blink_hold: Duration,
}

impl StatusIndicator {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            blink_level: false,
            connected_hold: Duration::from_millis(u64::from(config.led_connected_recheck_ms)),
            blink_hold: Duration::from_millis(u64::from(config.led_blink_interval_ms)),
        }
    }

    pub fn step(&mut self, connected: bool) -> IndicatorStep {
        if connected {
            IndicatorStep {
                level: true,
                hold: self.connected_hold,
            }
        } else {
            self.blink_level = !self.blink_level;
            IndicatorStep {
                level: self.blink_level,
                hold: self.blink_hold,
            }
        }
    }
}
