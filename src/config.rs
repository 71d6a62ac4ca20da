//! System configuration parameters
//!
//! All tunable timing, sizing and scheduling parameters for the relay
//! controller. Defaults reproduce the behaviour operators expect from the
//! shipped firmware; there is no persistence layer, so a restart always
//! comes back to these values.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- BLE ---
    /// Name advertised over BLE.
    pub device_name: heapless::String<24>,
    /// Delay between a disconnect edge and restarting advertising (ms),
    /// giving the BLE stack time to settle.
    pub advertise_settle_ms: u32,

    // --- Command pipeline ---
    /// Maximum time the write callback may wait for queue space (ms).
    pub enqueue_timeout_ms: u32,

    // --- Status LED ---
    /// Re-check interval while connected and the LED is solid (ms).
    pub led_connected_recheck_ms: u32,
    /// Toggle interval while disconnected (ms).
    pub led_blink_interval_ms: u32,

    // --- Heartbeat ---
    /// Minimum time between two heartbeat snapshots (seconds).
    pub heartbeat_interval_secs: u32,
    /// How often the heartbeat task checks whether a snapshot is due (ms).
    pub heartbeat_poll_ms: u32,

    // --- Supervisory loop ---
    /// Period of the main supervisory loop (ms).
    pub supervisor_interval_ms: u32,

    // --- Task scheduling (FreeRTOS priorities, stack in KB) ---
    pub relay_task_priority: u8,
    pub status_task_priority: u8,
    pub heartbeat_task_priority: u8,
    pub relay_task_stack_kb: usize,
    pub status_task_stack_kb: usize,
    pub heartbeat_task_stack_kb: usize,
}

impl Default for SystemConfig {
    fn default() -> Self {
        let mut device_name = heapless::String::new();
        let _ = device_name.push_str("ESP32-Relay-Controller");

        Self {
            // BLE
            device_name,
            advertise_settle_ms: 500,

            // Command pipeline
            enqueue_timeout_ms: 100,

            // Status LED
            led_connected_recheck_ms: 1000,
            led_blink_interval_ms: 500,

            // Heartbeat
            heartbeat_interval_secs: 10,
            heartbeat_poll_ms: 1000,

            // Supervisory loop
            supervisor_interval_ms: 100,

            // Tasks: actuation must never be starved by logging or blinking.
            relay_task_priority: 3,
            status_task_priority: 2,
            heartbeat_task_priority: 1,
            relay_task_stack_kb: 4,
            status_task_stack_kb: 2,
            heartbeat_task_stack_kb: 4,
        }
    }
}

impl SystemConfig {
    /// Reject configurations that would break the scheduling contract.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.device_name.is_empty() {
            return Err("device_name must not be empty");
        }
        if self.enqueue_timeout_ms == 0 {
            return Err("enqueue_timeout_ms must be non-zero");
        }
        if self.enqueue_timeout_ms > 1000 {
            return Err("enqueue_timeout_ms must stay short (<= 1000)");
        }
        if self.led_blink_interval_ms == 0 || self.led_connected_recheck_ms == 0 {
            return Err("LED intervals must be non-zero");
        }
        if self.heartbeat_interval_secs == 0 || self.heartbeat_poll_ms == 0 {
            return Err("heartbeat intervals must be non-zero");
        }
        if self.supervisor_interval_ms == 0 {
            return Err("supervisor_interval_ms must be non-zero");
        }
        if !(self.relay_task_priority > self.status_task_priority
            && self.status_task_priority > self.heartbeat_task_priority)
        {
            return Err("task priorities must be relay > status > heartbeat");
        }
        Ok(())
    }

    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(u64::from(self.enqueue_timeout_ms))
    }

    pub fn advertise_settle(&self) -> Duration {
        Duration::from_millis(u64::from(self.advertise_settle_ms))
    }

    pub fn heartbeat_interval_ms(&self) -> u64 {
        u64::from(self.heartbeat_interval_secs) * 1000
    }
}
