//! GPIO pin assignments for the relay controller board.
//!
//! Single source of truth — the hardware adapter and the heartbeat report
//! reference this module rather than hard-coding pin numbers.

use crate::drivers::relay_bank::CHANNEL_COUNT;

// ---------------------------------------------------------------------------
// Relay outputs (active HIGH, driven through the opto-isolated relay board)
// ---------------------------------------------------------------------------

pub const RELAY_1_GPIO: i32 = 23;
pub const RELAY_2_GPIO: i32 = 5;
pub const RELAY_3_GPIO: i32 = 4;
pub const RELAY_4_GPIO: i32 = 13;

/// Relay GPIOs indexed by `channel - 1`.
pub const RELAY_GPIOS: [i32; CHANNEL_COUNT] = [RELAY_1_GPIO, RELAY_2_GPIO, RELAY_3_GPIO, RELAY_4_GPIO];

// ---------------------------------------------------------------------------
// Status LED (single colour, active HIGH)
// ---------------------------------------------------------------------------

pub const STATUS_LED_GPIO: i32 = 15;
