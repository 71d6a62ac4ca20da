//! Heartbeat telemetry.
//!
//! Every ~10 s the heartbeat task emits a [`HeartbeatSnapshot`]: uptime,
//! link state, how many relays are energised, and memory headroom. The
//! schedule is measured from the last time it fired rather than a
//! fixed-rate timer, so drift under load is accepted.
//!
//! Read-only with respect to every other component; the snapshot is a
//! monitoring concern and never gates behaviour.

use serde::Serialize;

use crate::drivers::relay_bank::{CHANNEL_COUNT, RelayStates};
use crate::pins;

/// Per-channel line of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChannelStatus {
    pub channel: u8,
    pub gpio: i32,
    pub on: bool,
}

/// A point-in-time status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeartbeatSnapshot {
    pub uptime_ms: u64,
    pub connected: bool,
    pub active_relays: usize,
    pub total_relays: usize,
    pub free_heap_bytes: u32,
    pub min_stack_headroom_bytes: u32,
    pub channels: [ChannelStatus; CHANNEL_COUNT],
}

impl HeartbeatSnapshot {
    pub fn new(
        uptime_ms: u64,
        connected: bool,
        states: RelayStates,
        free_heap_bytes: u32,
        min_stack_headroom_bytes: u32,
    ) -> Self {
        let channels = core::array::from_fn(|idx| ChannelStatus {
            channel: idx as u8 + 1,
            gpio: pins::RELAY_GPIOS[idx],
            on: states[idx],
        });
        Self {
            uptime_ms,
            connected,
            active_relays: states.iter().filter(|on| **on).count(),
            total_relays: CHANNEL_COUNT,
            free_heap_bytes,
            min_stack_headroom_bytes,
            channels,
        }
    }

    /// Uptime in minutes, as shown on the console.
    pub fn uptime_minutes(&self) -> f32 {
        self.uptime_ms as f32 / 60_000.0
    }
}

/// Tracks when the last snapshot went out.
pub struct HeartbeatTimer {
    interval_ms: u64,
    last_fired_ms: u64,
}

impl HeartbeatTimer {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            last_fired_ms: 0,
        }
    }

    /// Returns `true` (and re-arms) once more than `interval_ms` has passed
    /// since the last firing. The first firing happens one interval after boot.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_fired_ms) > self.interval_ms {
            self.last_fired_ms = now_ms;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_snapshot_after_one_interval() {
        let mut t = HeartbeatTimer::new(10_000);
        assert!(!t.poll(1_000));
        assert!(!t.poll(10_000));
        assert!(t.poll(10_001));
    }

    #[test]
    fn rearms_from_last_firing() {
        let mut t = HeartbeatTimer::new(10_000);
        assert!(t.poll(12_500));
        assert!(!t.poll(20_000));
        assert!(!t.poll(22_500));
        assert!(t.poll(22_501));
    }

    #[test]
    fn snapshot_counts_active_relays() {
        let s = HeartbeatSnapshot::new(90_000, true, [true, false, true, false], 200_000, 1_024);
        assert_eq!(s.active_relays, 2);
        assert_eq!(s.total_relays, 4);
        assert_eq!(s.channels[2].channel, 3);
        assert_eq!(s.channels[2].gpio, pins::RELAY_3_GPIO);
        assert!(s.channels[2].on);
        assert!((s.uptime_minutes() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn snapshot_serialises_to_json() {
        let s = HeartbeatSnapshot::new(0, false, [false; CHANNEL_COUNT], 1, 2);
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains("\"connected\":false"));
        assert!(json.contains("\"active_relays\":0"));
    }
}
