//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART in production). Heartbeats are
//! printed as a human-readable block followed by one JSON line that host
//! tooling can grep for.

use log::{info, warn};

use crate::app::events::{AppEvent, ShutdownReason};
use crate::app::heartbeat::HeartbeatSnapshot;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &AppEvent) {
        match event {
            AppEvent::Started(name) => {
                info!("START | advertising as '{}'", name);
            }
            AppEvent::CommandQueued(cmd) => {
                info!("QUEUE | {}", cmd);
            }
            AppEvent::CommandRejected(e) => {
                warn!("QUEUE | rejected: {}", e);
            }
            AppEvent::RelaySwitched { channel, on, gpio } => {
                info!(
                    "RELAY | {}: {} (GPIO {})",
                    channel,
                    if *on { "ON" } else { "OFF" },
                    gpio
                );
            }
            AppEvent::RelayFault(e) => {
                warn!("RELAY | fault: {}", e);
            }
            AppEvent::CommandDiscarded(cmd) => {
                info!("RELAY | discarded (no peer): {}", cmd);
            }
            AppEvent::Connected => {
                info!("LINK  | peer connected");
            }
            AppEvent::Disconnected => {
                info!("LINK  | peer disconnected");
            }
            AppEvent::AllOff {
                reason,
                switched,
                dropped,
            } => {
                let why = match reason {
                    ShutdownReason::PeerDisconnected => "disconnect",
                    ShutdownReason::EmergencyStop => "EMERGENCY STOP",
                    ShutdownReason::Reset => "reset",
                };
                info!(
                    "SAFE  | all relays OFF ({}) | switched={} dropped={}",
                    why, switched, dropped
                );
            }
            AppEvent::AdvertisingRestarted => {
                info!("LINK  | advertising restarted");
            }
            AppEvent::Heartbeat(s) => log_heartbeat(s),
        }
    }
}

fn log_heartbeat(s: &HeartbeatSnapshot) {
    info!("═══════════════════════════════════");
    info!("HEART | uptime {:.2} min", s.uptime_minutes());
    info!(
        "HEART | BLE {}",
        if s.connected { "connected" } else { "disconnected" }
    );
    info!("HEART | active relays {}/{}", s.active_relays, s.total_relays);
    info!("HEART | free heap {} bytes", s.free_heap_bytes);
    info!("HEART | stack headroom {} bytes", s.min_stack_headroom_bytes);
    for ch in &s.channels {
        info!(
            "HEART |   relay {} (GPIO {}): {}",
            ch.channel,
            ch.gpio,
            if ch.on { "ON" } else { "OFF" }
        );
    }
    match serde_json::to_string(s) {
        Ok(json) => info!("HEART | {}", json),
        Err(e) => warn!("HEART | JSON encode failed: {}", e),
    }
    info!("═══════════════════════════════════");
}
