//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RelayController (domain)
//! ```
//!
//! Driven adapters (BLE transport, event sinks, clocks, system metrics)
//! implement these traits. The controller is shared between several
//! FreeRTOS tasks and the BLE callback context, so every port takes
//! `&self` and must be `Send + Sync`; adapters keep their own interior
//! mutability where they need it.

use core::fmt;

// ───────────────────────────────────────────────────────────────
// Transport port (driven adapter: domain → BLE peer)
// ───────────────────────────────────────────────────────────────

/// Outbound half of the wireless transport.
///
/// The inbound half (writes, connect/disconnect) is delivered by the
/// adapter calling into [`RelayController`](super::service::RelayController).
pub trait TransportPort: Send + Sync {
    /// Send `data` to the connected peer as a notification.
    fn notify(&self, data: &[u8]) -> Result<(), TransportError>;

    /// Make the device discoverable again after a disconnect.
    fn restart_advertising(&self) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &super::events::AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Clock and metrics ports (driven adapters: platform → domain)
// ───────────────────────────────────────────────────────────────

/// Monotonic time since boot.
pub trait ClockPort: Send + Sync {
    fn uptime_ms(&self) -> u64;
}

/// Memory headroom figures reported by the heartbeat.
pub trait SystemMetricsPort: Send + Sync {
    /// Currently free heap, bytes.
    fn free_heap_bytes(&self) -> u32;

    /// Smallest stack headroom observed for the calling task, bytes.
    fn min_stack_headroom_bytes(&self) -> u32;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`TransportPort`] operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// No peer is connected (or the characteristic is not registered yet).
    NotConnected,
    /// The peer has not enabled notifications in the CCCD.
    NotSubscribed,
    /// Payload exceeds what the characteristic can carry.
    PayloadTooLong,
    /// The BLE stack returned an error code.
    Stack(i32),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "no peer connected"),
            Self::NotSubscribed => write!(f, "peer has notifications disabled"),
            Self::PayloadTooLong => write!(f, "payload too long"),
            Self::Stack(rc) => write!(f, "BLE stack error (rc={})", rc),
        }
    }
}
