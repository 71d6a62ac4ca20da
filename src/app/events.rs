//! Outbound application events.
//!
//! The [`RelayController`](super::service::RelayController) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them — print to the serial console,
//! count them in a test, etc.

use super::commands::RelayCommand;
use super::heartbeat::HeartbeatSnapshot;
use crate::error::Error;

/// Why every relay was forced off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// The BLE peer went away.
    PeerDisconnected,
    /// Operator emergency stop.
    EmergencyStop,
    /// About to restart the device.
    Reset,
}

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The controller is up; carries the advertised device name.
    Started(heapless::String<24>),

    /// A BLE write was parsed and queued for the control task.
    CommandQueued(RelayCommand),

    /// A BLE write was dropped (malformed or queue full).
    CommandRejected(Error),

    /// The control task drove a relay.
    RelaySwitched { channel: u8, on: bool, gpio: i32 },

    /// A command could not be applied.
    RelayFault(Error),

    /// A queued command was discarded because the peer is gone.
    CommandDiscarded(RelayCommand),

    /// A peer connected.
    Connected,

    /// The peer disconnected.
    Disconnected,

    /// Every relay was forced off; `switched` channels changed state and
    /// `dropped` pending commands were discarded.
    AllOff {
        reason: ShutdownReason,
        switched: usize,
        dropped: usize,
    },

    /// Advertising was restarted after a disconnect.
    AdvertisingRestarted,

    /// Periodic (or on-demand) status snapshot.
    Heartbeat(HeartbeatSnapshot),
}
