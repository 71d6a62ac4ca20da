//! Unified error type for the relay controller firmware.
//!
//! Each subsystem keeps its own small error enum next to the code that
//! produces it; this module funnels them into a single `Error` so the
//! BLE write path and the console can report any failure uniformly.
//! All variants are `Copy` — errors cross task boundaries by value.

use core::fmt;

use crate::app::commands::ParseError;
use crate::app::ports::TransportError;
use crate::app::queue::QueueError;
use crate::drivers::relay_bank::RelayError;

/// Every per-command failure in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Inbound buffer was not a valid `R<channel><state>` command.
    Parse(ParseError),
    /// The command queue stayed full for the whole bounded wait.
    Queue(QueueError),
    /// A relay output could not be driven.
    Relay(RelayError),
    /// The BLE transport refused a notification or advertising restart.
    Transport(TransportError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Queue(e) => write!(f, "queue: {e}"),
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<QueueError> for Error {
    fn from(e: QueueError) -> Self {
        Self::Queue(e)
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
