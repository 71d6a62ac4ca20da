//! Connection state tracker.
//!
//! Holds the current BLE link state plus the value last observed by the
//! supervisory loop. The transport's connect/disconnect callbacks write
//! `current`; tasks read it lock-free. The supervisory loop polls
//! [`ConnectionTracker::take_edge`] to turn the level into discrete
//! transitions, which is how it learns when to re-advertise.
//!
//! ```text
//!            on_connect()
//!   Disconnected ─────────▶ Connected
//!        ▲                      │
//!        └──────────────────────┘
//!            on_disconnect()
//! ```

use core::sync::atomic::{AtomicBool, Ordering};

/// A transition observed by [`ConnectionTracker::take_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEdge {
    Connected,
    Disconnected,
}

pub struct ConnectionTracker {
    current: AtomicBool,
    previous: AtomicBool,
    /// Set on every Connected → Disconnected change, cleared by `take_edge`.
    dropped: AtomicBool,
}

impl ConnectionTracker {
    /// Starts Disconnected.
    pub const fn new() -> Self {
        Self {
            current: AtomicBool::new(false),
            previous: AtomicBool::new(false),
            dropped: AtomicBool::new(false),
        }
    }

    /// Record a new link level. Returns `true` if the level changed.
    pub fn set_connected(&self, connected: bool) -> bool {
        let changed = self.current.swap(connected, Ordering::SeqCst) != connected;
        if changed && !connected {
            self.dropped.store(true, Ordering::SeqCst);
        }
        changed
    }

    pub fn is_connected(&self) -> bool {
        self.current.load(Ordering::SeqCst)
    }

    /// Compare current against the last observed level and latch it.
    ///
    /// A disconnect is never lost: a connect/disconnect pair that completes
    /// between two polls still reports `Disconnected`.
    pub fn take_edge(&self) -> Option<ConnectionEdge> {
        let now = self.current.load(Ordering::SeqCst);
        let before = self.previous.swap(now, Ordering::SeqCst);
        let dropped = self.dropped.swap(false, Ordering::SeqCst);
        match (before, now) {
            (false, true) => Some(ConnectionEdge::Connected),
            (_, false) if dropped => Some(ConnectionEdge::Disconnected),
            _ => None,
        }
    }
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_disconnected_without_edge() {
        let t = ConnectionTracker::new();
        assert!(!t.is_connected());
        assert_eq!(t.take_edge(), None);
    }

    #[test]
    fn short_lived_connection_still_reports_disconnect() {
        let t = ConnectionTracker::new();
        t.set_connected(true);
        t.set_connected(false);
        assert_eq!(t.take_edge(), Some(ConnectionEdge::Disconnected));
        assert_eq!(t.take_edge(), None);
    }

    #[test]
    fn reports_each_edge_once() {
        let t = ConnectionTracker::new();
        assert!(t.set_connected(true));
        assert_eq!(t.take_edge(), Some(ConnectionEdge::Connected));
        assert_eq!(t.take_edge(), None);

        assert!(t.set_connected(false));
        assert_eq!(t.take_edge(), Some(ConnectionEdge::Disconnected));
        assert_eq!(t.take_edge(), None);
    }

    #[test]
    fn repeated_level_is_not_a_change() {
        let t = ConnectionTracker::new();
        assert!(t.set_connected(true));
        assert!(!t.set_connected(true));
    }
}
