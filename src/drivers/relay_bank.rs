//! Four-channel relay bank.
//!
//! Owns one `embedded_hal` output pin per channel and the last-known
//! logical state of each. Channels are addressed 1..=4 externally; the
//! bank translates to 0-based indices internally.
//!
//! ## Safety contract
//!
//! The bank is a dumb actuator. Range validation happens at the parser
//! boundary, and the controller serialises every mutation behind one
//! mutex so a safety shutdown cannot interleave with a normal command.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the pins are `PinDriver`s. On host/test any
//! `OutputPin` works — tests use a counting mock.

use core::fmt;

use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, warn};

/// Number of relay channels on the board.
pub const CHANNEL_COUNT: usize = 4;

/// Errors from driving a relay output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    /// The GPIO write for this 1-based channel failed.
    PinWrite(u8),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PinWrite(ch) => write!(f, "GPIO write failed on relay {ch}"),
        }
    }
}

/// Logical states of every channel, indexed by `channel - 1`.
pub type RelayStates = [bool; CHANNEL_COUNT];

pub struct RelayBank<P: OutputPin> {
    pins: [P; CHANNEL_COUNT],
    states: RelayStates,
}

impl<P: OutputPin> RelayBank<P> {
    /// Take ownership of the pins and drive every output LOW.
    ///
    /// A pin that cannot be driven at startup is logged and left as-is;
    /// its logical state still reads OFF.
    pub fn new(pins: [P; CHANNEL_COUNT]) -> Self {
        let mut bank = Self {
            pins,
            states: [false; CHANNEL_COUNT],
        };
        for idx in 0..CHANNEL_COUNT {
            if bank.pins[idx].set_low().is_err() {
                warn!("Relay {}: initial LOW failed", idx + 1);
            }
        }
        bank
    }

    /// Drive channel `channel` (1..=4) to `on` and record it.
    ///
    /// The logical state only changes when the GPIO write succeeds.
    pub fn set_channel(&mut self, channel: u8, on: bool) -> Result<(), RelayError> {
        debug_assert!(
            (1..=CHANNEL_COUNT as u8).contains(&channel),
            "relay channel {channel} out of range"
        );
        let idx = usize::from(channel) - 1;
        self.pins[idx]
            .set_state(PinState::from(on))
            .map_err(|_| RelayError::PinWrite(channel))?;
        self.states[idx] = on;
        Ok(())
    }

    /// Last-known logical state of channel `channel` (1..=4).
    pub fn get_channel(&self, channel: u8) -> bool {
        debug_assert!(
            (1..=CHANNEL_COUNT as u8).contains(&channel),
            "relay channel {channel} out of range"
        );
        self.states[usize::from(channel) - 1]
    }

    /// Force every channel OFF.
    ///
    /// Only channels currently ON are actuated, so repeated calls cause no
    /// extra GPIO traffic. Every channel is attempted even if one fails;
    /// the first failure is returned. Returns how many channels switched.
    pub fn all_off(&mut self) -> Result<usize, RelayError> {
        let mut switched = 0;
        let mut first_err = None;
        for idx in 0..CHANNEL_COUNT {
            if !self.states[idx] {
                continue;
            }
            let channel = idx as u8 + 1;
            match self.pins[idx].set_low() {
                Ok(()) => {
                    self.states[idx] = false;
                    switched += 1;
                    debug!("Relay {}: forced OFF", channel);
                }
                Err(_) => {
                    warn!("Relay {}: forced OFF failed", channel);
                    first_err.get_or_insert(RelayError::PinWrite(channel));
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(switched),
        }
    }

    /// Copy of every channel's logical state.
    pub fn states(&self) -> RelayStates {
        self.states
    }

    /// Number of channels currently ON.
    pub fn active_count(&self) -> usize {
        self.states.iter().filter(|on| **on).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Pin that counts every write through a shared counter.
    struct CountingPin {
        high: bool,
        writes: Rc<Cell<u32>>,
    }

    impl embedded_hal::digital::ErrorType for CountingPin {
        type Error = Infallible;
    }

    impl OutputPin for CountingPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            self.writes.set(self.writes.get() + 1);
            Ok(())
        }
    }

    fn make_bank() -> (RelayBank<CountingPin>, Rc<Cell<u32>>) {
        let writes = Rc::new(Cell::new(0));
        let pins = core::array::from_fn(|_| CountingPin {
            high: true,
            writes: Rc::clone(&writes),
        });
        let bank = RelayBank::new(pins);
        writes.set(0);
        (bank, writes)
    }

    #[test]
    fn starts_all_off_with_pins_low() {
        let (bank, _) = make_bank();
        assert_eq!(bank.states(), [false; CHANNEL_COUNT]);
        assert!(bank.pins.iter().all(|p| !p.high));
    }

    #[test]
    fn set_channel_touches_only_that_channel() {
        let (mut bank, _) = make_bank();
        bank.set_channel(3, true).unwrap();
        assert_eq!(bank.states(), [false, false, true, false]);
        assert!(bank.pins[2].high);
        assert_eq!(bank.active_count(), 1);
        assert!(bank.get_channel(3));
        assert!(!bank.get_channel(1));
    }

    #[test]
    fn all_off_clears_every_channel() {
        let (mut bank, _) = make_bank();
        bank.set_channel(1, true).unwrap();
        bank.set_channel(4, true).unwrap();
        assert_eq!(bank.all_off(), Ok(2));
        assert_eq!(bank.states(), [false; CHANNEL_COUNT]);
        assert!(bank.pins.iter().all(|p| !p.high));
    }

    #[test]
    fn all_off_is_idempotent() {
        let (mut bank, writes) = make_bank();
        bank.set_channel(2, true).unwrap();
        bank.all_off().unwrap();
        let after_first = writes.get();

        assert_eq!(bank.all_off(), Ok(0));
        assert_eq!(writes.get(), after_first, "no duplicate actuation");
    }
}
