//! Inbound commands and their wire format.
//!
//! Two sources feed the controller:
//!
//! - **BLE peer** — three ASCII bytes `R<channel><state>` written to the
//!   relay characteristic, e.g. `R11` (channel 1 ON) or `R40` (channel 4
//!   OFF). Parsed by [`parse_command`] into a [`RelayCommand`].
//! - **Serial console** — operator lines (`stop`, `status`, `reset`)
//!   parsed by [`parse_console_line`] into a [`ConsoleCommand`].
//!
//! Every applied relay command is acknowledged to the peer with
//! `ACK_R<channel><state>` (see [`encode_ack`]).

use core::fmt;

use crate::drivers::relay_bank::CHANNEL_COUNT;

/// Leading byte of every relay command.
pub const COMMAND_PREFIX: u8 = b'R';

/// Minimum length of a relay command; trailing bytes are ignored.
pub const COMMAND_LEN: usize = 3;

/// Prefix of the acknowledgment notification.
pub const ACK_PREFIX: &[u8] = b"ACK_R";

/// Length of every acknowledgment: `ACK_R` + channel digit + state digit.
pub const ACK_LEN: usize = ACK_PREFIX.len() + 2;

const ACK_CAPACITY: usize = 8;

/// Acknowledgment buffer.
pub type AckBuf = heapless::Vec<u8, ACK_CAPACITY>;

const _: () = assert!(ACK_LEN <= ACK_CAPACITY);

// ───────────────────────────────────────────────────────────────
// RelayCommand
// ───────────────────────────────────────────────────────────────

/// A validated request to drive one relay channel.
///
/// Fields are private: the only way to obtain a command is through
/// [`parse_command`] or [`RelayCommand::new`], both of which enforce the
/// 1..=4 channel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayCommand {
    channel: u8,
    on: bool,
}

impl RelayCommand {
    /// Build a command, returning `None` if `channel` is outside 1..=4.
    pub const fn new(channel: u8, on: bool) -> Option<Self> {
        if channel >= 1 && channel as usize <= CHANNEL_COUNT {
            Some(Self { channel, on })
        } else {
            None
        }
    }

    /// 1-based channel number.
    pub const fn channel(&self) -> u8 {
        self.channel
    }

    /// Desired relay state (`true` = energised).
    pub const fn is_on(&self) -> bool {
        self.on
    }
}

impl fmt::Display for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Relay {} -> {}", self.channel, if self.on { "ON" } else { "OFF" })
    }
}

// ───────────────────────────────────────────────────────────────
// Parser
// ───────────────────────────────────────────────────────────────

/// Why an inbound buffer was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Fewer than three bytes.
    TooShort(usize),
    /// First byte is not `'R'`.
    BadPrefix,
    /// Channel byte is not `'1'..='4'`.
    BadChannel(u8),
    /// State byte is not `'0'` or `'1'`.
    BadState(u8),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooShort(len) => write!(f, "invalid command format: {len} bytes, need {COMMAND_LEN}"),
            Self::BadPrefix => write!(f, "invalid command format: missing 'R' prefix"),
            Self::BadChannel(b) => write!(f, "invalid command format: channel byte 0x{b:02x}"),
            Self::BadState(b) => write!(f, "invalid command format: state byte 0x{b:02x}"),
        }
    }
}

/// Translate a raw BLE write into a validated [`RelayCommand`].
///
/// Pure: no logging, no side effects. Trailing bytes past the third are
/// ignored so clients that append `\n` or `\r\n` still work.
pub fn parse_command(raw: &[u8]) -> Result<RelayCommand, ParseError> {
    let &[prefix, channel, state, ..] = raw else {
        return Err(ParseError::TooShort(raw.len()));
    };
    if prefix != COMMAND_PREFIX {
        return Err(ParseError::BadPrefix);
    }

    let channel_num = match channel {
        b'1'..=b'4' => channel - b'0',
        other => return Err(ParseError::BadChannel(other)),
    };
    let on = match state {
        b'0' => false,
        b'1' => true,
        other => return Err(ParseError::BadState(other)),
    };

    RelayCommand::new(channel_num, on).ok_or(ParseError::BadChannel(channel))
}

/// Encode the acknowledgment for an applied command, e.g. `ACK_R11`.
pub fn encode_ack(cmd: &RelayCommand) -> AckBuf {
    let mut bytes = [0u8; ACK_LEN];
    bytes[..ACK_PREFIX.len()].copy_from_slice(ACK_PREFIX);
    bytes[ACK_LEN - 2] = b'0' + cmd.channel();
    bytes[ACK_LEN - 1] = if cmd.is_on() { b'1' } else { b'0' };

    // Cannot fail: the capacity is checked at compile time above.
    let buf = AckBuf::from_slice(&bytes);
    debug_assert!(buf.is_ok());
    buf.unwrap_or_default()
}

// ───────────────────────────────────────────────────────────────
// Serial console
// ───────────────────────────────────────────────────────────────

/// Operator commands accepted on the serial console.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Force every relay off immediately and discard pending commands.
    EmergencyStop,
    /// Print a heartbeat snapshot now instead of waiting for the timer.
    Status,
    /// Turn all relays off and restart the device.
    Reset,
}

/// Parse one console line. Case-insensitive; surrounding whitespace ignored.
pub fn parse_console_line(line: &str) -> Option<ConsoleCommand> {
    let word = line.trim();
    if word.eq_ignore_ascii_case("stop") || word.eq_ignore_ascii_case("estop") {
        Some(ConsoleCommand::EmergencyStop)
    } else if word.eq_ignore_ascii_case("status") {
        Some(ConsoleCommand::Status)
    } else if word.eq_ignore_ascii_case("reset") {
        Some(ConsoleCommand::Reset)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_valid_command() {
        for channel in 1..=4u8 {
            for (state, on) in [(b'0', false), (b'1', true)] {
                let raw = [b'R', b'0' + channel, state];
                let cmd = parse_command(&raw).unwrap();
                assert_eq!(cmd.channel(), channel);
                assert_eq!(cmd.is_on(), on);
            }
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let cmd = parse_command(b"R31\r\n").unwrap();
        assert_eq!(cmd, RelayCommand::new(3, true).unwrap());
    }

    #[test]
    fn rejects_short_buffers() {
        assert_eq!(parse_command(b""), Err(ParseError::TooShort(0)));
        assert_eq!(parse_command(b"R"), Err(ParseError::TooShort(1)));
        assert_eq!(parse_command(b"R1"), Err(ParseError::TooShort(2)));
    }

    #[test]
    fn rejects_wrong_prefix() {
        assert_eq!(parse_command(b"r11"), Err(ParseError::BadPrefix));
        assert_eq!(parse_command(b"X11"), Err(ParseError::BadPrefix));
    }

    #[test]
    fn rejects_out_of_range_channel() {
        assert_eq!(parse_command(b"R01"), Err(ParseError::BadChannel(b'0')));
        assert_eq!(parse_command(b"R51"), Err(ParseError::BadChannel(b'5')));
        assert_eq!(parse_command(b"RA1"), Err(ParseError::BadChannel(b'A')));
    }

    #[test]
    fn rejects_out_of_range_state() {
        assert_eq!(parse_command(b"R12"), Err(ParseError::BadState(b'2')));
        assert_eq!(parse_command(b"R1x"), Err(ParseError::BadState(b'x')));
    }

    #[test]
    fn constructor_enforces_range() {
        assert!(RelayCommand::new(0, true).is_none());
        assert!(RelayCommand::new(5, false).is_none());
        assert!(RelayCommand::new(4, false).is_some());
    }

    #[test]
    fn ack_matches_wire_format() {
        let on = RelayCommand::new(1, true).unwrap();
        assert_eq!(encode_ack(&on).as_slice(), b"ACK_R11");
        let off = RelayCommand::new(4, false).unwrap();
        assert_eq!(encode_ack(&off).as_slice(), b"ACK_R40");
    }

    #[test]
    fn every_ack_is_complete() {
        for channel in 1..=4u8 {
            for on in [false, true] {
                let ack = encode_ack(&RelayCommand::new(channel, on).unwrap());
                assert_eq!(ack.len(), ACK_LEN);
                assert!(ack.starts_with(ACK_PREFIX));
            }
        }
    }

    #[test]
    fn console_lines() {
        assert_eq!(parse_console_line("stop"), Some(ConsoleCommand::EmergencyStop));
        assert_eq!(parse_console_line("  ESTOP\r\n"), Some(ConsoleCommand::EmergencyStop));
        assert_eq!(parse_console_line("Status"), Some(ConsoleCommand::Status));
        assert_eq!(parse_console_line("reset\n"), Some(ConsoleCommand::Reset));
        assert_eq!(parse_console_line("R11"), None);
        assert_eq!(parse_console_line(""), None);
    }
}
