//! Fuzz target: `parse_console_line`
//!
//! cargo fuzz run fuzz_console_line

#![no_main]

use embassy_time as _;
use libfuzzer_sys::fuzz_target;
use relayctl::app::commands::parse_console_line;

fuzz_target!(|data: &[u8]| {
    if let Ok(line) = core::str::from_utf8(data) {
        let _ = parse_console_line(line);
    }
});
