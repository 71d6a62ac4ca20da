//! Fuzz target: `parse_command`
//!
//! Arbitrary BLE write payloads must never panic the parser, and anything
//! it accepts must name a real channel and encode to a well-formed ack.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use embassy_time as _;
use libfuzzer_sys::fuzz_target;
use relayctl::app::commands::{encode_ack, parse_command};

fuzz_target!(|data: &[u8]| {
    if let Ok(cmd) = parse_command(data) {
        assert!((1..=4).contains(&cmd.channel()));
        assert_eq!(data[0], b'R');

        let ack = encode_ack(&cmd);
        assert_eq!(&ack[..4], b"ACK_");
        assert_eq!(&ack[4..], &data[..3]);
    }
});
