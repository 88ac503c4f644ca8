//! Fuzz target: `LineDecoder::feed` and `Command::parse`
//!
//! Arbitrary serial input must never panic, never yield an empty or
//! oversized line, and every yielded line must classify.
//!
//! cargo fuzz run fuzz_line_decoder

#![no_main]

use libfuzzer_sys::fuzz_target;
use tillm_gateway::app::commands::Command;
use tillm_gateway::app::dispatcher::{LineDecoder, LineEvent, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let mut decoder = LineDecoder::new();

    for &byte in data {
        if let Some(LineEvent::Line(line)) = decoder.feed(byte) {
            assert!(!line.is_empty(), "decoder must not yield empty lines");
            assert!(line.len() <= MAX_LINE_LEN, "line exceeds MAX_LINE_LEN");
            let _ = Command::parse(line).kind();
        }
    }
});
