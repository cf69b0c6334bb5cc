//! Fuzz target for contribution timestamp parsing.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pmfkit::input::convert::parse_timestamp;

fuzz_target!(|data: &str| {
    if data.len() > 1_000 {
        return;
    }
    let _ = parse_timestamp(data);
});
