//! Fuzz target for metadata resolution and table ingestion.
//!
//! Feeds arbitrary text as base profiles and then as contributions. A
//! rejected table must leave the dataset consistent.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pmfkit::{CanonicalDataset, Parser, RunKind, TableKind};

#[derive(Arbitrary, Debug)]
struct Input {
    profiles: String,
    contributions: String,
}

fuzz_target!(|input: Input| {
    if input.profiles.len() + input.contributions.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    let mut ds = CanonicalDataset::new();

    if let Ok(raw) = parser.parse_str("profiles", &input.profiles) {
        let _ = ds.ingest_raw(RunKind::Base, TableKind::Profiles, &raw);
    }
    if let Ok(raw) = parser.parse_str("contributions", &input.contributions) {
        let _ = ds.ingest_raw(RunKind::Base, TableKind::Contributions, &raw);
    }

    assert!(ds.check_invariants().is_ok());
});
