//! Ingestion performance benchmarks.
//!
//! Measures raw-table conversion plus validation for growing sessions.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use pmfkit::{CanonicalDataset, Parser, RunKind, TableKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generate a profile table with `species` rows and `factors` columns.
fn generate_profiles(rng: &mut StdRng, species: usize, factors: usize) -> String {
    let mut data = String::from("Specie");
    for f in 0..factors {
        data.push_str(&format!(",Factor {}", f + 1));
    }
    data.push('\n');

    for s in 0..species {
        if s == 0 {
            data.push_str("PM10");
        } else {
            data.push_str(&format!("Species_{:03}", s));
        }
        for _ in 0..factors {
            let value: f64 = if s == 0 {
                rng.gen_range(1.0..20.0)
            } else {
                rng.gen_range(0.0..2.0)
            };
            data.push_str(&format!(",{:.6}", value));
        }
        data.push('\n');
    }

    data
}

/// Generate a contribution table with one row per day.
fn generate_contributions(rng: &mut StdRng, days: usize, factors: usize) -> String {
    let mut data = String::from("Date");
    for f in 0..factors {
        data.push_str(&format!(",Factor {}", f + 1));
    }
    data.push('\n');

    let start = chrono::NaiveDate::from_ymd_opt(2010, 1, 1).unwrap();
    for d in 0..days {
        let date = start + chrono::Duration::days(d as i64);
        data.push_str(&date.format("%Y-%m-%d").to_string());
        for _ in 0..factors {
            // Occasional missing samples, as written by the external tool.
            if rng.gen_ratio(1, 50) {
                data.push_str(",-999");
            } else {
                data.push_str(&format!(",{:.4}", rng.gen_range(-0.2..5.0)));
            }
        }
        data.push('\n');
    }

    data
}

/// Benchmark base-profile ingestion, which resolves the metadata.
fn bench_ingest_profiles(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_profiles");
    let mut rng = StdRng::seed_from_u64(42);

    for species in [20, 60, 200].iter() {
        let text = generate_profiles(&mut rng, *species, 10);
        let raw = Parser::new().parse_str("profiles", &text).unwrap();

        group.throughput(Throughput::Elements((*species * 10) as u64));
        group.bench_with_input(BenchmarkId::new("species", species), &raw, |b, raw| {
            b.iter(|| {
                let mut ds = CanonicalDataset::new();
                ds.ingest_raw(RunKind::Base, TableKind::Profiles, raw).unwrap();
                black_box(ds)
            })
        });
    }

    group.finish();
}

/// Benchmark contribution ingestion against existing metadata.
fn bench_ingest_contributions(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_contributions");
    let mut rng = StdRng::seed_from_u64(7);

    let profiles = Parser::new()
        .parse_str("profiles", &generate_profiles(&mut rng, 40, 10))
        .unwrap();
    let mut base = CanonicalDataset::new();
    base.ingest_raw(RunKind::Base, TableKind::Profiles, &profiles)
        .unwrap();

    for days in [365, 1_825, 3_650].iter() {
        let text = generate_contributions(&mut rng, *days, 10);
        let raw = Parser::new().parse_str("contributions", &text).unwrap();

        group.throughput(Throughput::Elements(*days as u64));
        group.bench_with_input(BenchmarkId::new("days", days), &raw, |b, raw| {
            b.iter_with_setup(
                || base.clone(),
                |mut ds| {
                    ds.ingest_raw(RunKind::Base, TableKind::Contributions, raw)
                        .unwrap();
                    black_box(ds)
                },
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ingest_profiles, bench_ingest_contributions);
criterion_main!(benches);
