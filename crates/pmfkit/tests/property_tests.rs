//! Property-based tests for pmfkit.
//!
//! These tests use proptest to generate random profile and contribution
//! tables and verify that validation and the derived quantities keep their
//! algebraic guarantees for every generated dataset.
//!
//! # Properties
//!
//! 1. **Relative mass**: the total-variable row is exactly 1
//! 2. **Species sum**: shares of one species over all factors add to 100
//! 3. **Cubic meter**: `G[t, f] * F[s, f]` holds exactly
//! 4. **Idempotence**: conforming a canonical table changes nothing
//!
//! # Running Property Tests
//!
//! ```bash
//! # Run all property tests
//! cargo test -p pmfkit --test property_tests
//!
//! # Run with more cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p pmfkit --test property_tests
//! ```

use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use pmfkit::derived::{to_cubic_meter, to_relative_mass, total_specie_sum};
use pmfkit::{
    CanonicalDataset, ConsistencyValidator, ContributionMatrix, LabeledTable, MetadataResolver,
    ProfileMatrix, RunKind, TableShape,
};

// =============================================================================
// Test Strategies
// =============================================================================

const TOTAL_VARIABLE: &str = "PM10";

fn species_names(n: usize) -> Vec<String> {
    std::iter::once(TOTAL_VARIABLE.to_string())
        .chain((1..n).map(|i| format!("S{}", i)))
        .collect()
}

fn factor_names(n: usize) -> Vec<String> {
    (1..=n).map(|j| format!("F{}", j)).collect()
}

fn timestamps(n: usize) -> Vec<NaiveDateTime> {
    let start = NaiveDate::from_ymd_opt(2017, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (0..n).map(|i| start + Duration::days(3 * i as i64)).collect()
}

/// Profiles whose total variable is positive in every factor, plus a
/// matching contribution table with some negative entries.
fn session() -> impl Strategy<Value = (ProfileMatrix, ContributionMatrix)> {
    (2usize..7, 1usize..6, 1usize..20).prop_flat_map(|(n_species, n_factors, n_days)| {
        (
            prop::collection::vec(0.01f64..100.0, n_factors),
            prop::collection::vec(0.0f64..50.0, (n_species - 1) * n_factors),
            prop::collection::vec(-5.0f64..50.0, n_days * n_factors),
        )
            .prop_map(move |(total, rest, g)| {
                let values = total.into_iter().chain(rest).collect();
                let profiles =
                    LabeledTable::new(species_names(n_species), factor_names(n_factors), values)
                        .unwrap();
                let contributions =
                    LabeledTable::new(timestamps(n_days), factor_names(n_factors), g).unwrap();
                (profiles, contributions)
            })
    })
}

/// A session plus a random permutation of the profile rows and columns.
fn shuffled_session() -> impl Strategy<Value = (ProfileMatrix, Vec<usize>, Vec<usize>)> {
    session().prop_flat_map(|(profiles, _)| {
        let rows: Vec<usize> = (0..profiles.row_count()).collect();
        let columns: Vec<usize> = (0..profiles.column_count()).collect();
        (
            Just(profiles),
            Just(rows).prop_shuffle(),
            Just(columns).prop_shuffle(),
        )
    })
}

fn dataset(profiles: ProfileMatrix, contributions: ContributionMatrix) -> CanonicalDataset {
    let mut ds = CanonicalDataset::new();
    ds.ingest_profiles(RunKind::Base, profiles).unwrap();
    ds.ingest_contributions(RunKind::Base, contributions).unwrap();
    ds
}

// =============================================================================
// Derived Quantity Properties
// =============================================================================

mod derived_tests {
    use super::*;

    proptest! {
        /// The total-variable row of the relative mass is exactly 1.
        #[test]
        fn relative_mass_total_row_is_one((profiles, contributions) in session()) {
            let ds = dataset(profiles, contributions);
            let table = to_relative_mass(&ds, Some(RunKind::Base), None).unwrap().into_value();
            let row = table.row_position(TOTAL_VARIABLE).unwrap();
            prop_assert!(table.row(row).iter().all(|v| *v == 1.0));
        }

        /// Species shares over the complete factor set add to 100.
        #[test]
        fn species_sum_adds_to_100((profiles, contributions) in session()) {
            let ds = dataset(profiles.clone(), contributions);
            let table = total_specie_sum(&ds, Some(RunKind::Base), None).unwrap().into_value();

            for (s, species) in table.rows().iter().enumerate() {
                let total: f64 = table.row(s).iter().sum();
                let input = profiles.row_position(species.as_str()).unwrap();
                if profiles.row(input).iter().all(|v| *v == 0.0) {
                    prop_assert_eq!(total, 0.0);
                } else {
                    prop_assert!(
                        (total - 100.0).abs() < 1e-9,
                        "{} sums to {}", species, total
                    );
                }
            }
        }

        /// Cubic-meter values are the exact product of contribution and profile.
        #[test]
        fn cubic_meter_is_exact_product((profiles, contributions) in session()) {
            let ds = dataset(profiles.clone(), contributions.clone());

            for species in profiles.rows() {
                for factor in profiles.columns() {
                    let selected = vec![factor.clone()];
                    let series = to_cubic_meter(
                        &ds,
                        Some(RunKind::Base),
                        Some(species.as_str()),
                        Some(&selected),
                    )
                    .unwrap()
                    .into_value();

                    let f = *profiles.value(species.as_str(), factor.as_str()).unwrap();
                    for (t, timestamp) in series.rows().iter().enumerate() {
                        let g = *contributions.value(timestamp, factor.as_str()).unwrap();
                        prop_assert_eq!(series.get(t, 0).copied(), Some(g * f));
                    }
                }
            }
        }

        /// Restricting the factor set does not change the species shares.
        #[test]
        fn species_sum_subset_matches_full((profiles, contributions) in session()) {
            let ds = dataset(profiles, contributions);
            let full = total_specie_sum(&ds, Some(RunKind::Base), None).unwrap().into_value();
            let first = vec![full.columns()[0].clone()];
            let subset = total_specie_sum(&ds, Some(RunKind::Base), Some(&first))
                .unwrap()
                .into_value();

            prop_assert_eq!(subset.column_count(), 1);
            for s in 0..full.row_count() {
                prop_assert_eq!(subset.get(s, 0), full.get(s, 0));
            }
        }
    }
}

// =============================================================================
// Validation Properties
// =============================================================================

mod validation_tests {
    use super::*;

    proptest! {
        /// A table validated against metadata resolved from itself is already canonical.
        #[test]
        fn resolved_table_is_canonical((profiles, _) in session()) {
            let metadata = MetadataResolver::new().resolve(&profiles).unwrap();
            let validator = ConsistencyValidator::new(&metadata);

            prop_assert!(validator.is_canonical(&profiles, "profiles", TableShape::PROFILES).unwrap());
            let conformed = validator.conform(&profiles, "profiles", TableShape::PROFILES).unwrap();
            prop_assert_eq!(conformed, profiles);
        }

        /// Conforming restores the original order of any permutation, and
        /// conforming again changes nothing.
        #[test]
        fn conform_is_idempotent((profiles, rows, columns) in shuffled_session()) {
            let metadata = MetadataResolver::new().resolve(&profiles).unwrap();
            let validator = ConsistencyValidator::new(&metadata);

            let shuffled = profiles.select(&rows, &columns);
            let once = validator.conform(&shuffled, "profiles", TableShape::PROFILES).unwrap();
            let twice = validator.conform(&once, "profiles", TableShape::PROFILES).unwrap();

            prop_assert_eq!(&once, &profiles);
            prop_assert_eq!(once, twice);
        }
    }
}

// =============================================================================
// Persistence Properties
// =============================================================================

mod persistence_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Saving and loading preserves every ingested table.
        #[test]
        fn save_load_round_trip((profiles, contributions) in session()) {
            let ds = dataset(profiles, contributions);
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("session.pmf.json");

            ds.save(&path).unwrap();
            let loaded = CanonicalDataset::load(&path).unwrap();

            prop_assert_eq!(loaded.metadata(), ds.metadata());
            prop_assert_eq!(loaded.profiles(RunKind::Base), ds.profiles(RunKind::Base));
            prop_assert_eq!(loaded.contributions(RunKind::Base), ds.contributions(RunKind::Base));
        }
    }
}
