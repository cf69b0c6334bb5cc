//! Unit conversion and apportionment ratios.

use tracing::debug;

use super::{Derived, select_run};
use crate::dataset::{CanonicalDataset, RunKind, TableKind};
use crate::error::{PmfError, Result};
use crate::table::{ContributionMatrix, LabeledTable, ProfileMatrix};

/// Contribution of each factor to `species`, in ug/m3.
///
/// `G[t, f] * F[species, f]` for every timestamp and requested factor.
/// `species` defaults to the total variable, `factors` to all factors.
/// Missing contributions stay NaN.
///
/// # Example
///
/// ```no_run
/// # use pmfkit::CanonicalDataset;
/// # fn example(dataset: &CanonicalDataset) -> pmfkit::Result<()> {
/// let result = pmfkit::derived::to_cubic_meter(dataset, None, None, None)?;
/// if result.run.fell_back() {
///     println!("constrained run incomplete, used {}", result.run.used);
/// }
/// # Ok(())
/// # }
/// ```
pub fn to_cubic_meter(
    dataset: &CanonicalDataset,
    run: Option<RunKind>,
    species: Option<&str>,
    factors: Option<&[String]>,
) -> Result<Derived<ContributionMatrix>> {
    let metadata = dataset.require_metadata()?;
    let species = species.unwrap_or(metadata.total_variable());
    if !metadata.has_species(species) {
        return Err(PmfError::UnknownSpecies(species.to_string()));
    }
    let factors = metadata.select_factors(factors)?;

    let selection = select_run(dataset, run, &[TableKind::Contributions, TableKind::Profiles])?;
    let (profiles, contributions) = match (
        dataset.profiles(selection.used),
        dataset.contributions(selection.used),
    ) {
        (Some(f), Some(g)) => (f, g),
        _ => {
            return Err(PmfError::MissingRun {
                run: selection.used,
                table: TableKind::Contributions,
            });
        }
    };

    let species_row = profiles
        .row_position(species)
        .ok_or_else(|| PmfError::UnknownSpecies(species.to_string()))?;

    let mut pairs = Vec::with_capacity(factors.len());
    for factor in &factors {
        let in_profiles = profiles.column_position(factor.as_str());
        let in_contributions = contributions.column_position(factor.as_str());
        match (in_profiles, in_contributions) {
            (Some(p), Some(c)) => pairs.push((p, c)),
            _ => return Err(PmfError::UnknownFactor(factor.clone())),
        }
    }

    let table = LabeledTable::try_from_indices(
        contributions.rows().to_vec(),
        factors,
        |t, j| -> Result<f64> {
            let (p, c) = pairs[j];
            let g = contributions.get(t, c).copied().unwrap_or(f64::NAN);
            let f = profiles.get(species_row, p).copied().unwrap_or(f64::NAN);
            Ok(g * f)
        },
    )?;

    debug!(run = %selection.used, species, timestamps = table.row_count(), "computed cubic-meter series");
    Ok(Derived {
        value: table,
        run: selection,
    })
}

/// Profile of each factor relative to its total-variable concentration.
///
/// `F[s, f] / F[total_variable, f]`; the total-variable row is 1.0.
pub fn to_relative_mass(
    dataset: &CanonicalDataset,
    run: Option<RunKind>,
    factors: Option<&[String]>,
) -> Result<Derived<ProfileMatrix>> {
    let metadata = dataset.require_metadata()?;
    let factors = metadata.select_factors(factors)?;
    let selection = select_run(dataset, run, &[TableKind::Profiles])?;
    let profiles = run_profiles(dataset, selection.used)?;

    let total_row = profiles
        .row_position(metadata.total_variable())
        .ok_or_else(|| PmfError::UnknownSpecies(metadata.total_variable().to_string()))?;
    let columns = factor_columns(profiles, &factors)?;

    let mut totals = Vec::with_capacity(columns.len());
    for (&col, factor) in columns.iter().zip(&factors) {
        let total = profiles.get(total_row, col).copied().unwrap_or(0.0);
        if total == 0.0 {
            return Err(PmfError::DegenerateProfile {
                run: selection.used,
                reason: format!(
                    "total variable '{}' is zero in factor '{}'",
                    metadata.total_variable(),
                    factor
                ),
            });
        }
        totals.push(total);
    }

    let table = LabeledTable::try_from_indices(
        profiles.rows().to_vec(),
        factors,
        |s, j| -> Result<f64> {
            if s == total_row {
                return Ok(1.0);
            }
            Ok(profiles.get(s, columns[j]).copied().unwrap_or(f64::NAN) / totals[j])
        },
    )?;

    Ok(Derived {
        value: table,
        run: selection,
    })
}

/// Share (in %) of each species' total mass carried by each factor.
///
/// `100 * F[s, f] / sum(F[s, .])`, the sum running over every factor of
/// the run even when `factors` selects a subset. A species that is zero in
/// every factor yields 0.
pub fn total_specie_sum(
    dataset: &CanonicalDataset,
    run: Option<RunKind>,
    factors: Option<&[String]>,
) -> Result<Derived<ProfileMatrix>> {
    let metadata = dataset.require_metadata()?;
    let factors = metadata.select_factors(factors)?;
    let selection = select_run(dataset, run, &[TableKind::Profiles])?;
    let profiles = run_profiles(dataset, selection.used)?;
    let columns = factor_columns(profiles, &factors)?;

    let mut sums = Vec::with_capacity(profiles.row_count());
    for (s, species) in profiles.rows().iter().enumerate() {
        let row = profiles.row(s);
        let sum: f64 = row.iter().sum();
        if sum == 0.0 && row.iter().any(|v| *v != 0.0) {
            return Err(PmfError::DegenerateProfile {
                run: selection.used,
                reason: format!("concentrations of '{}' cancel out across factors", species),
            });
        }
        sums.push(sum);
    }

    let table = LabeledTable::try_from_indices(
        profiles.rows().to_vec(),
        factors,
        |s, j| -> Result<f64> {
            if sums[s] == 0.0 {
                return Ok(0.0);
            }
            Ok(100.0 * profiles.get(s, columns[j]).copied().unwrap_or(0.0) / sums[s])
        },
    )?;

    Ok(Derived {
        value: table,
        run: selection,
    })
}

fn run_profiles(dataset: &CanonicalDataset, run: RunKind) -> Result<&ProfileMatrix> {
    dataset.profiles(run).ok_or(PmfError::MissingRun {
        run,
        table: TableKind::Profiles,
    })
}

/// Column positions of `factors` in `profiles`.
fn factor_columns(profiles: &ProfileMatrix, factors: &[String]) -> Result<Vec<usize>> {
    factors
        .iter()
        .map(|f| {
            profiles
                .column_position(f.as_str())
                .ok_or_else(|| PmfError::UnknownFactor(f.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::fixtures;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_cubic_meter_defaults_to_total_variable() {
        let ds = fixtures::both_runs();
        let result = to_cubic_meter(&ds, None, None, None).unwrap();
        assert_eq!(result.run.used, RunKind::Constrained);

        let table = result.value;
        assert_eq!(table.columns(), &["Sulfate-rich", "Dust", "Traffic"]);
        // 1.0 * 8.0, 0.5 * 4.0, 2.0 * 2.0
        assert_eq!(table.row(0), &[8.0, 2.0, 4.0]);
        assert!(table.get(2, 1).unwrap().is_nan());
    }

    #[test]
    fn test_cubic_meter_species_and_subset() {
        let ds = fixtures::both_runs();
        let factors = strings(&["Traffic", "Sulfate-rich"]);
        let table = to_cubic_meter(&ds, Some(RunKind::Base), Some("EC"), Some(&factors))
            .unwrap()
            .into_value();
        // Canonical order, not request order.
        assert_eq!(table.columns(), &["Sulfate-rich", "Traffic"]);
        assert_eq!(table.row(0), &[0.2, 0.8]);
    }

    #[test]
    fn test_cubic_meter_falls_back_to_base() {
        let ds = fixtures::base_only();
        let result = to_cubic_meter(&ds, None, None, None).unwrap();
        assert!(result.run.fell_back());
        assert_eq!(result.run.used, RunKind::Base);
    }

    #[test]
    fn test_cubic_meter_unknown_names() {
        let ds = fixtures::both_runs();
        let err = to_cubic_meter(&ds, None, Some("Pb"), None).unwrap_err();
        assert!(matches!(err, PmfError::UnknownSpecies(ref s) if s == "Pb"));

        let factors = strings(&["Unknown"]);
        let err = to_cubic_meter(&ds, None, None, Some(&factors)).unwrap_err();
        assert!(matches!(err, PmfError::UnknownFactor(ref f) if f == "Unknown"));
    }

    #[test]
    fn test_relative_mass_total_row_is_one() {
        let ds = fixtures::both_runs();
        let table = to_relative_mass(&ds, Some(RunKind::Base), None)
            .unwrap()
            .into_value();
        assert_eq!(table.row(0), &[1.0, 1.0, 1.0]);
        assert_eq!(table.value("EC", "Traffic"), Some(&0.4));
        assert_eq!(table.value("OC*", "Sulfate-rich"), Some(&0.125));
    }

    #[test]
    fn test_relative_mass_zero_total_is_degenerate() {
        let mut ds = crate::dataset::CanonicalDataset::new();
        fixtures::ingest(
            &mut ds,
            RunKind::Base,
            TableKind::Profiles,
            "Specie,F1,F2\nPM10,10.0,0\nEC,1.0,0.5\n",
        );
        let err = to_relative_mass(&ds, Some(RunKind::Base), None).unwrap_err();
        assert!(matches!(err, PmfError::DegenerateProfile { run: RunKind::Base, .. }));
    }

    #[test]
    fn test_species_sum_rows_total_hundred() {
        let ds = fixtures::both_runs();
        let table = total_specie_sum(&ds, None, None).unwrap().into_value();
        for s in 0..table.row_count() - 1 {
            let total: f64 = table.row(s).iter().sum();
            assert!((total - 100.0).abs() < 1e-9);
        }
        // Ti is zero everywhere.
        assert_eq!(table.row(3), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_species_sum_subset_uses_all_factors() {
        let ds = fixtures::both_runs();
        let factors = strings(&["Dust"]);
        let table = total_specie_sum(&ds, Some(RunKind::Base), Some(&factors))
            .unwrap()
            .into_value();
        assert_eq!(table.columns(), &["Dust"]);
        assert!((table.get(0, 0).unwrap() - 100.0 * 2.0 / 7.0).abs() < 1e-12);
    }
}
