//! Seasonal aggregation of factor contributions.

use std::fmt;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::{Derived, to_cubic_meter};
use crate::dataset::{CanonicalDataset, RunKind};
use crate::error::{PmfError, Result};
use crate::table::LabeledTable;

/// Meteorological season, plus the annual aggregate row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Fall,
    Annual,
}

impl Season {
    pub const SEASONS: [Season; 4] = [Season::Winter, Season::Spring, Season::Summer, Season::Fall];

    /// Season of a month number (1 = January). December belongs to winter.
    pub fn from_month(month: u32) -> Option<Season> {
        match month {
            12 | 1 | 2 => Some(Season::Winter),
            3..=5 => Some(Season::Spring),
            6..=8 => Some(Season::Summer),
            9..=11 => Some(Season::Fall),
            _ => None,
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Season::Winter => "Winter",
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Annual => "Annual",
        };
        f.write_str(name)
    }
}

/// Season x factor table.
pub type SeasonalContribution = LabeledTable<Season, String, f64>;

#[derive(Clone, Copy, Default)]
struct Accumulator {
    sum: f64,
    count: usize,
}

/// Contribution of each factor to `species`, aggregated by season.
///
/// With `normalize`, each row is the factor share of that season's total
/// contribution and sums to 1. Otherwise rows are per-season means in
/// ug/m3. `annual` appends an [`Season::Annual`] row averaging the season
/// rows. Seasons without samples are omitted; NaN samples are skipped.
pub fn seasonal_contribution(
    dataset: &CanonicalDataset,
    run: Option<RunKind>,
    species: Option<&str>,
    annual: bool,
    normalize: bool,
) -> Result<Derived<SeasonalContribution>> {
    let series = to_cubic_meter(dataset, run, species, None)?;
    let table = &series.value;
    let width = table.column_count();

    let mut by_season: Vec<(Season, Vec<Accumulator>)> = Season::SEASONS
        .iter()
        .map(|s| (*s, vec![Accumulator::default(); width]))
        .collect();

    for (t, timestamp) in table.rows().iter().enumerate() {
        let Some(season) = Season::from_month(timestamp.month()) else {
            continue;
        };
        let slot = &mut by_season[season as usize].1;
        for (acc, value) in slot.iter_mut().zip(table.row(t)) {
            if value.is_finite() {
                acc.sum += value;
                acc.count += 1;
            }
        }
    }

    let mut rows = Vec::new();
    let mut values = Vec::new();
    for (season, accs) in by_season {
        if accs.iter().all(|a| a.count == 0) {
            continue;
        }
        if normalize {
            let total: f64 = accs.iter().map(|a| a.sum).sum();
            if total == 0.0 {
                return Err(PmfError::DegenerateProfile {
                    run: series.run.used,
                    reason: format!("{} contributions sum to zero", season),
                });
            }
            values.extend(accs.iter().map(|a| a.sum / total));
        } else {
            values.extend(accs.iter().map(|a| {
                if a.count == 0 {
                    f64::NAN
                } else {
                    a.sum / a.count as f64
                }
            }));
        }
        rows.push(season);
    }

    if annual && !rows.is_empty() {
        let seasons = rows.len();
        let annual_row: Vec<f64> = (0..width)
            .map(|c| {
                let finite: Vec<f64> = (0..seasons)
                    .map(|r| values[r * width + c])
                    .filter(|v| v.is_finite())
                    .collect();
                if finite.is_empty() {
                    f64::NAN
                } else {
                    finite.iter().sum::<f64>() / finite.len() as f64
                }
            })
            .collect();
        values.extend(annual_row);
        rows.push(Season::Annual);
    }

    let value = LabeledTable::new(rows, table.columns().to_vec(), values)?;
    Ok(Derived {
        value,
        run: series.run,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derived::fixtures;

    #[test]
    fn test_from_month() {
        assert_eq!(Season::from_month(12), Some(Season::Winter));
        assert_eq!(Season::from_month(3), Some(Season::Spring));
        assert_eq!(Season::from_month(8), Some(Season::Summer));
        assert_eq!(Season::from_month(11), Some(Season::Fall));
        assert_eq!(Season::from_month(13), None);
    }

    #[test]
    fn test_normalized_rows_sum_to_one() {
        let ds = fixtures::both_runs();
        let table = seasonal_contribution(&ds, None, None, false, true)
            .unwrap()
            .into_value();

        // No autumn samples in the fixture.
        assert_eq!(table.rows(), &[Season::Winter, Season::Spring, Season::Summer]);
        for r in 0..table.row_count() {
            let total: f64 = table.row(r).iter().sum();
            assert!((total - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_means_with_annual_row() {
        let ds = fixtures::both_runs();
        let table = seasonal_contribution(&ds, Some(RunKind::Base), None, true, false)
            .unwrap()
            .into_value();

        assert_eq!(table.rows().last(), Some(&Season::Annual));
        // Winter sulfate: 1.0 * 4.0
        assert_eq!(table.value(&Season::Winter, "Sulfate-rich"), Some(&4.0));
        // Summer dust is missing and stays NaN.
        assert!(table.value(&Season::Summer, "Dust").unwrap().is_nan());
        // Annual dust averages winter and spring only.
        assert_eq!(table.value(&Season::Annual, "Dust"), Some(&2.0));
    }
}
