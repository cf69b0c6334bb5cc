//! Selection from the error-estimation summary.

use super::{Derived, select_run};
use crate::dataset::{CanonicalDataset, RunKind, TableKind};
use crate::error::{PmfError, Result};
use crate::table::UncertaintySummary;

/// Rows of the error-estimation summary for the requested factors and species.
///
/// Both default to the whole vocabulary. Rows keep canonical order; pairs
/// the summary does not cover are absent from the result.
pub fn uncertainty_summary(
    dataset: &CanonicalDataset,
    run: Option<RunKind>,
    factors: Option<&[String]>,
    species: Option<&[String]>,
) -> Result<Derived<UncertaintySummary>> {
    let metadata = dataset.require_metadata()?;
    let factors = metadata.select_factors(factors)?;
    let species = metadata.select_species(species)?;

    let selection = select_run(dataset, run, &[TableKind::UncertaintySummary])?;
    let summary = dataset
        .uncertainty(selection.used)
        .ok_or(PmfError::MissingRun {
            run: selection.used,
            table: TableKind::UncertaintySummary,
        })?;

    let keep: Vec<usize> = summary
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, key)| factors.contains(&key.factor) && species.contains(&key.species))
        .map(|(i, _)| i)
        .collect();

    Ok(Derived {
        value: summary.select_rows(&keep),
        run: selection,
    })
}
