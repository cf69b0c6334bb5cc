//! Derived quantities computed from a [`CanonicalDataset`].
//!
//! Every function here is a pure read of the dataset. Results carry the
//! run they were computed from: when no run is requested the constrained
//! run is preferred and the base run is used if the constrained tables are
//! missing, which [`RunSelection::fell_back`] reports.

mod mass;
mod seasonal;
mod uncertainty;

pub use mass::{to_cubic_meter, to_relative_mass, total_specie_sum};
pub use seasonal::{Season, SeasonalContribution, seasonal_contribution};
pub use uncertainty::uncertainty_summary;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::dataset::{CanonicalDataset, RunKind, TableKind};
use crate::error::{PmfError, Result};

/// Which run a derived result was computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSelection {
    /// Run asked for by the caller, `None` for the default.
    pub requested: Option<RunKind>,
    /// Run actually used.
    pub used: RunKind,
}

impl RunSelection {
    /// Whether the default constrained run was unavailable and base was used.
    pub fn fell_back(&self) -> bool {
        self.requested.is_none() && self.used != RunKind::Constrained
    }
}

/// A derived table and the run it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived<T> {
    pub value: T,
    pub run: RunSelection,
}

impl<T> Derived<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Pick the run to compute from.
///
/// An explicit run must have every table in `needs`. Without one the
/// constrained run is tried first, then base.
pub(crate) fn select_run(
    dataset: &CanonicalDataset,
    requested: Option<RunKind>,
    needs: &[TableKind],
) -> Result<RunSelection> {
    let missing = |run: RunKind| {
        needs
            .iter()
            .copied()
            .find(|kind| !dataset.run(run).has(*kind))
    };

    match requested {
        Some(run) => match missing(run) {
            Some(table) => Err(PmfError::MissingRun { run, table }),
            None => Ok(RunSelection {
                requested,
                used: run,
            }),
        },
        None => match missing(RunKind::Constrained) {
            None => Ok(RunSelection {
                requested,
                used: RunKind::Constrained,
            }),
            Some(table) => {
                if missing(RunKind::Base).is_some() {
                    return Err(PmfError::MissingRun {
                        run: RunKind::Constrained,
                        table,
                    });
                }
                warn!(
                    missing = %table,
                    "constrained run incomplete, falling back to base run"
                );
                Ok(RunSelection {
                    requested,
                    used: RunKind::Base,
                })
            }
        },
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::dataset::{CanonicalDataset, RunKind, TableKind};
    use crate::input::Parser;

    pub const PROFILES: &str = "Specie,Sulfate-rich,Dust,Traffic\n\
        PMrecons,4.0,2.0,1.0\n\
        OC*,0.5,0.1,0.3\n\
        EC,0.2,0,0.4\n\
        Ti,0,0,0\n";

    pub const CONTRIBUTIONS: &str = "Date,Sulfate-rich,Dust,Traffic\n\
        2017-01-01,1.0,0.5,2.0\n\
        2017-04-01,0.5,1.5,1.0\n\
        2017-07-01,2.0,-999,0.0\n";

    pub fn ingest(ds: &mut CanonicalDataset, run: RunKind, kind: TableKind, text: &str) {
        let raw = Parser::new().parse_str(kind.as_str(), text).unwrap();
        ds.ingest_raw(run, kind, &raw).unwrap();
    }

    /// Base run with profiles and contributions, constrained run empty.
    pub fn base_only() -> CanonicalDataset {
        let mut ds = CanonicalDataset::new();
        ingest(&mut ds, RunKind::Base, TableKind::Profiles, PROFILES);
        ingest(&mut ds, RunKind::Base, TableKind::Contributions, CONTRIBUTIONS);
        ds
    }

    /// Both runs; constrained profiles are twice the base ones.
    pub fn both_runs() -> CanonicalDataset {
        let mut ds = base_only();
        let doubled = "Specie,Sulfate-rich,Dust,Traffic\n\
            PMrecons,8.0,4.0,2.0\n\
            OC*,1.0,0.2,0.6\n\
            EC,0.4,0,0.8\n\
            Ti,0,0,0\n";
        ingest(&mut ds, RunKind::Constrained, TableKind::Profiles, doubled);
        ingest(&mut ds, RunKind::Constrained, TableKind::Contributions, CONTRIBUTIONS);
        ds
    }
}
