//! Labeled table abstraction and the canonical table types.

mod keys;
mod labeled;

pub use keys::{
    Axis, BootstrapFactor, FactorSpecies, IterationId, MappingColumn, Method, SpeciesFactor,
};
pub use labeled::LabeledTable;

use chrono::NaiveDateTime;

/// F matrix: species x factor, concentrations in ug/m3.
pub type ProfileMatrix = LabeledTable<String, String, f64>;

/// G matrix: timestamp x factor, normalized contributions.
///
/// Missing observations are NaN.
pub type ContributionMatrix = LabeledTable<NaiveDateTime, String, f64>;

/// (factor, species) x method. `None` means the method is not available.
pub type UncertaintySummary = LabeledTable<FactorSpecies, Method, Option<f64>>;

/// (species, factor) x iteration concentrations.
pub type BootstrapProfileSet = LabeledTable<SpeciesFactor, IterationId, f64>;

/// Bootstrap factor x (reference factor | unmapped) iteration counts.
pub type BootstrapMapping = LabeledTable<BootstrapFactor, MappingColumn, u32>;

/// Single-row table of DISP swap counts per factor.
pub type DispSwaps = LabeledTable<(), String, u32>;
