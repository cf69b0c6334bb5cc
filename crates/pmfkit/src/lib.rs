//! pmfkit: canonical tables and derived quantities for positive matrix
//! factorization (PMF) output.
//!
//! A PMF tool writes its results as a loose collection of sheets: factor
//! profiles, contributions, an error-estimation summary and bootstrap
//! tables, for a base run and a constrained run. pmfkit resolves the factor
//! and species vocabulary once from the base profiles, validates every other
//! table against it, and computes the unit conversions and apportionment
//! ratios reporting code relies on.
//!
//! # Core Principles
//!
//! - **One vocabulary**: every table is checked against the same
//!   [`RunMetadata`] and reordered to its order
//! - **All or nothing**: a table that fails validation leaves the dataset
//!   untouched
//! - **No silent defaults**: unknown labels and zero denominators are typed
//!   errors; recoverable drift is a recorded [`Warning`]
//!
//! # Example
//!
//! ```no_run
//! use pmfkit::{CanonicalDataset, DatasetConfig, DirectoryProvider};
//!
//! let provider = DirectoryProvider::new("data/", "GRE");
//! let dataset = CanonicalDataset::load_from(&provider, DatasetConfig::default()).unwrap();
//!
//! let series = pmfkit::derived::to_cubic_meter(&dataset, None, None, None).unwrap();
//! println!("Run used: {}", series.run.used);
//! println!("Warnings: {}", dataset.warnings().len());
//! ```

pub mod bootstrap;
pub mod dataset;
pub mod derived;
pub mod error;
pub mod input;
pub mod metadata;
pub mod relabel;
pub mod table;
pub mod validation;

pub use bootstrap::{BootstrapConfig, BootstrapSet, IterationStatus};
pub use dataset::{CanonicalDataset, DatasetConfig, RunKind, RunTables, TableKind, dataset_path};
pub use derived::{Derived, RunSelection};
pub use error::{PmfError, Result};
pub use input::{DirectoryProvider, Parser, RawTable, SourceMetadata, TableProvider};
pub use metadata::{MetadataResolver, RunMetadata, TotalVariableConfig, TotalVariableFallback};
pub use table::{
    Axis, ContributionMatrix, LabeledTable, Method, ProfileMatrix, UncertaintySummary,
};
pub use validation::{ConsistencyValidator, Severity, TableShape, Warning, WarningKind};
