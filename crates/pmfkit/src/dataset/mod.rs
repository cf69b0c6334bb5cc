//! The canonical dataset and its ingestion.

mod config;
mod kinds;
mod model;
mod persistence;

pub use config::DatasetConfig;
pub use kinds::{RunKind, TableKind};
pub use model::{CanonicalDataset, RunTables, TableSource};
pub use persistence::dataset_path;

pub(crate) use model::table_name;
