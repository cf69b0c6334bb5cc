//! Run metadata and its resolution.

mod resolver;
mod run;

pub use resolver::{
    MetadataResolver, TOTAL_VARIABLE_PRIORITY, TotalVariableConfig, TotalVariableFallback,
};
pub use run::{RunMetadata, TotalVariableSource};

pub(crate) use run::first_duplicate;
