//! Raw table input: parsing, providers and typed conversion.

pub mod convert;
mod parser;
mod provider;
mod source;

pub use parser::{Parser, ParserConfig};
pub use provider::{DirectoryProvider, TableProvider};
pub use source::{RawTable, SourceMetadata};
