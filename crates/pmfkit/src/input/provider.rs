//! Raw table providers.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::parser::Parser;
use super::source::RawTable;
use crate::dataset::{RunKind, TableKind};
use crate::error::Result;

/// Extensions tried, in order, by [`DirectoryProvider`].
const EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Source of raw tables for one analysis session.
///
/// Implementations return `Ok(None)` when the table does not exist for the
/// requested run; errors are reserved for tables that exist but cannot be
/// read.
pub trait TableProvider {
    fn table(&self, run: RunKind, kind: TableKind) -> Result<Option<RawTable>>;
}

/// Reads `<site>_<run>_<table>.<ext>` files from one directory.
///
/// For example `GRE_constrained_bootstrap_mapping.csv`.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    dir: PathBuf,
    site: String,
    parser: Parser,
}

impl DirectoryProvider {
    pub fn new(dir: impl Into<PathBuf>, site: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            site: site.into(),
            parser: Parser::new(),
        }
    }

    /// Use a specific parser configuration.
    pub fn with_parser(mut self, parser: Parser) -> Self {
        self.parser = parser;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File stem expected for a table.
    pub fn file_stem(&self, run: RunKind, kind: TableKind) -> String {
        format!("{}_{}_{}", self.site, run.as_str(), kind.as_str())
    }

    fn find(&self, run: RunKind, kind: TableKind) -> Option<PathBuf> {
        let stem = self.file_stem(run, kind);
        EXTENSIONS
            .iter()
            .map(|ext| self.dir.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file())
    }
}

impl TableProvider for DirectoryProvider {
    fn table(&self, run: RunKind, kind: TableKind) -> Result<Option<RawTable>> {
        match self.find(run, kind) {
            Some(path) => {
                debug!(path = %path.display(), %run, %kind, "reading raw table");
                self.parser.parse_file(&path).map(Some)
            }
            None => {
                debug!(%run, %kind, "no file for table");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directory_provider_reads_and_misses() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("GRE_base_profiles.csv"),
            "Specie,F1\nPM10,1.0\n",
        )
        .unwrap();

        let provider = DirectoryProvider::new(dir.path(), "GRE");
        let table = provider
            .table(RunKind::Base, TableKind::Profiles)
            .unwrap()
            .expect("profiles present");
        assert_eq!(table.name, "GRE_base_profiles");
        assert!(table.source.as_ref().unwrap().hash.starts_with("sha256:"));

        let missing = provider
            .table(RunKind::Constrained, TableKind::Profiles)
            .unwrap();
        assert!(missing.is_none());
    }
}
