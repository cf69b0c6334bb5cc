//! Persistence for canonical datasets - save/load JSON files.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::DatasetConfig;
use super::model::{CanonicalDataset, RunTables, TableSource};
use crate::bootstrap::{BootstrapSet, IterationStatus};
use crate::error::{PmfError, Result};
use crate::metadata::RunMetadata;
use crate::table::{
    BootstrapMapping, DispSwaps, IterationId, LabeledTable, ProfileMatrix, SpeciesFactor,
    UncertaintySummary,
};
use crate::validation::Warning;

const FORMAT_VERSION: u32 = 1;

/// On-disk form of a dataset. NaN cells are stored as `null`.
#[derive(Serialize, Deserialize)]
struct DatasetFile {
    format_version: u32,
    config: DatasetConfig,
    metadata: Option<RunMetadata>,
    base: RunFile,
    constrained: RunFile,
    warnings: Vec<Warning>,
    sources: Vec<TableSource>,
}

#[derive(Serialize, Deserialize)]
struct RunFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    profiles: Option<ProfileMatrix>,
    #[serde(skip_serializing_if = "Option::is_none")]
    contributions: Option<LabeledTable<NaiveDateTime, String, Option<f64>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uncertainty_summary: Option<UncertaintySummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bootstrap: Option<BootstrapFile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disp_swaps: Option<DispSwaps>,
}

#[derive(Serialize, Deserialize)]
struct BootstrapFile {
    profiles: LabeledTable<SpeciesFactor, IterationId, Option<f64>>,
    mapping: BootstrapMapping,
    status: Vec<IterationStatus>,
}

fn to_nullable(v: &f64) -> Option<f64> {
    if v.is_nan() { None } else { Some(*v) }
}

fn from_nullable(v: &Option<f64>) -> f64 {
    v.unwrap_or(f64::NAN)
}

impl From<&RunTables> for RunFile {
    fn from(tables: &RunTables) -> Self {
        Self {
            profiles: tables.profiles.clone(),
            contributions: tables.contributions.as_ref().map(|t| t.map_values(to_nullable)),
            uncertainty_summary: tables.uncertainty_summary.clone(),
            bootstrap: tables.bootstrap.as_ref().map(|set| BootstrapFile {
                profiles: set.profiles().map_values(to_nullable),
                mapping: set.mapping().clone(),
                status: set.statuses().to_vec(),
            }),
            disp_swaps: tables.disp_swaps.clone(),
        }
    }
}

impl From<RunFile> for RunTables {
    fn from(file: RunFile) -> Self {
        Self {
            profiles: file.profiles,
            contributions: file.contributions.map(|t| t.map_values(from_nullable)),
            uncertainty_summary: file.uncertainty_summary,
            bootstrap: file.bootstrap.map(|b| {
                BootstrapSet::new(b.profiles.map_values(from_nullable), b.mapping, b.status)
            }),
            disp_swaps: file.disp_swaps,
        }
    }
}

impl CanonicalDataset {
    /// Save the dataset to a pretty-printed JSON file.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use pmfkit::CanonicalDataset;
    /// # fn example(dataset: &CanonicalDataset) -> pmfkit::Result<()> {
    /// dataset.save("GRE.pmf.json")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    PmfError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let file = File::create(path).map_err(|e| {
            PmfError::Persistence(format!("Failed to create file '{}': {}", path.display(), e))
        })?;

        let snapshot = DatasetFile {
            format_version: FORMAT_VERSION,
            config: self.config.clone(),
            metadata: self.metadata.clone(),
            base: RunFile::from(&self.base),
            constrained: RunFile::from(&self.constrained),
            warnings: self.warnings.clone(),
            sources: self.sources.clone(),
        };

        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &snapshot).map_err(|e| {
            PmfError::Persistence(format!("Failed to serialize dataset: {}", e))
        })?;

        debug!(path = %path.display(), "saved dataset");
        Ok(())
    }

    /// Load a dataset saved with [`save`](Self::save).
    ///
    /// Metadata and every table are re-validated; a file edited into an
    /// inconsistent state is rejected.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|e| {
            PmfError::Persistence(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let reader = BufReader::new(file);
        let snapshot: DatasetFile = serde_json::from_reader(reader).map_err(|e| {
            PmfError::Persistence(format!(
                "Failed to parse dataset '{}': {}",
                path.display(),
                e
            ))
        })?;

        if snapshot.format_version != FORMAT_VERSION {
            return Err(PmfError::Persistence(format!(
                "Unsupported dataset format version {} in '{}'",
                snapshot.format_version,
                path.display()
            )));
        }
        snapshot.config.check()?;

        // Rebuild through the constructor so its checks apply.
        let metadata = snapshot
            .metadata
            .map(|m| {
                RunMetadata::new(
                    m.factors().to_vec(),
                    m.species().to_vec(),
                    m.total_variable(),
                    m.total_variable_source().clone(),
                )
            })
            .transpose()?;

        let dataset = CanonicalDataset {
            config: snapshot.config,
            metadata,
            base: snapshot.base.into(),
            constrained: snapshot.constrained.into(),
            warnings: snapshot.warnings,
            sources: snapshot.sources,
        };
        dataset.check_invariants()?;

        debug!(path = %path.display(), "loaded dataset");
        Ok(dataset)
    }
}

/// Default location of a saved dataset for `site` inside `dir`.
///
/// # Example
///
/// ```
/// use pmfkit::dataset_path;
///
/// let path = dataset_path("out", "GRE");
/// assert_eq!(path.to_string_lossy(), "out/GRE.pmf.json");
/// ```
pub fn dataset_path(dir: impl AsRef<Path>, site: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.pmf.json", site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{RunKind, TableKind};
    use crate::input::Parser;
    use tempfile::TempDir;

    fn dataset() -> CanonicalDataset {
        let parser = Parser::new();
        let mut ds = CanonicalDataset::new();
        ds.ingest_raw(
            RunKind::Base,
            TableKind::Profiles,
            &parser
                .parse_str("p", "Specie,F1,F2\nPM10,4.0,2.0\nEC,0.2,0.1\n")
                .unwrap(),
        )
        .unwrap();
        ds.ingest_raw(
            RunKind::Base,
            TableKind::Contributions,
            &parser
                .parse_str("c", "Date,F1,F2\n2017-01-01,1.0,-999\n2017-01-04,0.5,1.5\n")
                .unwrap(),
        )
        .unwrap();
        ds
    }

    #[test]
    fn test_save_and_load_keeps_missing_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("site.pmf.json");

        let ds = dataset();
        ds.save(&path).unwrap();
        let loaded = CanonicalDataset::load(&path).unwrap();

        assert_eq!(loaded.metadata(), ds.metadata());
        let g = loaded.contributions(RunKind::Base).unwrap();
        assert!(g.get(0, 1).unwrap().is_nan());
        assert_eq!(g.get(1, 1), Some(&1.5));
        assert_eq!(loaded.profiles(RunKind::Base), ds.profiles(RunKind::Base));
    }

    #[test]
    fn test_load_rejects_inconsistent_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.pmf.json");
        dataset().save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::write(&path, text.replace("\"F2\"", "\"F3\"").replacen("\"F3\"", "\"F2\"", 1))
            .unwrap();

        assert!(CanonicalDataset::load(&path).is_err());
    }

    #[test]
    fn test_load_rejects_truncated_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.pmf.json");
        dataset().save(&path).unwrap();

        let mut json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        json["base"]["profiles"]["values"]
            .as_array_mut()
            .unwrap()
            .pop();
        std::fs::write(&path, serde_json::to_string_pretty(&json).unwrap()).unwrap();

        let err = CanonicalDataset::load(&path).unwrap_err();
        match err {
            PmfError::Persistence(message) => assert!(message.contains("got 3"), "{}", message),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = CanonicalDataset::load("/nonexistent/site.pmf.json").unwrap_err();
        assert!(matches!(err, PmfError::Persistence(_)));
    }
}
