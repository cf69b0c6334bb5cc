//! Dataset configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bootstrap::BootstrapConfig;
use crate::error::{PmfError, Result};
use crate::input::ParserConfig;
use crate::metadata::TotalVariableConfig;

/// Configuration for building a [`CanonicalDataset`](super::CanonicalDataset).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Parser configuration for file-based providers.
    #[serde(skip_serializing_if = "is_default_parser")]
    pub parser: ParserConfig,
    /// Total-variable selection.
    pub total_variable: TotalVariableConfig,
    /// Bootstrap reconciliation settings.
    pub bootstrap: BootstrapConfig,
    /// Profile concentrations below this value are set to zero.
    ///
    /// The external tool writes values around 1e-12 for species absent from
    /// a factor.
    pub profile_floor: Option<f64>,
    /// Contribution value the external tool writes for a missing sample.
    pub contribution_missing: Option<f64>,
}

fn is_default_parser(config: &ParserConfig) -> bool {
    *config == ParserConfig::default()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            total_variable: TotalVariableConfig::default(),
            bootstrap: BootstrapConfig::default(),
            profile_floor: Some(1e-5),
            contribution_missing: Some(-999.0),
        }
    }
}

impl DatasetConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| PmfError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: DatasetConfig = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| PmfError::Config(format!("'{}': {}", path.display(), e)))?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings that cannot work.
    pub fn check(&self) -> Result<()> {
        if self.bootstrap.factor_prefix.is_empty() {
            return Err(PmfError::Config(
                "bootstrap.factor_prefix must not be empty".to_string(),
            ));
        }
        if let Some(floor) = self.profile_floor {
            if !floor.is_finite() {
                return Err(PmfError::Config("profile_floor must be finite".to_string()));
            }
        }
        if !self.bootstrap.non_convergence_threshold.is_finite() {
            return Err(PmfError::Config(
                "bootstrap.non_convergence_threshold must be finite".to_string(),
            ));
        }
        Ok(())
    }
}
