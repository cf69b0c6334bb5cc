//! Metadata resolution from the base run's profile table.

use serde::{Deserialize, Serialize};
use tracing::info;

use super::run::{RunMetadata, TotalVariableSource};
use crate::error::{PmfError, Result};
use crate::table::ProfileMatrix;

/// Species names recognised as the total variable, in priority order.
pub const TOTAL_VARIABLE_PRIORITY: &[&str] = &["PM10", "PM2.5", "PMrecons", "PM10rec", "PM10recons"];

/// What to do when no priority name matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TotalVariableFallback {
    /// Species with the largest summed absolute concentration over all
    /// factors. Ties go to the earliest species.
    LargestMass,
    /// First species whose name contains `pattern`.
    NameContains { pattern: String },
    /// Fail with a metadata error.
    Reject,
}

impl TotalVariableFallback {
    pub fn name(&self) -> String {
        match self {
            TotalVariableFallback::LargestMass => "largest_mass".to_string(),
            TotalVariableFallback::NameContains { pattern } => {
                format!("name_contains({})", pattern)
            }
            TotalVariableFallback::Reject => "reject".to_string(),
        }
    }
}

impl Default for TotalVariableFallback {
    fn default() -> Self {
        TotalVariableFallback::LargestMass
    }
}

/// Total-variable selection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TotalVariableConfig {
    /// Exact, case-sensitive candidates; the first present wins.
    pub priority: Vec<String>,
    /// Explicit choice, checked before the priority list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_name: Option<String>,
    pub fallback: TotalVariableFallback,
}

impl Default for TotalVariableConfig {
    fn default() -> Self {
        Self {
            priority: TOTAL_VARIABLE_PRIORITY.iter().map(|s| s.to_string()).collect(),
            override_name: None,
            fallback: TotalVariableFallback::default(),
        }
    }
}

/// Derives [`RunMetadata`] from a base-run profile table.
#[derive(Debug, Clone, Default)]
pub struct MetadataResolver {
    config: TotalVariableConfig,
}

impl MetadataResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TotalVariableConfig) -> Self {
        Self { config }
    }

    /// Resolve factors (column order), species (row order) and the total variable.
    pub fn resolve(&self, profiles: &ProfileMatrix) -> Result<RunMetadata> {
        if profiles.row_count() == 0 {
            return Err(PmfError::Metadata("profile table has no species".to_string()));
        }
        if profiles.column_count() == 0 {
            return Err(PmfError::Metadata("profile table has no factors".to_string()));
        }

        let species = profiles.rows().to_vec();
        let factors = profiles.columns().to_vec();
        let (total_variable, source) = self.total_variable(profiles)?;

        let metadata = RunMetadata::new(factors, species, total_variable, source)?;
        info!(
            factors = metadata.factors().len(),
            species = metadata.species().len(),
            total_variable = metadata.total_variable(),
            "resolved run metadata"
        );
        Ok(metadata)
    }

    fn total_variable(&self, profiles: &ProfileMatrix) -> Result<(String, TotalVariableSource)> {
        let species = profiles.rows();

        if let Some(name) = &self.config.override_name {
            if !species.contains(name) {
                return Err(PmfError::Metadata(format!(
                    "total variable override '{}' is not a species",
                    name
                )));
            }
            return Ok((name.clone(), TotalVariableSource::Override));
        }

        if let Some(name) = self
            .config
            .priority
            .iter()
            .find(|candidate| species.contains(*candidate))
        {
            return Ok((name.clone(), TotalVariableSource::Priority));
        }

        let strategy = self.config.fallback.name();
        let picked = match &self.config.fallback {
            TotalVariableFallback::LargestMass => largest_mass(profiles),
            TotalVariableFallback::NameContains { pattern } => species
                .iter()
                .find(|s| s.contains(pattern.as_str()))
                .cloned(),
            TotalVariableFallback::Reject => None,
        };

        match picked {
            Some(name) => Ok((name, TotalVariableSource::Fallback { strategy })),
            None => Err(PmfError::Metadata(format!(
                "no total variable among {} species (fallback: {})",
                species.len(),
                strategy
            ))),
        }
    }
}

fn largest_mass(profiles: &ProfileMatrix) -> Option<String> {
    let mut best: Option<(usize, f64)> = None;
    for (i, _) in profiles.rows().iter().enumerate() {
        let mass: f64 = profiles
            .row(i)
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| v.abs())
            .sum();
        if best.map_or(true, |(_, m)| mass > m) {
            best = Some((i, mass));
        }
    }
    best.map(|(i, _)| profiles.rows()[i].clone())
}
