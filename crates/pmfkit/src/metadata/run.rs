//! Resolved vocabulary of one dataset.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PmfError, Result};

/// How the total variable was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TotalVariableSource {
    /// Named explicitly by the caller.
    Override,
    /// Matched an entry of the priority list.
    Priority,
    /// Picked by the configured fallback strategy.
    Fallback { strategy: String },
}

/// Ordered factor and species vocabulary plus the total variable.
///
/// Immutable once built. A dataset owns exactly one and lends it out by
/// reference to validation and computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    factors: Vec<String>,
    species: Vec<String>,
    total_variable: String,
    total_variable_source: TotalVariableSource,
}

impl RunMetadata {
    /// Build metadata, checking uniqueness and that the total variable is a species.
    pub fn new(
        factors: Vec<String>,
        species: Vec<String>,
        total_variable: impl Into<String>,
        total_variable_source: TotalVariableSource,
    ) -> Result<Self> {
        let total_variable = total_variable.into();
        if factors.is_empty() {
            return Err(PmfError::Metadata("no factor labels".to_string()));
        }
        if species.is_empty() {
            return Err(PmfError::Metadata("no species labels".to_string()));
        }
        if let Some(dup) = first_duplicate(&factors) {
            return Err(PmfError::Metadata(format!("duplicate factor '{}'", dup)));
        }
        if let Some(dup) = first_duplicate(&species) {
            return Err(PmfError::Metadata(format!("duplicate species '{}'", dup)));
        }
        if !species.contains(&total_variable) {
            return Err(PmfError::Metadata(format!(
                "total variable '{}' is not a species",
                total_variable
            )));
        }
        Ok(Self {
            factors,
            species,
            total_variable,
            total_variable_source,
        })
    }

    pub fn factors(&self) -> &[String] {
        &self.factors
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn total_variable(&self) -> &str {
        &self.total_variable
    }

    pub fn total_variable_source(&self) -> &TotalVariableSource {
        &self.total_variable_source
    }

    pub fn factor_index(&self, name: &str) -> Option<usize> {
        self.factors.iter().position(|f| f == name)
    }

    pub fn species_index(&self, name: &str) -> Option<usize> {
        self.species.iter().position(|s| s == name)
    }

    pub fn has_factor(&self, name: &str) -> bool {
        self.factor_index(name).is_some()
    }

    pub fn has_species(&self, name: &str) -> bool {
        self.species_index(name).is_some()
    }

    /// Resolve a caller-supplied factor list to canonical order.
    ///
    /// `None` selects every factor. Duplicates collapse.
    pub fn select_factors(&self, requested: Option<&[String]>) -> Result<Vec<String>> {
        select(&self.factors, requested, |name| {
            PmfError::UnknownFactor(name.to_string())
        })
    }

    /// Resolve a caller-supplied species list to canonical order.
    pub fn select_species(&self, requested: Option<&[String]>) -> Result<Vec<String>> {
        select(&self.species, requested, |name| {
            PmfError::UnknownSpecies(name.to_string())
        })
    }
}

fn select(
    vocabulary: &[String],
    requested: Option<&[String]>,
    unknown: impl Fn(&str) -> PmfError,
) -> Result<Vec<String>> {
    let Some(requested) = requested else {
        return Ok(vocabulary.to_vec());
    };
    for name in requested {
        if !vocabulary.contains(name) {
            return Err(unknown(name));
        }
    }
    Ok(vocabulary
        .iter()
        .filter(|v| requested.contains(*v))
        .cloned()
        .collect())
}

pub(crate) fn first_duplicate(labels: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    labels
        .iter()
        .find(|l| !seen.insert(l.as_str()))
        .map(|l| l.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn metadata() -> RunMetadata {
        RunMetadata::new(
            strings(&["Dust", "Traffic", "Sulfate-rich"]),
            strings(&["PM10", "OC", "EC"]),
            "PM10",
            TotalVariableSource::Priority,
        )
        .unwrap()
    }

    #[test]
    fn test_duplicate_factor_rejected() {
        let result = RunMetadata::new(
            strings(&["F1", "F1"]),
            strings(&["PM10"]),
            "PM10",
            TotalVariableSource::Priority,
        );
        assert!(matches!(result, Err(PmfError::Metadata(_))));
    }

    #[test]
    fn test_total_variable_must_be_species() {
        let result = RunMetadata::new(
            strings(&["F1"]),
            strings(&["OC"]),
            "PM10",
            TotalVariableSource::Override,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_select_factors_uses_canonical_order() {
        let meta = metadata();
        let selected = meta
            .select_factors(Some(&strings(&["Sulfate-rich", "Dust", "Dust"])))
            .unwrap();
        assert_eq!(selected, strings(&["Dust", "Sulfate-rich"]));
        assert_eq!(meta.select_factors(None).unwrap().len(), 3);
    }

    #[test]
    fn test_select_unknown_names() {
        let meta = metadata();
        let err = meta.select_factors(Some(&strings(&["Sea salt"]))).unwrap_err();
        assert!(matches!(err, PmfError::UnknownFactor(ref f) if f == "Sea salt"));
        let err = meta.select_species(Some(&strings(&["Na+"]))).unwrap_err();
        assert!(matches!(err, PmfError::UnknownSpecies(ref s) if s == "Na+"));
    }
}
