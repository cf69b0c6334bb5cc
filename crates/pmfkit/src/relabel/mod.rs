//! Relabeling transforms.
//!
//! Every transform returns a new [`CanonicalDataset`] and leaves the
//! receiver untouched. Renames are applied to the metadata and to every
//! table at once, so the result passes the same invariant checks as a
//! freshly ingested dataset.

mod carbon;
mod categories;

pub use carbon::{CARBON_EQUIVALENTS, OC, OC_STAR, carbon_equivalent};
pub use categories::{source_categories, source_category};

use std::collections::HashMap;

use tracing::debug;

use crate::bootstrap::BootstrapSet;
use crate::dataset::{CanonicalDataset, RunKind, RunTables, TableKind, table_name};
use crate::error::{PmfError, Result};
use crate::metadata::{RunMetadata, TotalVariableSource, first_duplicate};
use crate::table::{Axis, BootstrapFactor, FactorSpecies, MappingColumn, SpeciesFactor};
use crate::validation::{ConsistencyValidator, TableShape};

type Rename<'a> = &'a dyn Fn(&str) -> String;

fn identity(name: &str) -> String {
    name.to_string()
}

impl CanonicalDataset {
    /// Rename the total-variable species everywhere.
    ///
    /// The new name must not already be a species.
    pub fn with_total_variable(&self, name: &str) -> Result<Self> {
        let metadata = self.require_metadata()?;
        let current = metadata.total_variable().to_string();
        if current == name {
            return Ok(self.clone());
        }
        let species = |s: &str| {
            if s == current {
                name.to_string()
            } else {
                s.to_string()
            }
        };
        self.renamed(&identity, &species, Some(TotalVariableSource::Override))
    }

    /// Rename factors everywhere, bootstrap mapping labels included.
    ///
    /// Keys of `mapper` must be factors; factors absent from it keep their
    /// name. Two factors ending up with the same name is an error.
    pub fn with_renamed_factors(&self, mapper: &HashMap<String, String>) -> Result<Self> {
        let metadata = self.require_metadata()?;
        if let Some(unknown) = mapper.keys().find(|k| !metadata.has_factor(k)) {
            return Err(PmfError::UnknownFactor(unknown.clone()));
        }
        let factor = |f: &str| mapper.get(f).cloned().unwrap_or_else(|| f.to_string());
        self.renamed(&factor, &identity, None)
    }

    /// Rename factors to their canonical source category.
    ///
    /// Names without a known category are kept.
    pub fn with_source_categories(&self) -> Result<Self> {
        let factor = |f: &str| {
            source_category(f)
                .map(str::to_string)
                .unwrap_or_else(|| f.to_string())
        };
        self.renamed(&factor, &identity, None)
    }

    /// Add or replace the `OC` species of both profile tables.
    ///
    /// `OC = OC* + sum(c_i * marker_i)` over the organic markers present,
    /// with `c_i` from [`CARBON_EQUIVALENTS`]. A new `OC` species is
    /// appended to the vocabulary.
    pub fn with_recomputed_organic_carbon(&self) -> Result<Self> {
        let metadata = self.require_metadata()?;
        if !metadata.has_species(OC_STAR) {
            return Err(PmfError::UnknownSpecies(OC_STAR.to_string()));
        }

        let mut species = metadata.species().to_vec();
        if !metadata.has_species(OC) {
            species.push(OC.to_string());
        }
        let updated = RunMetadata::new(
            metadata.factors().to_vec(),
            species,
            metadata.total_variable(),
            metadata.total_variable_source().clone(),
        )?;

        let validator = ConsistencyValidator::new(&updated);
        let mut dataset = self.clone();
        for run in RunKind::ALL {
            let Some(profiles) = dataset.run_mut(run).profiles.as_mut() else {
                continue;
            };
            let oc_star = profiles
                .row_position(OC_STAR)
                .ok_or_else(|| PmfError::UnknownSpecies(OC_STAR.to_string()))?;

            let mut oc = profiles.row(oc_star).to_vec();
            let mut markers = 0;
            for (s, name) in profiles.rows().iter().enumerate() {
                if let Some(c) = carbon_equivalent(name) {
                    markers += 1;
                    for (acc, v) in oc.iter_mut().zip(profiles.row(s)) {
                        *acc += c * v;
                    }
                }
            }
            profiles.upsert_row(OC.to_string(), oc)?;
            *profiles = validator.conform(
                profiles,
                &table_name(run, TableKind::Profiles),
                TableShape::PROFILES,
            )?;
            debug!(%run, markers, "recomputed organic carbon");
        }

        dataset.metadata = Some(updated);
        dataset.check_invariants()?;
        Ok(dataset)
    }

    fn renamed(
        &self,
        factor: Rename<'_>,
        species: Rename<'_>,
        source: Option<TotalVariableSource>,
    ) -> Result<Self> {
        let metadata = self.require_metadata()?;

        let factors: Vec<String> = metadata.factors().iter().map(|f| factor(f.as_str())).collect();
        if let Some(dup) = first_duplicate(&factors) {
            return Err(PmfError::DuplicateLabel {
                label: dup.to_string(),
                axis: Axis::Factor,
                table: "metadata".to_string(),
            });
        }
        let species_list: Vec<String> = metadata.species().iter().map(|s| species(s.as_str())).collect();
        if let Some(dup) = first_duplicate(&species_list) {
            return Err(PmfError::DuplicateLabel {
                label: dup.to_string(),
                axis: Axis::Species,
                table: "metadata".to_string(),
            });
        }

        let renamed_metadata = RunMetadata::new(
            factors,
            species_list,
            species(metadata.total_variable()),
            source.unwrap_or_else(|| metadata.total_variable_source().clone()),
        )?;

        let prefix = self.config.bootstrap.factor_prefix.as_str();
        let dataset = CanonicalDataset {
            config: self.config.clone(),
            metadata: Some(renamed_metadata),
            base: rename_run(&self.base, factor, species, prefix),
            constrained: rename_run(&self.constrained, factor, species, prefix),
            warnings: self.warnings.clone(),
            sources: self.sources.clone(),
        };
        dataset.check_invariants()?;
        Ok(dataset)
    }
}

fn rename_run(tables: &RunTables, factor: Rename<'_>, species: Rename<'_>, prefix: &str) -> RunTables {
    RunTables {
        profiles: tables.profiles.clone().map(|t| {
            t.relabel_rows(|s| species(s.as_str()))
                .relabel_columns(|f| factor(f.as_str()))
        }),
        contributions: tables
            .contributions
            .clone()
            .map(|t| t.relabel_columns(|f| factor(f.as_str()))),
        uncertainty_summary: tables.uncertainty_summary.clone().map(|t| {
            t.relabel_rows(|k| FactorSpecies::new(factor(k.factor.as_str()), species(k.species.as_str())))
        }),
        bootstrap: tables.bootstrap.clone().map(|set| {
            let (profiles, mapping, status) = set.into_parts();
            let profiles = profiles
                .relabel_rows(|k| SpeciesFactor::new(species(k.species.as_str()), factor(k.factor.as_str())));
            let mapping = mapping
                .relabel_rows(|k| {
                    let renamed = factor(k.factor.as_str());
                    BootstrapFactor {
                        label: format!("{}{}", prefix, renamed),
                        factor: renamed,
                    }
                })
                .relabel_columns(|c| match c {
                    MappingColumn::Factor(f) => MappingColumn::Factor(factor(f.as_str())),
                    MappingColumn::Unmapped => MappingColumn::Unmapped,
                });
            BootstrapSet::new(profiles, mapping, status)
        }),
        disp_swaps: tables
            .disp_swaps
            .clone()
            .map(|t| t.relabel_columns(|f| factor(f.as_str()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Parser;

    fn ingest(ds: &mut CanonicalDataset, run: RunKind, kind: TableKind, text: &str) {
        let raw = Parser::new().parse_str(kind.as_str(), text).unwrap();
        ds.ingest_raw(run, kind, &raw).unwrap();
    }

    fn dataset() -> CanonicalDataset {
        let mut ds = CanonicalDataset::new();
        ingest(
            &mut ds,
            RunKind::Base,
            TableKind::Profiles,
            "Specie,Bio. burning,Dust,Factor 3\n\
             PMrecons,4.0,2.0,1.0\n\
             OC*,1.0,0.1,0.3\n\
             Levoglucosan,0.5,0,0\n\
             MSA,0,0,1.0\n",
        );
        ingest(
            &mut ds,
            RunKind::Base,
            TableKind::Contributions,
            "Date,Bio. burning,Dust,Factor 3\n2017-01-01,1,2,3\n",
        );
        let raw_profiles = Parser::new()
            .parse_str(
                "bs",
                "Specie,Profile,Boot1,Boot2\n\
                 PMrecons,Dust,2.0,2.1\n\
                 PMrecons,Bio. burning,4.0,4.2\n",
            )
            .unwrap();
        let raw_mapping = Parser::new()
            .parse_str(
                "map",
                "mapped,Bio. burning,Dust,Factor 3,unmapped\n\
                 BF-Bio. burning,2,0,0,0\n\
                 BF-Dust,0,2,0,0\n\
                 BF-Factor 3,0,0,2,0\n",
            )
            .unwrap();
        ds.ingest_raw_bootstrap(RunKind::Base, &raw_profiles, &raw_mapping)
            .unwrap();
        ds
    }

    #[test]
    fn test_source_categories_rename_every_table() {
        let ds = dataset();
        let renamed = ds.with_source_categories().unwrap();

        let meta = renamed.metadata().unwrap();
        assert_eq!(meta.factors(), &["Biomass_burning", "Dust", "Factor 3"]);
        assert_eq!(
            renamed.contributions(RunKind::Base).unwrap().columns(),
            meta.factors()
        );
        let mapping = renamed.bootstrap(RunKind::Base).unwrap().mapping();
        assert_eq!(mapping.rows()[0].label, "BF-Biomass_burning");
        assert_eq!(mapping.columns()[0], MappingColumn::Factor("Biomass_burning".to_string()));

        // The original is untouched.
        assert_eq!(ds.metadata().unwrap().factors()[0], "Bio. burning");
    }

    #[test]
    fn test_rename_collision() {
        let ds = dataset();
        let mapper = HashMap::from([("Factor 3".to_string(), "Dust".to_string())]);
        let err = ds.with_renamed_factors(&mapper).unwrap_err();
        assert!(matches!(
            err,
            PmfError::DuplicateLabel { ref label, axis: Axis::Factor, .. } if label == "Dust"
        ));

        let mapper = HashMap::from([("Nope".to_string(), "X".to_string())]);
        assert!(matches!(
            ds.with_renamed_factors(&mapper),
            Err(PmfError::UnknownFactor(_))
        ));
    }

    #[test]
    fn test_total_variable_rename() {
        let ds = dataset();
        let renamed = ds.with_total_variable("PM10").unwrap();
        let meta = renamed.metadata().unwrap();
        assert_eq!(meta.total_variable(), "PM10");
        assert_eq!(meta.total_variable_source(), &TotalVariableSource::Override);
        assert_eq!(renamed.profiles(RunKind::Base).unwrap().rows()[0], "PM10");
        assert_eq!(
            renamed.bootstrap(RunKind::Base).unwrap().profiles().rows()[0].species,
            "PM10"
        );

        assert!(matches!(
            ds.with_total_variable("MSA"),
            Err(PmfError::DuplicateLabel { axis: Axis::Species, .. })
        ));
    }

    #[test]
    fn test_recomputed_organic_carbon() {
        let ds = dataset();
        let updated = ds.with_recomputed_organic_carbon().unwrap();
        let meta = updated.metadata().unwrap();
        assert_eq!(meta.species().last().map(String::as_str), Some(OC));

        let profiles = updated.profiles(RunKind::Base).unwrap();
        let oc = profiles.row(profiles.row_position(OC).unwrap());
        assert!((oc[0] - (1.0 + 0.44 * 0.5)).abs() < 1e-12);
        assert!((oc[2] - (0.3 + 0.12)).abs() < 1e-12);

        // Applying twice replaces rather than appends.
        let again = updated.with_recomputed_organic_carbon().unwrap();
        assert_eq!(
            again.metadata().unwrap().species().len(),
            meta.species().len()
        );
    }

    #[test]
    fn test_organic_carbon_requires_oc_star() {
        let mut ds = CanonicalDataset::new();
        ingest(
            &mut ds,
            RunKind::Base,
            TableKind::Profiles,
            "Specie,F1\nPM10,1.0\n",
        );
        assert!(matches!(
            ds.with_recomputed_organic_carbon(),
            Err(PmfError::UnknownSpecies(_))
        ));
    }
}
