//! The canonical dataset: one run vocabulary and the validated tables of
//! the base and constrained runs.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::config::DatasetConfig;
use super::kinds::{RunKind, TableKind};
use crate::bootstrap::{self, BootstrapSet};
use crate::error::{PmfError, Result};
use crate::input::convert;
use crate::input::{RawTable, SourceMetadata, TableProvider};
use crate::metadata::{MetadataResolver, RunMetadata, TotalVariableSource};
use crate::table::{
    BootstrapMapping, BootstrapProfileSet, ContributionMatrix, DispSwaps, LabeledTable,
    ProfileMatrix, UncertaintySummary,
};
use crate::validation::{
    AxisKey, ConsistencyValidator, Evidence, Severity, TableShape, Warning, WarningKind,
};

/// Validated tables of one run variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunTables {
    pub(crate) profiles: Option<ProfileMatrix>,
    pub(crate) contributions: Option<ContributionMatrix>,
    pub(crate) uncertainty_summary: Option<UncertaintySummary>,
    pub(crate) bootstrap: Option<BootstrapSet>,
    pub(crate) disp_swaps: Option<DispSwaps>,
}

impl RunTables {
    pub fn profiles(&self) -> Option<&ProfileMatrix> {
        self.profiles.as_ref()
    }

    pub fn contributions(&self) -> Option<&ContributionMatrix> {
        self.contributions.as_ref()
    }

    pub fn uncertainty_summary(&self) -> Option<&UncertaintySummary> {
        self.uncertainty_summary.as_ref()
    }

    pub fn bootstrap(&self) -> Option<&BootstrapSet> {
        self.bootstrap.as_ref()
    }

    pub fn disp_swaps(&self) -> Option<&DispSwaps> {
        self.disp_swaps.as_ref()
    }

    /// Whether the table of `kind` is present.
    pub fn has(&self, kind: TableKind) -> bool {
        match kind {
            TableKind::Profiles => self.profiles.is_some(),
            TableKind::Contributions => self.contributions.is_some(),
            TableKind::UncertaintySummary => self.uncertainty_summary.is_some(),
            TableKind::BootstrapProfiles | TableKind::BootstrapMapping => {
                self.bootstrap.is_some()
            }
            TableKind::DispSwaps => self.disp_swaps.is_some(),
        }
    }

    /// Kinds of the tables present, in [`TableKind::ALL`] order.
    pub fn present(&self) -> Vec<TableKind> {
        TableKind::ALL.into_iter().filter(|k| self.has(*k)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }
}

/// Where an ingested table came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    pub run: RunKind,
    pub table: TableKind,
    pub source: SourceMetadata,
}

/// Validated tables of one analysis session.
///
/// The dataset starts empty. Ingesting the base profiles resolves the
/// [`RunMetadata`]; every other table is validated against it and put in
/// canonical order before being stored. Each ingestion step either replaces
/// one table wholesale or leaves the dataset untouched.
///
/// # Example
///
/// ```no_run
/// use pmfkit::{CanonicalDataset, DatasetConfig, DirectoryProvider, RunKind};
///
/// let provider = DirectoryProvider::new("data/", "GRE");
/// let dataset = CanonicalDataset::load_from(&provider, DatasetConfig::default())?;
/// let metadata = dataset.require_metadata()?;
/// println!("{} factors, total variable {}", metadata.factors().len(), metadata.total_variable());
/// println!("{:?}", dataset.run(RunKind::Constrained).present());
/// # Ok::<(), pmfkit::PmfError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct CanonicalDataset {
    pub(crate) config: DatasetConfig,
    pub(crate) metadata: Option<RunMetadata>,
    pub(crate) base: RunTables,
    pub(crate) constrained: RunTables,
    pub(crate) warnings: Vec<Warning>,
    pub(crate) sources: Vec<TableSource>,
}

impl CanonicalDataset {
    /// Create an empty dataset with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DatasetConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Ingest every table `provider` has for both runs.
    ///
    /// The base profiles are mandatory. Bootstrap tables are ingested only
    /// when both the profiles and the mapping exist.
    pub fn load_from(provider: &dyn TableProvider, config: DatasetConfig) -> Result<Self> {
        config.check()?;
        let mut dataset = Self::with_config(config);

        let base_profiles = provider
            .table(RunKind::Base, TableKind::Profiles)?
            .ok_or(PmfError::MissingRun {
                run: RunKind::Base,
                table: TableKind::Profiles,
            })?;
        dataset.ingest_raw(RunKind::Base, TableKind::Profiles, &base_profiles)?;

        for run in RunKind::ALL {
            for kind in [
                TableKind::Profiles,
                TableKind::Contributions,
                TableKind::UncertaintySummary,
                TableKind::DispSwaps,
            ] {
                if run == RunKind::Base && kind == TableKind::Profiles {
                    continue;
                }
                if let Some(raw) = provider.table(run, kind)? {
                    dataset.ingest_raw(run, kind, &raw)?;
                }
            }

            let profiles = provider.table(run, TableKind::BootstrapProfiles)?;
            let mapping = provider.table(run, TableKind::BootstrapMapping)?;
            match (profiles, mapping) {
                (Some(profiles), Some(mapping)) => {
                    dataset.ingest_raw_bootstrap(run, &profiles, &mapping)?
                }
                (None, None) => {}
                (Some(_), None) | (None, Some(_)) => {
                    warn!(%run, "bootstrap profiles and mapping must come together, skipping");
                }
            }
        }

        info!(
            base = ?dataset.base.present(),
            constrained = ?dataset.constrained.present(),
            warnings = dataset.warnings.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    pub fn metadata(&self) -> Option<&RunMetadata> {
        self.metadata.as_ref()
    }

    /// Metadata, or `MissingRun` when the base profiles were never ingested.
    pub fn require_metadata(&self) -> Result<&RunMetadata> {
        self.metadata.as_ref().ok_or(PmfError::MissingRun {
            run: RunKind::Base,
            table: TableKind::Profiles,
        })
    }

    pub fn run(&self, run: RunKind) -> &RunTables {
        match run {
            RunKind::Base => &self.base,
            RunKind::Constrained => &self.constrained,
        }
    }

    pub fn profiles(&self, run: RunKind) -> Option<&ProfileMatrix> {
        self.run(run).profiles()
    }

    pub fn contributions(&self, run: RunKind) -> Option<&ContributionMatrix> {
        self.run(run).contributions()
    }

    pub fn uncertainty(&self, run: RunKind) -> Option<&UncertaintySummary> {
        self.run(run).uncertainty_summary()
    }

    pub fn bootstrap(&self, run: RunKind) -> Option<&BootstrapSet> {
        self.run(run).bootstrap()
    }

    pub fn disp_swaps(&self, run: RunKind) -> Option<&DispSwaps> {
        self.run(run).disp_swaps()
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Warnings recorded while ingesting `table` of `run`.
    pub fn warnings_for(&self, run: RunKind, table: TableKind) -> Vec<&Warning> {
        self.warnings
            .iter()
            .filter(|w| w.concerns(run, table))
            .collect()
    }

    pub fn sources(&self) -> &[TableSource] {
        &self.sources
    }

    pub(crate) fn run_mut(&mut self, run: RunKind) -> &mut RunTables {
        match run {
            RunKind::Base => &mut self.base,
            RunKind::Constrained => &mut self.constrained,
        }
    }

    // ========================================================================
    // Typed ingestion
    // ========================================================================

    /// Ingest the profile table of `run`.
    ///
    /// Base profiles re-resolve the metadata, which discards every other
    /// table and warning. Constrained profiles are validated against the
    /// existing metadata and must contain the total variable.
    pub fn ingest_profiles(&mut self, run: RunKind, profiles: ProfileMatrix) -> Result<()> {
        require_finite(&profiles, run)?;
        match run {
            RunKind::Base => self.ingest_base_profiles(profiles),
            RunKind::Constrained => {
                let conformed = {
                    let metadata = self.require_metadata()?;
                    let conformed = ConsistencyValidator::new(metadata).conform(
                        &profiles,
                        &table_name(run, TableKind::Profiles),
                        TableShape::PROFILES,
                    )?;
                    require_total_variable(&conformed, metadata, run)?;
                    conformed
                };
                self.replace(run, TableKind::Profiles, Vec::new(), |tables| {
                    tables.profiles = Some(conformed)
                });
                Ok(())
            }
        }
    }

    fn ingest_base_profiles(&mut self, profiles: ProfileMatrix) -> Result<()> {
        let metadata =
            MetadataResolver::with_config(self.config.total_variable.clone()).resolve(&profiles)?;
        let conformed = ConsistencyValidator::new(&metadata).conform(
            &profiles,
            &table_name(RunKind::Base, TableKind::Profiles),
            TableShape::PROFILES,
        )?;

        let mut warnings = Vec::new();
        if let TotalVariableSource::Fallback { strategy } = metadata.total_variable_source() {
            warn!(
                total_variable = metadata.total_variable(),
                strategy = strategy.as_str(),
                "no priority species found, total variable chosen by fallback"
            );
            warnings.push(
                Warning::new(
                    WarningKind::TotalVariableFallback,
                    Severity::Warning,
                    format!(
                        "total variable '{}' chosen by {}",
                        metadata.total_variable(),
                        strategy
                    ),
                )
                .for_table(RunKind::Base, TableKind::Profiles)
                .with_evidence(Evidence::new().with_label(metadata.total_variable())),
            );
        }

        if self.metadata.is_some() {
            debug!("metadata re-resolved, discarding previously ingested tables");
        }
        self.metadata = Some(metadata);
        self.base = RunTables {
            profiles: Some(conformed),
            ..RunTables::default()
        };
        self.constrained = RunTables::default();
        self.warnings = warnings;
        self.sources.clear();
        Ok(())
    }

    pub fn ingest_contributions(
        &mut self,
        run: RunKind,
        contributions: ContributionMatrix,
    ) -> Result<()> {
        let conformed = self.conform(run, TableKind::Contributions, &contributions, TableShape::CONTRIBUTIONS)?;
        self.replace(run, TableKind::Contributions, Vec::new(), |tables| {
            tables.contributions = Some(conformed)
        });
        Ok(())
    }

    pub fn ingest_uncertainty_summary(
        &mut self,
        run: RunKind,
        summary: UncertaintySummary,
    ) -> Result<()> {
        let conformed = self.conform(run, TableKind::UncertaintySummary, &summary, TableShape::UNCERTAINTY)?;
        self.replace(run, TableKind::UncertaintySummary, Vec::new(), |tables| {
            tables.uncertainty_summary = Some(conformed)
        });
        Ok(())
    }

    pub fn ingest_disp_swaps(&mut self, run: RunKind, swaps: DispSwaps) -> Result<()> {
        let conformed = self.conform(run, TableKind::DispSwaps, &swaps, TableShape::DISP_SWAPS)?;
        self.replace(run, TableKind::DispSwaps, Vec::new(), |tables| {
            tables.disp_swaps = Some(conformed)
        });
        Ok(())
    }

    /// Reconcile and store the bootstrap tables of `run`.
    ///
    /// Mapping count drift is recorded in [`warnings`](Self::warnings).
    pub fn ingest_bootstrap(
        &mut self,
        run: RunKind,
        profiles: BootstrapProfileSet,
        mapping: BootstrapMapping,
    ) -> Result<()> {
        let reconciled = bootstrap::reconcile(
            run,
            self.require_metadata()?,
            &profiles,
            &mapping,
            &self.config.bootstrap,
        )?;
        self.warnings
            .retain(|w| !w.concerns(run, TableKind::BootstrapProfiles));
        self.replace(run, TableKind::BootstrapMapping, reconciled.warnings, |tables| {
            tables.bootstrap = Some(reconciled.set)
        });
        Ok(())
    }

    fn conform<R, C, V>(
        &self,
        run: RunKind,
        kind: TableKind,
        table: &LabeledTable<R, C, V>,
        shape: TableShape,
    ) -> Result<LabeledTable<R, C, V>>
    where
        R: AxisKey,
        C: AxisKey,
        V: Clone,
    {
        let metadata = self.require_metadata()?;
        ConsistencyValidator::new(metadata).conform(table, &table_name(run, kind), shape)
    }

    /// Swap in a validated table and the warnings it produced.
    fn replace(
        &mut self,
        run: RunKind,
        kind: TableKind,
        warnings: Vec<Warning>,
        store: impl FnOnce(&mut RunTables),
    ) {
        store(self.run_mut(run));
        self.warnings.retain(|w| !w.concerns(run, kind));
        self.warnings.extend(warnings);
        debug!(%run, %kind, "ingested table");
    }

    // ========================================================================
    // Raw ingestion
    // ========================================================================

    /// Convert and ingest one raw table.
    ///
    /// Bootstrap tables need both halves; use
    /// [`ingest_raw_bootstrap`](Self::ingest_raw_bootstrap).
    pub fn ingest_raw(&mut self, run: RunKind, kind: TableKind, raw: &RawTable) -> Result<()> {
        match kind {
            TableKind::Profiles => {
                let table = convert::profiles_from_raw(raw, self.config.profile_floor)?;
                self.ingest_profiles(run, table)?;
            }
            TableKind::Contributions => {
                let table =
                    convert::contributions_from_raw(raw, self.config.contribution_missing)?;
                self.ingest_contributions(run, table)?;
            }
            TableKind::UncertaintySummary => {
                let table = convert::uncertainty_from_raw(raw)?;
                self.ingest_uncertainty_summary(run, table)?;
            }
            TableKind::DispSwaps => {
                let table = convert::disp_swaps_from_raw(raw)?;
                self.ingest_disp_swaps(run, table)?;
            }
            TableKind::BootstrapProfiles | TableKind::BootstrapMapping => {
                return Err(PmfError::Config(format!(
                    "'{}' must be ingested together with its bootstrap counterpart",
                    raw.name
                )));
            }
        }
        self.record_source(run, kind, raw);
        Ok(())
    }

    /// Convert and ingest the bootstrap profiles and mapping of `run`.
    pub fn ingest_raw_bootstrap(
        &mut self,
        run: RunKind,
        profiles: &RawTable,
        mapping: &RawTable,
    ) -> Result<()> {
        let profiles_table = convert::bootstrap_profiles_from_raw(profiles)?;
        let mapping_table = convert::mapping_from_raw(mapping, &self.config.bootstrap.factor_prefix)?;
        self.ingest_bootstrap(run, profiles_table, mapping_table)?;
        self.record_source(run, TableKind::BootstrapProfiles, profiles);
        self.record_source(run, TableKind::BootstrapMapping, mapping);
        Ok(())
    }

    fn record_source(&mut self, run: RunKind, table: TableKind, raw: &RawTable) {
        self.sources.retain(|s| !(s.run == run && s.table == table));
        if let Some(source) = &raw.source {
            self.sources.push(TableSource {
                run,
                table,
                source: source.clone(),
            });
        }
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    /// Re-check every table against the metadata.
    ///
    /// Holds after any sequence of successful ingestion steps; used when a
    /// dataset is rebuilt from outside data.
    pub fn check_invariants(&self) -> Result<()> {
        let metadata = match &self.metadata {
            Some(metadata) => metadata,
            None if self.base.is_empty() && self.constrained.is_empty() => return Ok(()),
            None => return Err(PmfError::Metadata("tables present without metadata".to_string())),
        };
        let validator = ConsistencyValidator::new(metadata);

        for run in RunKind::ALL {
            let tables = self.run(run);
            let canonical = |kind: TableKind, ok: Result<bool>| -> Result<()> {
                if ok? {
                    Ok(())
                } else {
                    Err(PmfError::Metadata(format!(
                        "{} is not in canonical order",
                        table_name(run, kind)
                    )))
                }
            };

            if let Some(t) = &tables.profiles {
                let name = table_name(run, TableKind::Profiles);
                canonical(TableKind::Profiles, validator.is_canonical(t, &name, TableShape::PROFILES))?;
                require_total_variable(t, metadata, run)?;
            }
            if let Some(t) = &tables.contributions {
                let name = table_name(run, TableKind::Contributions);
                canonical(TableKind::Contributions, validator.is_canonical(t, &name, TableShape::CONTRIBUTIONS))?;
            }
            if let Some(t) = &tables.uncertainty_summary {
                let name = table_name(run, TableKind::UncertaintySummary);
                canonical(TableKind::UncertaintySummary, validator.is_canonical(t, &name, TableShape::UNCERTAINTY))?;
            }
            if let Some(t) = &tables.disp_swaps {
                let name = table_name(run, TableKind::DispSwaps);
                canonical(TableKind::DispSwaps, validator.is_canonical(t, &name, TableShape::DISP_SWAPS))?;
            }
            if let Some(set) = &tables.bootstrap {
                let name = table_name(run, TableKind::BootstrapProfiles);
                canonical(
                    TableKind::BootstrapProfiles,
                    validator.is_canonical(set.profiles(), &name, TableShape::BOOTSTRAP_PROFILES),
                )?;
                let name = table_name(run, TableKind::BootstrapMapping);
                canonical(
                    TableKind::BootstrapMapping,
                    validator.is_canonical(set.mapping(), &name, TableShape::BOOTSTRAP_MAPPING),
                )?;
                if !set.status_len_matches() {
                    return Err(PmfError::Metadata(format!(
                        "{} iteration status does not match its columns",
                        name
                    )));
                }
            }
        }

        if self.base.profiles.is_none() {
            return Err(PmfError::MissingRun {
                run: RunKind::Base,
                table: TableKind::Profiles,
            });
        }
        Ok(())
    }
}

/// Name used for a table in error messages.
pub(crate) fn table_name(run: RunKind, kind: TableKind) -> String {
    format!("{} {}", run, kind)
}

/// Profile concentrations must be finite numbers.
fn require_finite(profiles: &ProfileMatrix, run: RunKind) -> Result<()> {
    let columns = profiles.column_count().max(1);
    match profiles.values().iter().position(|v| !v.is_finite()) {
        Some(i) => Err(PmfError::parse(
            table_name(run, TableKind::Profiles),
            i / columns,
            i % columns,
            format!("concentration {} is not finite", profiles.values()[i]),
        )),
        None => Ok(()),
    }
}

fn require_total_variable(
    profiles: &ProfileMatrix,
    metadata: &RunMetadata,
    run: RunKind,
) -> Result<()> {
    if profiles.row_position(metadata.total_variable()).is_none() {
        return Err(PmfError::Metadata(format!(
            "{} lacks the total variable '{}'",
            table_name(run, TableKind::Profiles),
            metadata.total_variable()
        )));
    }
    Ok(())
}
