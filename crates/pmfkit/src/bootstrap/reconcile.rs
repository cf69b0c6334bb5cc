//! Reconciliation of bootstrap profiles against the factor mapping.

use tracing::{debug, warn};

use super::BootstrapConfig;
use super::set::{BootstrapSet, IterationStatus};
use crate::dataset::{RunKind, TableKind};
use crate::error::{PmfError, Result};
use crate::metadata::RunMetadata;
use crate::table::{Axis, BootstrapMapping, BootstrapProfileSet};
use crate::validation::{ConsistencyValidator, Evidence, Severity, TableShape, Warning, WarningKind};

/// Outcome of a successful reconciliation.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub set: BootstrapSet,
    pub warnings: Vec<Warning>,
}

/// Validate and fold the bootstrap tables of `run`.
///
/// Fails on unknown labels, on mapping rows that do not follow the
/// `<prefix><factor>` convention, and on reference factors without a
/// mapping row. Row sums that disagree with the observed iteration count
/// only produce warnings.
pub fn reconcile(
    run: RunKind,
    metadata: &RunMetadata,
    profiles: &BootstrapProfileSet,
    mapping: &BootstrapMapping,
    config: &BootstrapConfig,
) -> Result<Reconciliation> {
    let validator = ConsistencyValidator::new(metadata);
    let profiles_name = format!("{} {}", run, TableKind::BootstrapProfiles);
    let mapping_name = format!("{} {}", run, TableKind::BootstrapMapping);

    let profiles = validator.conform(profiles, &profiles_name, TableShape::BOOTSTRAP_PROFILES)?;
    let mapping = validator.conform(mapping, &mapping_name, TableShape::BOOTSTRAP_MAPPING)?;

    for row in mapping.rows() {
        if row.label != format!("{}{}", config.factor_prefix, row.factor) {
            return Err(PmfError::UnknownLabel {
                label: row.label.clone(),
                axis: Axis::BootstrapFactor,
                table: mapping_name,
            });
        }
    }

    // Rows are unique and canonical after conform, so equal length means 1:1.
    if let Some(factor) = metadata
        .factors()
        .iter()
        .find(|f| !mapping.rows().iter().any(|row| &row.factor == *f))
    {
        return Err(PmfError::IncompleteMapping {
            run,
            factor: factor.clone(),
        });
    }

    let observed = profiles.column_count();
    let mut warnings = Vec::new();
    let mut mapped_total = 0;

    for (r, row) in mapping.rows().iter().enumerate() {
        let sum: usize = mapping.row(r).iter().map(|&n| n as usize).sum();
        mapped_total = mapped_total.max(sum);
        if sum != observed {
            warn!(%run, row = %row.label, sum, observed, "bootstrap mapping count mismatch");
            warnings.push(
                Warning::new(
                    WarningKind::MappingCountMismatch,
                    Severity::Warning,
                    format!(
                        "{} accounts for {} iterations, profile set has {}",
                        row.label, sum, observed
                    ),
                )
                .for_table(run, TableKind::BootstrapMapping)
                .with_evidence(Evidence::new().with_label(&row.label).with_counts(observed, sum)),
            );
        }
    }

    let mut status = vec![IterationStatus::Mapped; observed];
    if observed > mapped_total {
        let excess = observed - mapped_total;
        let tagged = tag_non_converged(&profiles, metadata, config, &mut status);
        warn!(%run, excess, tagged, "bootstrap iterations not accounted for by the mapping");
        warnings.push(
            Warning::new(
                WarningKind::UnmappedIterations,
                Severity::Info,
                format!(
                    "{} iterations exceed the mapping total; {} tagged as unmapped",
                    excess, tagged
                ),
            )
            .for_table(run, TableKind::BootstrapProfiles)
            .with_evidence(Evidence::new().with_counts(excess, tagged)),
        );
    }

    debug!(
        %run,
        iterations = observed,
        warnings = warnings.len(),
        "reconciled bootstrap tables"
    );

    Ok(Reconciliation {
        set: BootstrapSet::new(profiles, mapping, status),
        warnings,
    })
}

/// Tag iterations whose total-variable value exceeds the threshold in any factor.
fn tag_non_converged(
    profiles: &BootstrapProfileSet,
    metadata: &RunMetadata,
    config: &BootstrapConfig,
    status: &mut [IterationStatus],
) -> usize {
    let total_rows: Vec<usize> = profiles
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, key)| key.species == metadata.total_variable())
        .map(|(i, _)| i)
        .collect();

    let mut tagged = 0;
    for (c, slot) in status.iter_mut().enumerate() {
        let diverged = total_rows.iter().any(|&r| {
            profiles
                .get(r, c)
                .is_some_and(|v| *v > config.non_convergence_threshold)
        });
        if diverged {
            *slot = IterationStatus::Unmapped;
            tagged += 1;
        }
    }
    tagged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::TotalVariableSource;
    use crate::table::{BootstrapFactor, IterationId, LabeledTable, MappingColumn, SpeciesFactor};

    fn metadata() -> RunMetadata {
        RunMetadata::new(
            vec!["F1".to_string(), "F2".to_string()],
            vec!["PM10".to_string(), "EC".to_string()],
            "PM10",
            TotalVariableSource::Priority,
        )
        .unwrap()
    }

    fn profiles(iterations: u32, outlier: Option<u32>) -> BootstrapProfileSet {
        let rows = vec![
            SpeciesFactor::new("PM10", "F1"),
            SpeciesFactor::new("PM10", "F2"),
            SpeciesFactor::new("EC", "F1"),
            SpeciesFactor::new("EC", "F2"),
        ];
        let columns = (0..iterations).map(IterationId).collect();
        LabeledTable::from_fn(rows, columns, |row, it| {
            if Some(it.0) == outlier && row.species == "PM10" && row.factor == "F2" {
                500.0
            } else {
                2.0
            }
        })
    }

    fn mapping(rows: &[(&str, [u32; 3])]) -> BootstrapMapping {
        let keys = rows
            .iter()
            .map(|(f, _)| BootstrapFactor {
                label: format!("BF-{}", f),
                factor: f.to_string(),
            })
            .collect();
        let columns = vec![
            MappingColumn::Factor("F1".to_string()),
            MappingColumn::Factor("F2".to_string()),
            MappingColumn::Unmapped,
        ];
        let values = rows.iter().flat_map(|(_, v)| v.to_vec()).collect();
        LabeledTable::new(keys, columns, values).unwrap()
    }

    #[test]
    fn test_consistent_tables_have_no_warnings() {
        let meta = metadata();
        let result = reconcile(
            RunKind::Base,
            &meta,
            &profiles(100, None),
            &mapping(&[("F2", [0, 100, 0]), ("F1", [98, 0, 2])]),
            &BootstrapConfig::default(),
        )
        .unwrap();

        assert!(result.warnings.is_empty());
        assert_eq!(result.set.mapping().rows()[0].factor, "F1");
        assert_eq!(result.set.unmapped().count(), 0);
        assert_eq!(result.set.mapping_row_sums(), vec![100, 100]);
    }

    #[test]
    fn test_row_sum_drift_is_a_warning() {
        let meta = metadata();
        let result = reconcile(
            RunKind::Base,
            &meta,
            &profiles(100, None),
            &mapping(&[("F1", [94, 5, 0]), ("F2", [0, 100, 0])]),
            &BootstrapConfig::default(),
        )
        .unwrap();

        let mismatches: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::MappingCountMismatch)
            .collect();
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].evidence.label.as_deref(), Some("BF-F1"));
        assert_eq!(mismatches[0].evidence.expected, Some(100));
        assert_eq!(mismatches[0].evidence.observed, Some(99));
        assert!(mismatches[0].concerns(RunKind::Base, TableKind::BootstrapMapping));
    }

    #[test]
    fn test_excess_iterations_tagged_not_dropped() {
        let meta = metadata();
        let result = reconcile(
            RunKind::Constrained,
            &meta,
            &profiles(101, Some(17)),
            &mapping(&[("F1", [100, 0, 0]), ("F2", [0, 100, 0])]),
            &BootstrapConfig::default(),
        )
        .unwrap();

        assert_eq!(result.set.iteration_count(), 101);
        assert_eq!(result.set.unmapped().collect::<Vec<_>>(), vec![IterationId(17)]);
        assert_eq!(
            result.set.status(IterationId(3)),
            Some(IterationStatus::Mapped)
        );
        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::UnmappedIterations));
    }

    #[test]
    fn test_missing_factor_row() {
        let meta = metadata();
        let err = reconcile(
            RunKind::Base,
            &meta,
            &profiles(10, None),
            &mapping(&[("F1", [10, 0, 0])]),
            &BootstrapConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PmfError::IncompleteMapping { ref factor, .. } if factor == "F2"));
    }

    #[test]
    fn test_wrong_prefix_rejected() {
        let meta = metadata();
        let config = BootstrapConfig {
            factor_prefix: "Boot ".to_string(),
            ..BootstrapConfig::default()
        };
        let err = reconcile(
            RunKind::Base,
            &meta,
            &profiles(10, None),
            &mapping(&[("F1", [10, 0, 0]), ("F2", [0, 10, 0])]),
            &config,
        )
        .unwrap_err();
        assert!(matches!(err, PmfError::UnknownLabel { axis: Axis::BootstrapFactor, .. }));
    }

    #[test]
    fn test_unknown_reference_factor_column() {
        let meta = metadata();
        let bad = LabeledTable::new(
            vec![BootstrapFactor {
                label: "BF-F1".to_string(),
                factor: "F1".to_string(),
            }],
            vec![MappingColumn::Factor("F9".to_string())],
            vec![10],
        )
        .unwrap();
        let err = reconcile(
            RunKind::Base,
            &meta,
            &profiles(10, None),
            &bad,
            &BootstrapConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, PmfError::UnknownLabel { ref label, .. } if label == "F9"));
    }
}
