//! Reconciled bootstrap tables of one run.

use serde::{Deserialize, Serialize};

use crate::table::{BootstrapMapping, BootstrapProfileSet, IterationId};

/// Whether a bootstrap iteration is accounted for by the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IterationStatus {
    Mapped,
    Unmapped,
}

/// Validated bootstrap profiles and mapping, with a status per iteration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapSet {
    profiles: BootstrapProfileSet,
    mapping: BootstrapMapping,
    /// Parallel to `profiles.columns()`.
    status: Vec<IterationStatus>,
}

impl BootstrapSet {
    pub(crate) fn new(
        profiles: BootstrapProfileSet,
        mapping: BootstrapMapping,
        status: Vec<IterationStatus>,
    ) -> Self {
        Self {
            profiles,
            mapping,
            status,
        }
    }

    pub fn profiles(&self) -> &BootstrapProfileSet {
        &self.profiles
    }

    pub fn mapping(&self) -> &BootstrapMapping {
        &self.mapping
    }

    /// Iterations observed in the profile set, in ascending order.
    pub fn iterations(&self) -> &[IterationId] {
        self.profiles.columns()
    }

    /// Status of each iteration, parallel to [`iterations`](Self::iterations).
    pub fn statuses(&self) -> &[IterationStatus] {
        &self.status
    }

    pub fn iteration_count(&self) -> usize {
        self.status.len()
    }

    pub fn status(&self, iteration: IterationId) -> Option<IterationStatus> {
        self.profiles
            .column_position(&iteration)
            .map(|pos| self.status[pos])
    }

    /// Iterations tagged as unmapped.
    pub fn unmapped(&self) -> impl Iterator<Item = IterationId> + '_ {
        self.iterations()
            .iter()
            .zip(&self.status)
            .filter(|(_, s)| **s == IterationStatus::Unmapped)
            .map(|(id, _)| *id)
    }

    /// Total of each mapping row, in row order.
    pub fn mapping_row_sums(&self) -> Vec<usize> {
        (0..self.mapping.row_count())
            .map(|r| self.mapping.row(r).iter().map(|&n| n as usize).sum())
            .collect()
    }

    pub(crate) fn into_parts(self) -> (BootstrapProfileSet, BootstrapMapping, Vec<IterationStatus>) {
        (self.profiles, self.mapping, self.status)
    }

    pub(crate) fn status_len_matches(&self) -> bool {
        self.status.len() == self.profiles.column_count()
    }
}
