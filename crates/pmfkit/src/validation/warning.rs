//! Recoverable conditions recorded during ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dataset::{RunKind, TableKind};

/// Kind of recoverable condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A bootstrap mapping row does not sum to the observed iteration count.
    MappingCountMismatch,
    /// Bootstrap iterations were tagged as unmapped.
    UnmappedIterations,
    /// The total variable came from the fallback strategy.
    TotalVariableFallback,
}

impl WarningKind {
    /// Get a human-readable label for the warning kind.
    pub fn label(&self) -> &'static str {
        match self {
            WarningKind::MappingCountMismatch => "Mapping Count Mismatch",
            WarningKind::UnmappedIterations => "Unmapped Iterations",
            WarningKind::TotalVariableFallback => "Total Variable Fallback",
        }
    }
}

/// Severity level of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational only, may not require action.
    Info,
    /// Potential issue that should be reviewed.
    Warning,
}

/// Numbers backing a warning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Row, factor or species the warning is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<usize>,
}

impl Evidence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_counts(mut self, expected: usize, observed: usize) -> Self {
        self.expected = Some(expected);
        self.observed = Some(observed);
        self
    }
}

/// A recoverable condition attached to a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(rename = "type")]
    pub kind: WarningKind,
    pub severity: Severity,
    /// Run the warning belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run: Option<RunKind>,
    /// Table the warning belongs to, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableKind>,
    /// Human-readable description.
    pub message: String,
    pub evidence: Evidence,
    pub detected_at: DateTime<Utc>,
}

impl Warning {
    pub fn new(kind: WarningKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            run: None,
            table: None,
            message: message.into(),
            evidence: Evidence::new(),
            detected_at: Utc::now(),
        }
    }

    pub fn for_table(mut self, run: RunKind, table: TableKind) -> Self {
        self.run = Some(run);
        self.table = Some(table);
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence = evidence;
        self
    }

    /// Whether this warning was produced while ingesting `table` of `run`.
    pub fn concerns(&self, run: RunKind, table: TableKind) -> bool {
        self.run == Some(run) && self.table == Some(table)
    }
}
