//! Run variants and table kinds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Variant of the factor-analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunKind {
    /// Unconstrained result.
    Base,
    /// Result refined with user-supplied constraints.
    Constrained,
}

impl RunKind {
    pub const ALL: [RunKind; 2] = [RunKind::Base, RunKind::Constrained];

    pub fn as_str(&self) -> &'static str {
        match self {
            RunKind::Base => "base",
            RunKind::Constrained => "constrained",
        }
    }
}

impl fmt::Display for RunKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of table ingested for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Profiles,
    Contributions,
    UncertaintySummary,
    BootstrapProfiles,
    BootstrapMapping,
    DispSwaps,
}

impl TableKind {
    pub const ALL: [TableKind; 6] = [
        TableKind::Profiles,
        TableKind::Contributions,
        TableKind::UncertaintySummary,
        TableKind::BootstrapProfiles,
        TableKind::BootstrapMapping,
        TableKind::DispSwaps,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TableKind::Profiles => "profiles",
            TableKind::Contributions => "contributions",
            TableKind::UncertaintySummary => "uncertainty_summary",
            TableKind::BootstrapProfiles => "bootstrap_profiles",
            TableKind::BootstrapMapping => "bootstrap_mapping",
            TableKind::DispSwaps => "disp_swaps",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
