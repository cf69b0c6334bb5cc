//! Axis key types shared by the canonical tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of label found on a table axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Factor,
    Species,
    Timestamp,
    Iteration,
    Method,
    BootstrapFactor,
    /// Composite (factor, species) rows of the error-estimation summary.
    FactorSpecies,
    /// Composite (species, factor) rows of the bootstrap profiles.
    SpeciesFactor,
    /// The single row of a DISP swap table.
    SwapCount,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Axis::Factor => "factor",
            Axis::Species => "species",
            Axis::Timestamp => "timestamp",
            Axis::Iteration => "iteration",
            Axis::Method => "method",
            Axis::BootstrapFactor => "bootstrap factor",
            Axis::FactorSpecies => "factor/species",
            Axis::SpeciesFactor => "species/factor",
            Axis::SwapCount => "swap count",
        };
        f.write_str(label)
    }
}

/// Row key of the error-estimation summary: (factor, species).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FactorSpecies {
    pub factor: String,
    pub species: String,
}

impl FactorSpecies {
    pub fn new(factor: impl Into<String>, species: impl Into<String>) -> Self {
        Self {
            factor: factor.into(),
            species: species.into(),
        }
    }
}

/// Row key of the bootstrap profile set: (species, factor).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpeciesFactor {
    pub species: String,
    pub factor: String,
}

impl SpeciesFactor {
    pub fn new(species: impl Into<String>, factor: impl Into<String>) -> Self {
        Self {
            species: species.into(),
            factor: factor.into(),
        }
    }
}

/// Identifier of one bootstrap iteration. Sequences may have gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IterationId(pub u32);

impl fmt::Display for IterationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Boot{}", self.0)
    }
}

/// Uncertainty estimation method of the error-estimation summary.
///
/// Variant order is the canonical column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Value of the base (or constrained) run itself.
    Reference,
    Bs5th,
    Bs25th,
    BsMedian,
    Bs75th,
    Bs95th,
    BsDisp5th,
    BsDispAverage,
    BsDisp95th,
    DispMin,
    DispAverage,
    DispMax,
}

impl Method {
    pub const ALL: [Method; 12] = [
        Method::Reference,
        Method::Bs5th,
        Method::Bs25th,
        Method::BsMedian,
        Method::Bs75th,
        Method::Bs95th,
        Method::BsDisp5th,
        Method::BsDispAverage,
        Method::BsDisp95th,
        Method::DispMin,
        Method::DispAverage,
        Method::DispMax,
    ];

    /// Parse a column label as written by the external tool.
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase();
        let method = match normalized.as_str() {
            "base run" | "constrained base run" | "constrained run" | "reference" => {
                Method::Reference
            }
            "bs 5th" => Method::Bs5th,
            "bs 25th" => Method::Bs25th,
            "bs median" => Method::BsMedian,
            "bs 75th" => Method::Bs75th,
            "bs 95th" => Method::Bs95th,
            "bs-disp 5th" => Method::BsDisp5th,
            "bs-disp average" => Method::BsDispAverage,
            "bs-disp 95th" => Method::BsDisp95th,
            "disp min" => Method::DispMin,
            "disp average" => Method::DispAverage,
            "disp max" => Method::DispMax,
            _ => return None,
        };
        Some(method)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Method::Reference => "Reference",
            Method::Bs5th => "BS 5th",
            Method::Bs25th => "BS 25th",
            Method::BsMedian => "BS median",
            Method::Bs75th => "BS 75th",
            Method::Bs95th => "BS 95th",
            Method::BsDisp5th => "BS-DISP 5th",
            Method::BsDispAverage => "BS-DISP average",
            Method::BsDisp95th => "BS-DISP 95th",
            Method::DispMin => "DISP Min",
            Method::DispAverage => "DISP average",
            Method::DispMax => "DISP Max",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Column key of the bootstrap mapping table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingColumn {
    Factor(String),
    Unmapped,
}

impl fmt::Display for MappingColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MappingColumn::Factor(name) => f.write_str(name),
            MappingColumn::Unmapped => f.write_str("unmapped"),
        }
    }
}

/// Row key of the bootstrap mapping table.
///
/// `label` is the row label as written (e.g. `BF-Dust`), `factor` the
/// reference factor it stands for.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BootstrapFactor {
    pub label: String,
    pub factor: String,
}
