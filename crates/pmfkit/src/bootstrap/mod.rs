//! Bootstrap reconciliation.
//!
//! Folds the per-iteration bootstrap profiles and the bootstrap-to-reference
//! factor mapping of one run into a [`BootstrapSet`]. Count drift between
//! the two is recorded as a warning rather than rejected.

mod reconcile;
mod set;

pub use reconcile::{Reconciliation, reconcile};
pub use set::{BootstrapSet, IterationStatus};

use serde::{Deserialize, Serialize};

/// Bootstrap reconciliation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Prefix identifying bootstrap-factor rows of the mapping table.
    pub factor_prefix: String,
    /// Total-variable concentration (ug/m3) above which an iteration is
    /// considered not converged.
    pub non_convergence_threshold: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            factor_prefix: "BF-".to_string(),
            non_convergence_threshold: 100.0,
        }
    }
}
