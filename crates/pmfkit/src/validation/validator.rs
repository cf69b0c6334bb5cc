//! Consistency validation of ingested tables against run metadata.

use serde::{Deserialize, Serialize};

use super::axis::AxisKey;
use crate::error::{PmfError, Result};
use crate::metadata::RunMetadata;
use crate::table::{Axis, LabeledTable};

/// Declared kinds of a table's two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableShape {
    pub rows: Axis,
    pub columns: Axis,
}

impl TableShape {
    pub const PROFILES: TableShape = TableShape {
        rows: Axis::Species,
        columns: Axis::Factor,
    };
    pub const CONTRIBUTIONS: TableShape = TableShape {
        rows: Axis::Timestamp,
        columns: Axis::Factor,
    };
    pub const UNCERTAINTY: TableShape = TableShape {
        rows: Axis::FactorSpecies,
        columns: Axis::Method,
    };
    pub const BOOTSTRAP_PROFILES: TableShape = TableShape {
        rows: Axis::SpeciesFactor,
        columns: Axis::Iteration,
    };
    pub const BOOTSTRAP_MAPPING: TableShape = TableShape {
        rows: Axis::BootstrapFactor,
        columns: Axis::Factor,
    };
    pub const DISP_SWAPS: TableShape = TableShape {
        rows: Axis::SwapCount,
        columns: Axis::Factor,
    };
}

/// Checks tables against one [`RunMetadata`] and puts them in canonical order.
///
/// Every label must belong to the vocabulary; unknown labels are errors,
/// never dropped. Axes are reordered to metadata order (not sorted by
/// name), so a canonical table passes through unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ConsistencyValidator<'a> {
    metadata: &'a RunMetadata,
}

impl<'a> ConsistencyValidator<'a> {
    pub fn new(metadata: &'a RunMetadata) -> Self {
        Self { metadata }
    }

    pub fn metadata(&self) -> &'a RunMetadata {
        self.metadata
    }

    /// Validate and reorder both axes of `table`.
    pub fn conform<R, C, V>(
        &self,
        table: &LabeledTable<R, C, V>,
        name: &str,
        shape: TableShape,
    ) -> Result<LabeledTable<R, C, V>>
    where
        R: AxisKey,
        C: AxisKey,
        V: Clone,
    {
        let row_order = self.canonical_order(table.rows(), shape.rows, name)?;
        let column_order = self.canonical_order(table.columns(), shape.columns, name)?;
        Ok(table.select(&row_order, &column_order))
    }

    /// Whether `table` is already in canonical order.
    pub fn is_canonical<R, C, V>(
        &self,
        table: &LabeledTable<R, C, V>,
        name: &str,
        shape: TableShape,
    ) -> Result<bool>
    where
        R: AxisKey,
        C: AxisKey,
    {
        let rows = self.canonical_order(table.rows(), shape.rows, name)?;
        let columns = self.canonical_order(table.columns(), shape.columns, name)?;
        Ok(is_identity(&rows) && is_identity(&columns))
    }

    /// Positions of `keys` in canonical order.
    fn canonical_order<K: AxisKey>(&self, keys: &[K], axis: Axis, name: &str) -> Result<Vec<usize>> {
        let mut ranked = Vec::with_capacity(keys.len());
        for (i, key) in keys.iter().enumerate() {
            let rank = key
                .rank(axis, self.metadata)
                .map_err(|unknown| PmfError::UnknownLabel {
                    label: unknown.label,
                    axis: unknown.axis,
                    table: name.to_string(),
                })?;
            ranked.push((rank, i));
        }
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        for pair in ranked.windows(2) {
            if pair[0].0 == pair[1].0 {
                return Err(PmfError::DuplicateLabel {
                    label: keys[pair[1].1].label(),
                    axis,
                    table: name.to_string(),
                });
            }
        }

        Ok(ranked.into_iter().map(|(_, i)| i).collect())
    }
}

fn is_identity(order: &[usize]) -> bool {
    order.iter().enumerate().all(|(i, &p)| i == p)
}
