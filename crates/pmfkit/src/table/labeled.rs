//! Generic two-axis table keyed by row and column labels.

use serde::{Deserialize, Serialize};

use crate::error::{PmfError, Result};

/// A dense 2-D table with typed row and column keys.
///
/// Values are stored row-major. The key types carry the axis shape: a
/// profile matrix is `LabeledTable<String, String>` (species x factor),
/// a contribution matrix is keyed by timestamps on its rows, and composite
/// keys such as [`SpeciesFactor`](super::SpeciesFactor) cover the
/// multi-index tables produced by the bootstrap and error-estimation runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "TableParts<R, C, V>",
    bound(deserialize = "R: Deserialize<'de>, C: Deserialize<'de>, V: Deserialize<'de>")
)]
pub struct LabeledTable<R, C, V = f64> {
    rows: Vec<R>,
    columns: Vec<C>,
    values: Vec<V>,
}

/// Serialized fields of a table, checked by [`LabeledTable::new`] on load.
#[derive(Deserialize)]
struct TableParts<R, C, V> {
    rows: Vec<R>,
    columns: Vec<C>,
    values: Vec<V>,
}

impl<R, C, V> TryFrom<TableParts<R, C, V>> for LabeledTable<R, C, V> {
    type Error = PmfError;

    fn try_from(parts: TableParts<R, C, V>) -> Result<Self> {
        Self::new(parts.rows, parts.columns, parts.values)
    }
}

impl<R, C, V> LabeledTable<R, C, V> {
    /// Create a table from row-major values.
    pub fn new(rows: Vec<R>, columns: Vec<C>, values: Vec<V>) -> Result<Self> {
        if values.len() != rows.len() * columns.len() {
            return Err(PmfError::EmptyData(format!(
                "expected {} x {} = {} values, got {}",
                rows.len(),
                columns.len(),
                rows.len() * columns.len(),
                values.len()
            )));
        }
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    /// Build a table by evaluating `f` for every (row, column) pair.
    pub fn from_fn(rows: Vec<R>, columns: Vec<C>, mut f: impl FnMut(&R, &C) -> V) -> Self {
        let mut values = Vec::with_capacity(rows.len() * columns.len());
        for r in &rows {
            for c in &columns {
                values.push(f(r, c));
            }
        }
        Self {
            rows,
            columns,
            values,
        }
    }

    /// Build a table by evaluating `f` for every (row index, column index) pair.
    pub fn try_from_indices<E>(
        rows: Vec<R>,
        columns: Vec<C>,
        mut f: impl FnMut(usize, usize) -> std::result::Result<V, E>,
    ) -> std::result::Result<Self, E> {
        let mut values = Vec::with_capacity(rows.len() * columns.len());
        for i in 0..rows.len() {
            for j in 0..columns.len() {
                values.push(f(i, j)?);
            }
        }
        Ok(Self {
            rows,
            columns,
            values,
        })
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn columns(&self) -> &[C] {
        &self.columns
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    /// Get a cell by position.
    pub fn get(&self, row: usize, column: usize) -> Option<&V> {
        if row >= self.rows.len() || column >= self.columns.len() {
            return None;
        }
        self.values.get(row * self.columns.len() + column)
    }

    /// All values of one row, in column order.
    pub fn row(&self, row: usize) -> &[V] {
        let width = self.columns.len();
        &self.values[row * width..(row + 1) * width]
    }

    /// All values of one column, in row order.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &V> {
        let width = self.columns.len();
        self.values.iter().skip(column).step_by(width.max(1))
    }

    /// Position of a row key.
    pub fn row_position<Q>(&self, key: &Q) -> Option<usize>
    where
        R: PartialEq<Q>,
        Q: ?Sized,
    {
        self.rows.iter().position(|r| r == key)
    }

    /// Position of a column key.
    pub fn column_position<Q>(&self, key: &Q) -> Option<usize>
    where
        C: PartialEq<Q>,
        Q: ?Sized,
    {
        self.columns.iter().position(|c| c == key)
    }

    /// Look up a cell by its keys.
    pub fn value<Q1, Q2>(&self, row: &Q1, column: &Q2) -> Option<&V>
    where
        R: PartialEq<Q1>,
        C: PartialEq<Q2>,
        Q1: ?Sized,
        Q2: ?Sized,
    {
        let r = self.row_position(row)?;
        let c = self.column_position(column)?;
        self.get(r, c)
    }

    /// Apply `f` to every value.
    pub fn map_values<W>(&self, f: impl FnMut(&V) -> W) -> LabeledTable<R, C, W>
    where
        R: Clone,
        C: Clone,
    {
        LabeledTable {
            rows: self.rows.clone(),
            columns: self.columns.clone(),
            values: self.values.iter().map(f).collect(),
        }
    }

    /// Replace the row keys, keeping values in place.
    pub fn relabel_rows<S>(self, f: impl FnMut(R) -> S) -> LabeledTable<S, C, V> {
        LabeledTable {
            rows: self.rows.into_iter().map(f).collect(),
            columns: self.columns,
            values: self.values,
        }
    }

    /// Replace the column keys, keeping values in place.
    pub fn relabel_columns<D>(self, f: impl FnMut(C) -> D) -> LabeledTable<R, D, V> {
        LabeledTable {
            rows: self.rows,
            columns: self.columns.into_iter().map(f).collect(),
            values: self.values,
        }
    }

    /// Split the table back into its parts.
    pub fn into_parts(self) -> (Vec<R>, Vec<C>, Vec<V>) {
        (self.rows, self.columns, self.values)
    }
}

impl<R: Clone, C: Clone, V: Clone> LabeledTable<R, C, V> {
    /// Reorder (or subset) rows and columns by position.
    ///
    /// Every index must be in bounds.
    pub fn select(&self, row_order: &[usize], column_order: &[usize]) -> Self {
        let width = self.columns.len();
        let mut values = Vec::with_capacity(row_order.len() * column_order.len());
        for &r in row_order {
            for &c in column_order {
                values.push(self.values[r * width + c].clone());
            }
        }
        Self {
            rows: row_order.iter().map(|&r| self.rows[r].clone()).collect(),
            columns: column_order.iter().map(|&c| self.columns[c].clone()).collect(),
            values,
        }
    }

    /// Subset columns, keeping every row.
    pub fn select_columns(&self, column_order: &[usize]) -> Self {
        let all_rows: Vec<usize> = (0..self.rows.len()).collect();
        self.select(&all_rows, column_order)
    }

    /// Subset rows, keeping every column.
    pub fn select_rows(&self, row_order: &[usize]) -> Self {
        let all_columns: Vec<usize> = (0..self.columns.len()).collect();
        self.select(row_order, &all_columns)
    }

    /// Append a row, replacing an existing row with the same key.
    pub fn upsert_row(&mut self, key: R, values: Vec<V>) -> Result<()>
    where
        R: PartialEq,
    {
        if values.len() != self.columns.len() {
            return Err(PmfError::EmptyData(format!(
                "row has {} values, table has {} columns",
                values.len(),
                self.columns.len()
            )));
        }
        let width = self.columns.len();
        match self.rows.iter().position(|r| *r == key) {
            Some(pos) => {
                self.values.splice(pos * width..(pos + 1) * width, values);
            }
            None => {
                self.rows.push(key);
                self.values.extend(values);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LabeledTable<String, String> {
        LabeledTable::new(
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into(), "z".into()],
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let result = LabeledTable::<String, String>::new(
            vec!["a".into()],
            vec!["x".into(), "y".into()],
            vec![1.0],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let json = serde_json::to_string(&sample()).unwrap();
        let back: LabeledTable<String, String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());

        let short = r#"{"rows":["a"],"columns":["x","y"],"values":[1.0]}"#;
        let err = serde_json::from_str::<LabeledTable<String, String>>(short).unwrap_err();
        assert!(err.to_string().contains("expected 1 x 2 = 2 values, got 1"));
    }

    #[test]
    fn test_lookup_by_key() {
        let table = sample();
        assert_eq!(table.value("b", "y"), Some(&5.0));
        assert_eq!(table.value("c", "y"), None);
        assert_eq!(table.row(0), &[1.0, 2.0, 3.0]);
        let col: Vec<f64> = table.column_values(2).copied().collect();
        assert_eq!(col, vec![3.0, 6.0]);
    }

    #[test]
    fn test_select_reorders() {
        let table = sample();
        let reordered = table.select(&[1, 0], &[2, 0]);
        assert_eq!(reordered.rows(), &["b".to_string(), "a".to_string()]);
        assert_eq!(reordered.columns(), &["z".to_string(), "x".to_string()]);
        assert_eq!(reordered.values(), &[6.0, 4.0, 3.0, 1.0]);
    }

    #[test]
    fn test_upsert_row() {
        let mut table = sample();
        table.upsert_row("a".into(), vec![0.0, 0.0, 0.0]).unwrap();
        table.upsert_row("c".into(), vec![7.0, 8.0, 9.0]).unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.row(0), &[0.0, 0.0, 0.0]);
        assert_eq!(table.value("c", "z"), Some(&9.0));
        assert!(table.upsert_row("d".into(), vec![1.0]).is_err());
    }
}
