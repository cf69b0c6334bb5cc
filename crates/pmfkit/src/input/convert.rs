//! Interpretation of raw tables as typed labeled tables.
//!
//! Conversion only checks shape and cell syntax. Vocabulary checks and
//! reordering belong to the consistency validator.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use super::source::RawTable;
use crate::error::{PmfError, Result};
use crate::table::{
    Axis, BootstrapFactor, BootstrapMapping, BootstrapProfileSet, ContributionMatrix, DispSwaps,
    FactorSpecies, IterationId, LabeledTable, MappingColumn, Method, ProfileMatrix, SpeciesFactor,
    UncertaintySummary,
};

/// Trailing integer of an iteration column label (`Boot12`, `12`).
static ITERATION_LABEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*$").unwrap());

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parse a timestamp label. Dates without time map to midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse an iteration column label.
pub fn parse_iteration(label: &str) -> Option<IterationId> {
    ITERATION_LABEL
        .captures(label)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .map(IterationId)
}

fn require_columns(raw: &RawTable, label_columns: usize) -> Result<()> {
    if raw.column_count() <= label_columns {
        return Err(PmfError::EmptyData(format!(
            "'{}' needs at least {} columns, has {}",
            raw.name,
            label_columns + 1,
            raw.column_count()
        )));
    }
    if raw.row_count() == 0 {
        return Err(PmfError::EmptyData(format!("'{}' has no data rows", raw.name)));
    }
    Ok(())
}

fn label_cell(raw: &RawTable, row: usize, col: usize) -> Result<String> {
    let value = raw.get(row, col).unwrap_or("").trim();
    if value.is_empty() {
        return Err(PmfError::parse(&raw.name, row, col, "empty label"));
    }
    Ok(value.to_string())
}

/// Numeric cell; `None` for null sentinels and a literal `NaN`.
///
/// Infinities are rejected: they cannot be stored in a saved dataset.
fn number_cell(raw: &RawTable, row: usize, col: usize) -> Result<Option<f64>> {
    let value = raw.get(row, col).unwrap_or("");
    if RawTable::is_null_value(value) {
        return Ok(None);
    }
    let number = value
        .trim()
        .parse::<f64>()
        .map_err(|_| PmfError::parse(&raw.name, row, col, format!("'{}' is not a number", value)))?;
    if number.is_nan() {
        Ok(None)
    } else if number.is_infinite() {
        Err(PmfError::parse(&raw.name, row, col, format!("'{}' is not finite", value.trim())))
    } else {
        Ok(Some(number))
    }
}

fn count_cell(raw: &RawTable, row: usize, col: usize) -> Result<u32> {
    let value = number_cell(raw, row, col)?.unwrap_or(0.0);
    if value < 0.0 || value.fract() != 0.0 || value > u32::MAX as f64 {
        return Err(PmfError::parse(
            &raw.name,
            row,
            col,
            format!("'{}' is not an iteration count", value),
        ));
    }
    Ok(value as u32)
}

/// Order of the two label columns of a multi-index table.
#[derive(Clone, Copy, PartialEq)]
enum LabelOrder {
    FactorFirst,
    SpeciesFirst,
}

fn label_order(raw: &RawTable, default: LabelOrder) -> LabelOrder {
    let first = raw.headers[0].to_ascii_lowercase();
    let second = raw.headers[1].to_ascii_lowercase();
    let is_species = |h: &str| h.starts_with("specie");
    let is_factor = |h: &str| h == "profile" || h == "factor";
    if is_species(&first) || is_factor(&second) {
        LabelOrder::SpeciesFirst
    } else if is_factor(&first) || is_species(&second) {
        LabelOrder::FactorFirst
    } else {
        default
    }
}

/// Profile table: species rows, factor columns.
///
/// Values below `floor` become zero.
pub fn profiles_from_raw(raw: &RawTable, floor: Option<f64>) -> Result<ProfileMatrix> {
    require_columns(raw, 1)?;
    let rows = (0..raw.row_count())
        .map(|r| label_cell(raw, r, 0))
        .collect::<Result<Vec<_>>>()?;
    let columns = raw.headers[1..].to_vec();

    LabeledTable::try_from_indices(rows, columns, |r, c| {
        let value = number_cell(raw, r, c + 1)?
            .ok_or_else(|| PmfError::parse(&raw.name, r, c + 1, "missing concentration"))?;
        Ok(match floor {
            Some(floor) if value < floor => 0.0,
            _ => value,
        })
    })
}

/// Contribution table: timestamp rows, factor columns.
///
/// Null cells and the `missing` sentinel become NaN.
pub fn contributions_from_raw(raw: &RawTable, missing: Option<f64>) -> Result<ContributionMatrix> {
    require_columns(raw, 1)?;
    let rows = (0..raw.row_count())
        .map(|r| {
            let label = label_cell(raw, r, 0)?;
            parse_timestamp(&label).ok_or_else(|| {
                PmfError::parse(&raw.name, r, 0, format!("'{}' is not a timestamp", label))
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let columns = raw.headers[1..].to_vec();

    LabeledTable::try_from_indices(rows, columns, |r, c| {
        Ok(match number_cell(raw, r, c + 1)? {
            Some(v) if Some(v) == missing => f64::NAN,
            Some(v) => v,
            None => f64::NAN,
        })
    })
}

/// Error-estimation summary: (factor, species) rows, method columns.
///
/// Columns are expanded to every [`Method`]; methods absent from the raw
/// table are `None` throughout.
pub fn uncertainty_from_raw(raw: &RawTable) -> Result<UncertaintySummary> {
    require_columns(raw, 2)?;
    let order = label_order(raw, LabelOrder::FactorFirst);

    let mut method_columns: HashMap<Method, usize> = HashMap::new();
    for (offset, header) in raw.headers[2..].iter().enumerate() {
        let col = offset + 2;
        let method = Method::from_label(header).ok_or_else(|| PmfError::UnknownLabel {
            label: header.clone(),
            axis: Axis::Method,
            table: raw.name.clone(),
        })?;
        if method_columns.insert(method, col).is_some() {
            return Err(PmfError::DuplicateLabel {
                label: header.clone(),
                axis: Axis::Method,
                table: raw.name.clone(),
            });
        }
    }

    let rows = (0..raw.row_count())
        .map(|r| {
            let a = label_cell(raw, r, 0)?;
            let b = label_cell(raw, r, 1)?;
            Ok(match order {
                LabelOrder::FactorFirst => FactorSpecies::new(a, b),
                LabelOrder::SpeciesFirst => FactorSpecies::new(b, a),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    LabeledTable::try_from_indices(rows, Method::ALL.to_vec(), |r, c| {
        match method_columns.get(&Method::ALL[c]) {
            Some(&col) => number_cell(raw, r, col),
            None => Ok(None),
        }
    })
}

/// Bootstrap profiles: (species, factor) rows, iteration columns.
pub fn bootstrap_profiles_from_raw(raw: &RawTable) -> Result<BootstrapProfileSet> {
    require_columns(raw, 2)?;
    let order = label_order(raw, LabelOrder::SpeciesFirst);

    let columns = raw.headers[2..]
        .iter()
        .map(|h| {
            parse_iteration(h).ok_or_else(|| PmfError::UnknownLabel {
                label: h.clone(),
                axis: Axis::Iteration,
                table: raw.name.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let rows = (0..raw.row_count())
        .map(|r| {
            let a = label_cell(raw, r, 0)?;
            let b = label_cell(raw, r, 1)?;
            Ok(match order {
                LabelOrder::SpeciesFirst => SpeciesFactor::new(a, b),
                LabelOrder::FactorFirst => SpeciesFactor::new(b, a),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    LabeledTable::try_from_indices(rows, columns, |r, c| {
        Ok(number_cell(raw, r, c + 2)?.unwrap_or(f64::NAN))
    })
}

/// Bootstrap mapping: bootstrap-factor rows, reference factor and `unmapped` columns.
///
/// Row labels must start with `prefix`; the remainder names the reference factor.
pub fn mapping_from_raw(raw: &RawTable, prefix: &str) -> Result<BootstrapMapping> {
    require_columns(raw, 1)?;

    let rows = (0..raw.row_count())
        .map(|r| {
            let label = label_cell(raw, r, 0)?;
            match label.strip_prefix(prefix) {
                Some(factor) if !factor.trim().is_empty() => Ok(BootstrapFactor {
                    factor: factor.trim().to_string(),
                    label,
                }),
                _ => Err(PmfError::UnknownLabel {
                    label,
                    axis: Axis::BootstrapFactor,
                    table: raw.name.clone(),
                }),
            }
        })
        .collect::<Result<Vec<_>>>()?;

    let columns = raw.headers[1..]
        .iter()
        .map(|h| {
            if h.eq_ignore_ascii_case("unmapped") {
                MappingColumn::Unmapped
            } else {
                MappingColumn::Factor(h.clone())
            }
        })
        .collect();

    LabeledTable::try_from_indices(rows, columns, |r, c| count_cell(raw, r, c + 1))
}

/// DISP swap counts: one data row, a label column, then factor columns.
pub fn disp_swaps_from_raw(raw: &RawTable) -> Result<DispSwaps> {
    require_columns(raw, 1)?;
    if raw.row_count() != 1 {
        return Err(PmfError::parse(
            &raw.name,
            raw.row_count(),
            0,
            "expected exactly one row of swap counts",
        ));
    }
    let columns = raw.headers[1..].to_vec();
    LabeledTable::try_from_indices(vec![()], columns, |r, c| count_cell(raw, r, c + 1))
}
