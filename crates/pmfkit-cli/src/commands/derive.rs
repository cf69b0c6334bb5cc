//! Derive command - compute a derived table and write it as CSV.

use std::fmt::Display;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

use colored::Colorize;
use pmfkit::derived::{seasonal_contribution, to_cubic_meter, to_relative_mass, total_specie_sum};
use pmfkit::{CanonicalDataset, LabeledTable, RunSelection};

use super::{format_warning, load_session};
use crate::cli::{Quantity, RunChoice};

/// Options of one `derive` invocation.
pub struct DeriveArgs {
    pub dir: PathBuf,
    pub site: String,
    pub quantity: Quantity,
    pub run: Option<RunChoice>,
    pub species: Option<String>,
    pub factors: Vec<String>,
    pub categories: bool,
    pub annual: bool,
    pub normalize: bool,
    pub output: Option<PathBuf>,
}

pub fn run(
    args: DeriveArgs,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dataset = load_session(&args.dir, &args.site, config.as_deref())?;
    if args.categories {
        dataset = dataset.with_source_categories()?;
    }

    if verbose {
        for warning in dataset.warnings() {
            eprintln!("{}", format_warning(warning));
        }
    }

    // Render fully before touching the output so a failure leaves no file.
    let mut rendered = Vec::new();
    let selection = write_quantity(&dataset, &args, &mut rendered)?;
    match &args.output {
        Some(path) => fs::write(path, &rendered)?,
        None => io::stdout().lock().write_all(&rendered)?,
    }

    if selection.fell_back() {
        eprintln!(
            "{} constrained run incomplete, computed from the {} run",
            "Note:".yellow(),
            selection.used
        );
    }
    if let Some(path) = &args.output {
        eprintln!(
            "{} {} ({} run) to {}",
            "Wrote".green().bold(),
            args.quantity,
            selection.used,
            path.display().to_string().cyan()
        );
    }

    Ok(())
}

fn write_quantity(
    dataset: &CanonicalDataset,
    args: &DeriveArgs,
    out: &mut impl Write,
) -> Result<RunSelection, Box<dyn std::error::Error>> {
    let run = args.run.map(|r| r.0);
    let factors = if args.factors.is_empty() {
        None
    } else {
        Some(args.factors.as_slice())
    };
    let species = args.species.as_deref();

    let selection = match args.quantity {
        Quantity::CubicMeter => {
            let result = to_cubic_meter(dataset, run, species, factors)?;
            write_table(&result.value, "date", out)?;
            result.run
        }
        Quantity::RelativeMass => {
            let result = to_relative_mass(dataset, run, factors)?;
            write_table(&result.value, "specie", out)?;
            result.run
        }
        Quantity::SpeciesSum => {
            let result = total_specie_sum(dataset, run, factors)?;
            write_table(&result.value, "specie", out)?;
            result.run
        }
        Quantity::Seasonal => {
            let result = seasonal_contribution(dataset, run, species, args.annual, args.normalize)?;
            let table = match factors {
                Some(selected) => {
                    let columns: Vec<usize> = dataset
                        .require_metadata()?
                        .select_factors(Some(selected))?
                        .iter()
                        .map(|f| {
                            result
                                .value
                                .column_position(f.as_str())
                                .ok_or_else(|| pmfkit::PmfError::UnknownFactor(f.clone()))
                        })
                        .collect::<Result<_, _>>()?;
                    result.value.select_columns(&columns)
                }
                None => result.value,
            };
            write_table(&table, "season", out)?;
            result.run
        }
    };

    Ok(selection)
}

/// Write a factor-column table as CSV. NaN cells are left empty.
fn write_table<R: Display>(
    table: &LabeledTable<R, String, f64>,
    index: &str,
    out: impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = Vec::with_capacity(table.column_count() + 1);
    header.push(index.to_string());
    header.extend(table.columns().iter().cloned());
    writer.write_record(&header)?;

    for (r, key) in table.rows().iter().enumerate() {
        let mut record = Vec::with_capacity(table.column_count() + 1);
        record.push(key.to_string());
        record.extend(table.row(r).iter().map(|v| {
            if v.is_nan() {
                String::new()
            } else {
                v.to_string()
            }
        }));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}
