//! Inspect command - show metadata, tables and warnings of a session.

use std::path::PathBuf;

use colored::Colorize;
use pmfkit::metadata::TotalVariableSource;
use pmfkit::{RunKind, TableKind};

use super::{format_warning, load_session};

pub fn run(
    dir: PathBuf,
    site: String,
    json_output: bool,
    config: Option<PathBuf>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = load_session(&dir, &site, config.as_deref())?;
    let metadata = dataset.require_metadata()?;

    if json_output {
        let runs: serde_json::Map<String, serde_json::Value> = RunKind::ALL
            .iter()
            .map(|run| {
                let present: Vec<&str> = dataset
                    .run(*run)
                    .present()
                    .iter()
                    .map(|k| k.as_str())
                    .collect();
                (run.to_string(), serde_json::json!(present))
            })
            .collect();

        let report = serde_json::json!({
            "site": site,
            "metadata": metadata,
            "runs": runs,
            "warnings": dataset.warnings(),
            "sources": dataset.sources(),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} {}",
        "Session".cyan().bold(),
        site.white().bold(),
        format!("({})", dir.display()).dimmed()
    );
    println!();

    let source = match metadata.total_variable_source() {
        TotalVariableSource::Override => "override".to_string(),
        TotalVariableSource::Priority => "priority list".to_string(),
        TotalVariableSource::Fallback { strategy } => format!("fallback: {}", strategy),
    };
    println!("{}", "Metadata:".yellow().bold());
    println!(
        "  Total variable: {} ({})",
        metadata.total_variable().white().bold(),
        source
    );
    println!(
        "  Factors ({}):  {}",
        metadata.factors().len(),
        metadata.factors().join(", ")
    );
    if verbose {
        println!(
            "  Species ({}):  {}",
            metadata.species().len(),
            metadata.species().join(", ")
        );
    } else {
        println!("  Species:      {}", metadata.species().len());
    }
    println!();

    println!("{}", "Tables:".yellow().bold());
    for run in RunKind::ALL {
        let tables = dataset.run(run);
        let cells: Vec<String> = TableKind::ALL
            .iter()
            .map(|kind| {
                if tables.has(*kind) {
                    kind.as_str().green().to_string()
                } else {
                    kind.as_str().dimmed().to_string()
                }
            })
            .collect();
        println!("  {:12} {}", run.to_string(), cells.join("  "));

        if let Some(set) = dataset.bootstrap(run) {
            let unmapped = set.unmapped().count();
            println!(
                "  {:12} {} bootstrap iterations, {} unmapped",
                "",
                set.iteration_count(),
                if unmapped > 0 {
                    unmapped.to_string().yellow()
                } else {
                    unmapped.to_string().white()
                }
            );
        }
    }
    println!();

    if dataset.warnings().is_empty() {
        println!("{} No warnings", "✓".green().bold());
    } else {
        println!(
            "{} ({})",
            "Warnings:".yellow().bold(),
            dataset.warnings().len()
        );
        for warning in dataset.warnings() {
            println!("{}", format_warning(warning));
        }
    }

    if verbose && !dataset.sources().is_empty() {
        println!();
        println!("{}", "Sources:".yellow().bold());
        for source in dataset.sources() {
            println!(
                "  {:12} {:20} {} {}",
                source.run.to_string(),
                source.table.as_str(),
                source.source.file,
                source.source.hash.dimmed()
            );
        }
    }

    Ok(())
}
