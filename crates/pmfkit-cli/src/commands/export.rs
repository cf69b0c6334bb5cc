//! Export command - save a validated session as JSON.

use std::path::PathBuf;

use colored::Colorize;
use pmfkit::dataset_path;

use super::load_session;

pub fn run(
    dir: PathBuf,
    site: String,
    output: Option<PathBuf>,
    categories: bool,
    config: Option<PathBuf>,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut dataset = load_session(&dir, &site, config.as_deref())?;
    if categories {
        dataset = dataset.with_source_categories()?;
    }

    let output_path = output.unwrap_or_else(|| dataset_path(&dir, &site));
    dataset.save(&output_path)?;

    println!(
        "{} {} to {}",
        "Exported".green().bold(),
        site.white().bold(),
        output_path.display().to_string().cyan()
    );
    if !dataset.warnings().is_empty() {
        println!(
            "  {} warnings saved with the dataset",
            dataset.warnings().len().to_string().yellow()
        );
    }

    Ok(())
}
