//! CLI command implementations.

pub mod derive;
pub mod export;
pub mod inspect;

use std::path::Path;

use colored::Colorize;
use pmfkit::{CanonicalDataset, DatasetConfig, DirectoryProvider, Parser, Severity, Warning};
use tracing::debug;

/// Load every table of `site` found in `dir`.
pub fn load_session(
    dir: &Path,
    site: &str,
    config: Option<&Path>,
) -> Result<CanonicalDataset, Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("Directory not found: {}", dir.display()).into());
    }

    let config = match config {
        Some(path) => {
            debug!(path = %path.display(), "loading dataset configuration");
            DatasetConfig::load(path)?
        }
        None => DatasetConfig::default(),
    };

    let provider = DirectoryProvider::new(dir, site)
        .with_parser(Parser::with_config(config.parser.clone()));
    Ok(CanonicalDataset::load_from(&provider, config)?)
}

/// One warning line, colored by severity.
pub fn format_warning(warning: &Warning) -> String {
    let tag = match warning.severity {
        Severity::Warning => warning.kind.label().yellow(),
        Severity::Info => warning.kind.label().blue(),
    };
    let scope = match (warning.run, warning.table) {
        (Some(run), Some(table)) => format!("[{} {}] ", run, table),
        _ => String::new(),
    };
    format!("  {} {}{}", tag, scope.dimmed(), warning.message)
}
