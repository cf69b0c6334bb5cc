//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use pmfkit::RunKind;
use std::path::PathBuf;

/// pmfkit: canonical tables and derived quantities for PMF output
#[derive(Parser)]
#[command(name = "pmfkit")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Dataset configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a session and show its metadata, tables and warnings
    Inspect {
        /// Directory holding the exported tables
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Site name used as file prefix (e.g. "GRE")
        #[arg(short, long)]
        site: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute a derived table and write it as CSV
    Derive {
        /// Directory holding the exported tables
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Site name used as file prefix
        #[arg(short, long)]
        site: String,

        /// Quantity to compute (cubic-meter, relative-mass, species-sum, seasonal)
        #[arg(value_name = "QUANTITY")]
        quantity: Quantity,

        /// Run to compute from (default: constrained, falling back to base)
        #[arg(short, long)]
        run: Option<RunChoice>,

        /// Species for cubic-meter and seasonal (default: total variable)
        #[arg(long)]
        species: Option<String>,

        /// Restrict to these factors (repeatable)
        #[arg(short, long = "factor", value_name = "FACTOR")]
        factors: Vec<String>,

        /// Rename factors to their source category first
        #[arg(long)]
        categories: bool,

        /// Seasonal: append an annual row
        #[arg(long)]
        annual: bool,

        /// Seasonal: factor shares instead of mean concentrations
        #[arg(long)]
        normalize: bool,

        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save the validated session as a JSON dataset
    Export {
        /// Directory holding the exported tables
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Site name used as file prefix
        #[arg(short, long)]
        site: String,

        /// Output path (default: <DIR>/<SITE>.pmf.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rename factors to their source category first
        #[arg(long)]
        categories: bool,
    },
}

/// Derived quantity computed by `derive`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Quantity {
    CubicMeter,
    RelativeMass,
    SpeciesSum,
    Seasonal,
}

impl std::str::FromStr for Quantity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cubic-meter" => Ok(Quantity::CubicMeter),
            "relative-mass" => Ok(Quantity::RelativeMass),
            "species-sum" => Ok(Quantity::SpeciesSum),
            "seasonal" => Ok(Quantity::Seasonal),
            _ => Err(format!(
                "Unknown quantity: {}. Use cubic-meter, relative-mass, species-sum or seasonal.",
                s
            )),
        }
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Quantity::CubicMeter => write!(f, "cubic-meter"),
            Quantity::RelativeMass => write!(f, "relative-mass"),
            Quantity::SpeciesSum => write!(f, "species-sum"),
            Quantity::Seasonal => write!(f, "seasonal"),
        }
    }
}

/// Run named on the command line.
#[derive(Clone, Copy, Debug)]
pub struct RunChoice(pub RunKind);

impl std::str::FromStr for RunChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "base" => Ok(RunChoice(RunKind::Base)),
            "constrained" => Ok(RunChoice(RunKind::Constrained)),
            _ => Err(format!("Unknown run: {}. Use base or constrained.", s)),
        }
    }
}
