//! pmfkit CLI - inspect PMF output and compute derived tables.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::derive::DeriveArgs;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default = if verbose { "pmfkit=debug" } else { "pmfkit=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Inspect { dir, site, json } => {
            commands::inspect::run(dir, site, json, cli.config, cli.verbose)
        }

        Commands::Derive {
            dir,
            site,
            quantity,
            run,
            species,
            factors,
            categories,
            annual,
            normalize,
            output,
        } => commands::derive::run(
            DeriveArgs {
                dir,
                site,
                quantity,
                run,
                species,
                factors,
                categories,
                annual,
                normalize,
                output,
            },
            cli.config,
            cli.verbose,
        ),

        Commands::Export {
            dir,
            site,
            output,
            categories,
        } => commands::export::run(dir, site, output, categories, cli.config, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
