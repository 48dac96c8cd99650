//! histmerge CLI
//!
//! Collects input files from a directory tree or a manifest, merges the
//! requested histograms across them and writes one output file.

mod cli;
mod error;
mod logging;
mod merge;

use clap::Parser;
use colored::Colorize;

use cli::Cli;
use error::Result;

fn main() {
    if let Err(e) = run() {
        tracing::error!("{}", e);
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    logging::init(cli.verbose)?;
    tracing::debug!("Verbose mode enabled");

    let config = cli.to_config()?;
    merge::run_merge(&config)
}
