//! The merge command: run the pipeline and print a summary

use std::io::Write;

use colored::Colorize;
use histmerge_container::JsonStore;
use histmerge_core::{MergeConfig, MergeReport, RunContext, merge};
use histmerge_fs::{InputSource, PathResolver};

use crate::error::{CliError, Result};

/// Run a merge with the process environment and print the outcome to stdout.
pub fn run_merge(config: &MergeConfig) -> Result<()> {
    if let InputSource::Manifest(path) = &config.input {
        std::fs::File::open(path).map_err(|e| {
            CliError::user(format!("Error opening file {}: {}", path.display(), e))
        })?;
    }

    let mut ctx = RunContext::new();
    if let Some(deadline) = config.deadline {
        ctx = ctx.with_timeout(deadline);
    }

    let report = merge(config, &JsonStore::new(), &PathResolver::from_env(), &ctx)?;

    let stdout = std::io::stdout();
    print_summary(&mut stdout.lock(), &report)?;
    Ok(())
}

/// Human-readable summary of a finished run.
pub fn print_summary(out: &mut impl Write, report: &MergeReport) -> std::io::Result<()> {
    writeln!(
        out,
        "{} {} of {} files into {}",
        "Merged".green().bold(),
        report.merged.len(),
        report.sources.len(),
        report.output.display().to_string().cyan()
    )?;
    for contribution in &report.contributions {
        writeln!(
            out,
            "   {} ({} files)",
            contribution.name, contribution.sources
        )?;
    }
    if !report.warnings.is_empty() {
        writeln!(
            out,
            "{} {}",
            report.warnings.len(),
            if report.warnings.len() == 1 {
                "warning"
            } else {
                "warnings"
            }
            .yellow()
        )?;
    }
    Ok(())
}
