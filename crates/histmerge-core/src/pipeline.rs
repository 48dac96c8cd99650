//! End-to-end merge run: discovery, names, accumulation, output

use std::path::PathBuf;

use histmerge_container::ContainerStore;
use histmerge_fs::{
    DirectoryVia, InputSource, PathResolver, discover, strip_trailing_separators,
};

use crate::accumulate::{AccumulateOptions, accumulate};
use crate::config::{MergeConfig, NameSelection};
use crate::context::RunContext;
use crate::names::{NameSet, discover_names};
use crate::output::OutputWriter;
use crate::report::{MergeReport, Warning};
use crate::{Error, Result};

/// Run a complete merge as described by `config`.
///
/// Fatal conditions return an error and leave the destination untouched.
/// Everything else is collected as warnings in the returned report.
pub fn merge<S>(
    config: &MergeConfig,
    store: &S,
    resolver: &PathResolver,
    ctx: &RunContext,
) -> Result<MergeReport>
where
    S: ContainerStore + ?Sized,
{
    config.validate()?;
    let mut warnings = Vec::new();

    let input = resolve_input(&config.input, resolver)?;
    let discovery = discover(&input, &config.extension, resolver, config.robustness)?;
    warnings.extend(discovery.skipped.into_iter().map(Warning::EntrySkipped));
    let sources = discovery.sources;

    tracing::info!("The following files will be merged:");
    for source in &sources {
        tracing::info!("{}", source);
    }

    let names = match &config.names {
        NameSelection::All => {
            if config.verbose {
                tracing::info!("All histograms from the files will be read in and merged");
            }
            let first = sources.first().ok_or(Error::NoReadableSource { total: 0 })?;
            let discovered = discover_names(
                store,
                first.as_path(),
                &config.group,
                config.robustness,
                config.verbose,
            )?;
            tracing::debug!(group = %discovered.group, "Discovered histogram names");
            warnings.extend(discovered.warnings);
            discovered.names
        }
        NameSelection::Named(requested) => {
            let (names, duplicates) = NameSet::from_requested(requested.iter().cloned());
            for warning in duplicates {
                tracing::warn!("{}", warning);
                warnings.push(warning);
            }
            names
        }
    };

    tracing::info!(
        "The following {} histograms will be considered:",
        names.len()
    );
    for name in &names {
        tracing::info!("   {}", name);
    }

    let options = AccumulateOptions {
        group: config.group.clone(),
        missing_baseline: config.missing_baseline,
        robustness: config.robustness,
    };
    let (records, mut report) = accumulate(store, sources.as_slice(), names, options, ctx)?;

    OutputWriter::new(&config.output_group, config.robustness).write(
        store,
        &config.output,
        records,
    )?;

    warnings.append(&mut report.warnings);
    report.warnings = warnings;
    report.output = config.output.clone();
    Ok(report)
}

/// Resolve a directory input through the fallback chain; manifests pass through.
///
/// `~`, symlinks and `..` are expanded, but a reference naming a file is
/// rejected rather than widened to the directory holding it.
fn resolve_input(input: &InputSource, resolver: &PathResolver) -> Result<InputSource> {
    match input {
        InputSource::Manifest(path) => Ok(InputSource::Manifest(path.clone())),
        InputSource::Directory(path) => {
            let reference = path.to_string_lossy();
            let reference = strip_trailing_separators(&reference);
            let (resolved, via) = resolver.resolve_directory(reference).ok_or_else(|| {
                Error::DirectoryNotFound {
                    reference: reference.to_string(),
                }
            })?;
            if via == DirectoryVia::ContainingDirectory {
                return Err(Error::NotADirectory {
                    reference: reference.to_string(),
                });
            }
            if resolved.as_path() != path.as_path() {
                tracing::debug!(from = %path.display(), to = %resolved, "Resolved input directory");
            }
            Ok(InputSource::Directory(PathBuf::from(resolved.as_path())))
        }
    }
}
