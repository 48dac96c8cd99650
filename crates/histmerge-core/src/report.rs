//! Warnings and the end-of-run summary

use std::path::PathBuf;

use histmerge_fs::SkippedEntry;

/// A non-fatal problem. The run continues after logging it.
#[derive(Debug, Clone, PartialEq)]
pub enum Warning {
    /// A discovery entry that was left out
    EntrySkipped(SkippedEntry),
    /// A source that could not be opened during accumulation
    SourceUnreadable { path: PathBuf, reason: String },
    /// A source without a usable group
    SourceWithoutGroup { path: PathBuf, group: Option<String> },
    /// More than one top-level group; only `used` is read
    MultipleGroups {
        path: PathBuf,
        count: usize,
        used: String,
    },
    /// A requested name absent from the baseline source (skip policy)
    BaselineRecordMissing { name: String, path: PathBuf },
    /// A record absent from a non-baseline source
    RecordMissing { name: String, path: PathBuf },
    /// A record the merge primitive refused to add
    RecordIncompatible {
        name: String,
        path: PathBuf,
        reason: String,
    },
    /// A name requested more than once
    DuplicateName { name: String },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EntrySkipped(entry) => write!(f, "{}", entry),
            Self::SourceUnreadable { path, reason } => write!(
                f,
                "Unable to open file '{}', it will be skipped: {}",
                path.display(),
                reason
            ),
            Self::SourceWithoutGroup { path, group: None } => write!(
                f,
                "Found no directory in file '{}', skip this file",
                path.display()
            ),
            Self::SourceWithoutGroup {
                path,
                group: Some(group),
            } => write!(
                f,
                "Group '{}' not found in file '{}', skip this file",
                group,
                path.display()
            ),
            Self::MultipleGroups { path, count, used } => write!(
                f,
                "Found {} directories in file '{}', will only use '{}'",
                count,
                path.display(),
                used
            ),
            Self::BaselineRecordMissing { name, path } => write!(
                f,
                "Histogram '{}' not found in baseline file '{}', it will not be merged",
                name,
                path.display()
            ),
            Self::RecordMissing { name, path } => write!(
                f,
                "Histogram '{}' not found in file '{}', skip it",
                name,
                path.display()
            ),
            Self::RecordIncompatible { name, path, reason } => write!(
                f,
                "Histogram '{}' in file '{}' cannot be added, skip it: {}",
                name,
                path.display(),
                reason
            ),
            Self::DuplicateName { name } => {
                write!(f, "Histogram '{}' requested more than once", name)
            }
        }
    }
}

/// How often a record received data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub name: String,
    /// Number of sources whose record was folded in, baseline included
    pub sources: usize,
}

/// Summary of a finished run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Sources handed to the accumulator, in order
    pub sources: Vec<PathBuf>,
    /// Sources that contributed (opened and had a usable group)
    pub merged: Vec<PathBuf>,
    /// Per-record contribution counts, in output order
    pub contributions: Vec<Contribution>,
    pub warnings: Vec<Warning>,
    pub output: PathBuf,
}

impl MergeReport {
    /// Record a warning and log it.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning);
        self.warnings.push(warning);
    }

    pub fn skipped_sources(&self) -> usize {
        self.sources.len().saturating_sub(self.merged.len())
    }

    pub fn record_names(&self) -> Vec<&str> {
        self.contributions.iter().map(|c| c.name.as_str()).collect()
    }
}
