//! Error types for histmerge-core
//!
//! Every variant here is fatal to a merge run. Conditions that only warrant a
//! warning are reported through [`crate::Warning`] instead.

use std::path::PathBuf;

/// Result type for histmerge-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a merge run
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The merge configuration is inconsistent
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The input directory reference did not resolve to a directory
    #[error("Unable to locate directory '{reference}'")]
    DirectoryNotFound { reference: String },

    /// The input directory reference names a file
    #[error("Error opening the directory '{reference}': not a directory")]
    NotADirectory { reference: String },

    /// The source used for name discovery could not be opened
    #[error("Unable to open file '{path}': {source}")]
    SourceUnopenable {
        path: PathBuf,
        #[source]
        source: histmerge_container::Error,
    },

    /// The source used for name discovery has no top-level group
    #[error("Found no directory in file '{path}'")]
    NoGroups { path: PathBuf },

    /// An explicitly selected group does not exist
    #[error("Group '{group}' not found in file '{path}'")]
    GroupNotFound { path: PathBuf, group: String },

    /// No record names were requested or discovered
    #[error("No histograms to merge in '{path}'")]
    EmptyNameSet { path: PathBuf },

    /// A requested record is absent from the baseline source
    #[error("Histogram '{name}' not found in baseline file '{path}'")]
    MissingBaselineRecord { name: String, path: PathBuf },

    /// The baseline source contained none of the requested records
    #[error("None of the requested histograms were found in baseline file '{path}'")]
    NoRecordsEstablished { path: PathBuf },

    /// Every source failed to open
    #[error("None of the {total} input files could be read")]
    NoReadableSource { total: usize },

    /// The run was cancelled between two sources
    #[error("Merge cancelled after {processed} of {total} files")]
    Cancelled { processed: usize, total: usize },

    /// The run deadline passed between two sources
    #[error("Merge deadline exceeded after {processed} of {total} files")]
    DeadlineExceeded { processed: usize, total: usize },

    /// The output container could not be written
    #[error("Unable to write output file '{path}': {source}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: histmerge_container::Error,
    },

    /// Filesystem error from histmerge-fs
    #[error(transparent)]
    Fs(#[from] histmerge_fs::Error),

    /// Container error from histmerge-container
    #[error(transparent)]
    Container(#[from] histmerge_container::Error),
}

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
