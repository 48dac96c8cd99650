//! Error types for histmerge-fs

use std::path::PathBuf;

/// Result type for histmerge-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while locating input sources
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("The directory '{path}' could not be read: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory '{path}' doesn't contain any files")]
    EmptyDirectory { path: PathBuf },

    #[error("Directory '{path}' doesn't contain any {extension}-files")]
    NoMatchingSources { path: PathBuf, extension: String },

    #[error("Error opening file {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Manifest '{path}' doesn't list any usable {extension}-files")]
    EmptyManifest { path: PathBuf, extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
