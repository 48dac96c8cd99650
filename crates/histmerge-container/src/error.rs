//! Error types for histmerge-container

use std::path::PathBuf;

/// Result type for container operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while reading, writing or merging containers
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed container at {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("Failed to serialize container for {path}: {message}")]
    Serialize { path: PathBuf, message: String },

    #[error("Histogram '{name}' has incompatible binning: {reason}")]
    IncompatibleBinning { name: String, reason: String },

    #[error("Invalid histogram '{name}': {reason}")]
    InvalidHistogram { name: String, reason: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// The underlying I/O error, if this error came from the filesystem.
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::Io { source, .. } => Some(source.kind()),
            _ => None,
        }
    }
}
