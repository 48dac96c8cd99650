//! Filesystem side of histmerge
//!
//! Locates the input files for a merge run: path resolution with fallback
//! chains, recursive directory discovery, manifest discovery, and bounded
//! retries for transient I/O failures.

pub mod config;
pub mod discovery;
pub mod error;
pub mod io;
pub mod path;
pub mod resolver;

pub use config::ConfigStore;
pub use discovery::{
    DirectoryWalker, Discovery, InputSource, ManifestLine, SkipReason, SkippedEntry, SourceList,
    discover, discover_directory, discover_manifest, parse_manifest_line,
};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{ResolvedPath, strip_trailing_separators};
pub use resolver::{DirectoryVia, PathResolver, ResolvedVia};
