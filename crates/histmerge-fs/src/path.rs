//! Owned path values for discovered sources

use std::fs::File;
use std::path::{Path, PathBuf};

/// A path that pointed at something openable when it was resolved.
///
/// The check is best-effort: nothing stops the file from disappearing
/// afterwards, so consumers still handle open failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedPath {
    inner: PathBuf,
}

impl ResolvedPath {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { inner: path.into() }
    }

    /// Accept `path` if it is a readable regular file.
    pub fn file(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        is_readable_file(&path).then(|| Self::new(path))
    }

    /// Accept `path` if it is a directory.
    pub fn directory(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        path.is_dir().then(|| Self::new(path))
    }

    pub fn as_path(&self) -> &Path {
        &self.inner
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.inner
    }

    /// Whether the textual path contains `pattern` anywhere.
    ///
    /// This is a substring test over the whole path, not a suffix test, so
    /// `archive.root.bak` and `runs.root/notes.txt` both contain `.root`.
    pub fn contains(&self, pattern: &str) -> bool {
        self.inner.to_string_lossy().contains(pattern)
    }
}

impl AsRef<Path> for ResolvedPath {
    fn as_ref(&self) -> &Path {
        &self.inner
    }
}

impl std::fmt::Display for ResolvedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner.display())
    }
}

/// Check that a file exists by opening it for reading.
pub fn is_readable_file(path: &Path) -> bool {
    path.is_file() && File::open(path).is_ok()
}

/// Strip trailing path separators, keeping a lone root intact.
pub fn strip_trailing_separators(path: &str) -> &str {
    let trimmed = path.trim_end_matches(['/', '\\']);
    if trimmed.is_empty() && !path.is_empty() {
        &path[..1]
    } else {
        trimmed
    }
}
