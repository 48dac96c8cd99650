//! Source discovery: recursive directory scan or manifest file
//!
//! Both modes produce a [`SourceList`] whose order is significant: the first
//! entry seeds the accumulated records.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::io::{self, RobustnessConfig};
use crate::path::ResolvedPath;
use crate::resolver::{PathResolver, ResolvedVia};
use crate::{Error, Result};

/// Where the list of sources comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Text file listing one source per line
    Manifest(PathBuf),
    /// Directory scanned recursively
    Directory(PathBuf),
}

/// Ordered input files. Duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceList {
    paths: Vec<ResolvedPath>,
}

impl SourceList {
    pub fn new(paths: Vec<ResolvedPath>) -> Self {
        Self { paths }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn first(&self) -> Option<&ResolvedPath> {
        self.paths.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResolvedPath> {
        self.paths.iter()
    }

    pub fn as_slice(&self) -> &[ResolvedPath] {
        &self.paths
    }
}

impl FromIterator<ResolvedPath> for SourceList {
    fn from_iter<I: IntoIterator<Item = ResolvedPath>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a SourceList {
    type Item = &'a ResolvedPath;
    type IntoIter = std::slice::Iter<'a, ResolvedPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Why an entry was left out of the source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A manifest line that did not resolve to a readable file
    NotFound,
    /// A directory entry that could not be read during the walk
    Unreadable(String),
}

/// An entry reported as a warning and left out of the source list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// 1-based manifest line, if the entry came from a manifest
    pub line: Option<usize>,
    pub reference: String,
    pub reason: SkipReason,
}

impl std::fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.reason, self.line) {
            (SkipReason::NotFound, Some(line)) => write!(
                f,
                "Couldn't find file '{}' (line {}), skip it",
                self.reference, line
            ),
            (SkipReason::NotFound, None) => {
                write!(f, "Couldn't find file '{}', skip it", self.reference)
            }
            (SkipReason::Unreadable(message), _) => {
                write!(f, "Couldn't read '{}': {}", self.reference, message)
            }
        }
    }
}

/// The outcome of discovery.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub sources: SourceList,
    pub skipped: Vec<SkippedEntry>,
}

/// Lazily walks a directory tree and yields every regular file.
///
/// The sequence is finite and cannot be restarted. A subdirectory that
/// cannot be read yields one `Err` item and the walk moves on. Entries are
/// visited in file-name order within each directory, so repeated runs over
/// the same tree see the same order.
pub struct DirectoryWalker {
    inner: walkdir::IntoIter,
}

impl DirectoryWalker {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            inner: WalkDir::new(root)
                .follow_links(true)
                .sort_by_file_name()
                .into_iter(),
        }
    }
}

impl Iterator for DirectoryWalker {
    type Item = std::result::Result<PathBuf, SkippedEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.inner.next()? {
                Ok(entry) if entry.file_type().is_file() => {
                    return Some(Ok(entry.into_path()));
                }
                Ok(_) => continue,
                Err(e) => {
                    let reference = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default();
                    return Some(Err(SkippedEntry {
                        line: None,
                        reference,
                        reason: SkipReason::Unreadable(e.to_string()),
                    }));
                }
            }
        }
    }
}

/// Run discovery for the given input.
pub fn discover(
    input: &InputSource,
    extension: &str,
    resolver: &PathResolver,
    robustness: RobustnessConfig,
) -> Result<Discovery> {
    match input {
        InputSource::Directory(root) => discover_directory(root, extension),
        InputSource::Manifest(path) => discover_manifest(path, extension, resolver, robustness),
    }
}

/// Collect every regular file under `root` whose path contains `extension`.
///
/// An unreadable root, a tree without files, or a tree without matching
/// files is an error. Unreadable subdirectories are reported in
/// [`Discovery::skipped`].
pub fn discover_directory(root: &Path, extension: &str) -> Result<Discovery> {
    fs::read_dir(root).map_err(|e| Error::DirectoryUnreadable {
        path: root.to_path_buf(),
        source: e,
    })?;

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for item in DirectoryWalker::new(root) {
        match item {
            Ok(path) => files.push(ResolvedPath::new(path)),
            Err(entry) => {
                tracing::warn!("{}", entry);
                skipped.push(entry);
            }
        }
    }

    if files.is_empty() {
        return Err(Error::EmptyDirectory {
            path: root.to_path_buf(),
        });
    }
    let total = files.len();

    let sources: SourceList = files.into_iter().filter(|p| p.contains(extension)).collect();
    if sources.is_empty() {
        return Err(Error::NoMatchingSources {
            path: root.to_path_buf(),
            extension: extension.to_string(),
        });
    }

    tracing::debug!(
        root = %root.display(),
        total,
        matching = sources.len(),
        "Scanned directory"
    );
    Ok(Discovery { sources, skipped })
}

/// A manifest line after trimming, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestLine<'a> {
    /// Blank line or `#` comment
    Ignored,
    /// A path that does not contain the extension
    Filtered(&'a str),
    /// A path to resolve
    Entry(&'a str),
}

/// Classify one raw manifest line.
pub fn parse_manifest_line<'a>(raw: &'a str, extension: &str) -> ManifestLine<'a> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        ManifestLine::Ignored
    } else if !line.contains(extension) {
        ManifestLine::Filtered(line)
    } else {
        ManifestLine::Entry(line)
    }
}

/// Read a manifest and resolve its entries in line order.
///
/// Lines that resolve under no fallback are reported in
/// [`Discovery::skipped`] and do not abort discovery. A manifest that yields
/// no sources at all is an error.
pub fn discover_manifest(
    manifest: &Path,
    extension: &str,
    resolver: &PathResolver,
    robustness: RobustnessConfig,
) -> Result<Discovery> {
    let content = io::read_text(manifest, robustness).map_err(|e| match e {
        Error::Io { path, source } => Error::ManifestUnreadable { path, source },
        other => other,
    })?;

    let mut discovery = Discovery::default();
    let mut paths = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        match parse_manifest_line(raw, extension) {
            ManifestLine::Ignored => {}
            ManifestLine::Filtered(line) => {
                tracing::debug!(line = line_no, entry = line, "Skipping entry without extension");
            }
            ManifestLine::Entry(line) => match resolver.resolve_file(line) {
                Some((path, via)) => {
                    if via != ResolvedVia::Literal {
                        tracing::debug!(entry = line, resolved = %path, ?via, "Resolved manifest entry");
                    }
                    paths.push(path);
                }
                None => {
                    let entry = SkippedEntry {
                        line: Some(line_no),
                        reference: line.to_string(),
                        reason: SkipReason::NotFound,
                    };
                    tracing::warn!("{}", entry);
                    discovery.skipped.push(entry);
                }
            },
        }
    }

    if paths.is_empty() {
        return Err(Error::EmptyManifest {
            path: manifest.to_path_buf(),
            extension: extension.to_string(),
        });
    }
    discovery.sources = SourceList::new(paths);
    Ok(discovery)
}
