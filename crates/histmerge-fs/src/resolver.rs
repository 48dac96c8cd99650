//! Fallback chains for turning user-supplied references into real paths
//!
//! [`PathResolver::resolve_directory`] handles directory references that may
//! use `~` shorthand, symlinks or `..` components. [`PathResolver::resolve_file`]
//! locates manifest entries by trying the literal path, then the working
//! directory, then the directory of the running executable.

use std::path::{Path, PathBuf};

use crate::path::{ResolvedPath, is_readable_file};

/// Which base a manifest entry was found against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedVia {
    /// The entry was usable as written
    Literal,
    /// The entry was joined onto the working directory
    WorkingDirectory,
    /// The entry was joined onto the program's own directory
    ProgramDirectory,
}

/// How a directory reference was turned into a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryVia {
    /// The reference named a directory as written
    Literal,
    /// `~` expanded to a directory under home
    HomeExpanded,
    /// Symlinks and `..` resolved to a directory
    Canonicalized,
    /// The reference named a file; this is the directory holding it
    ContainingDirectory,
}

/// Resolves references against a fixed environment.
///
/// The environment (home, working directory, program directory) is captured
/// once, so resolution is free of hidden global state and can be pointed at
/// fixtures in tests.
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
    home: Option<PathBuf>,
    cwd: Option<PathBuf>,
    program_dir: Option<PathBuf>,
}

impl PathResolver {
    /// Capture the process environment.
    pub fn from_env() -> Self {
        Self {
            home: dirs::home_dir(),
            cwd: std::env::current_dir().ok(),
            program_dir: std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(Path::to_path_buf)),
        }
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn with_program_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.program_dir = Some(dir.into());
        self
    }

    pub fn home(&self) -> Option<&Path> {
        self.home.as_deref()
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    pub fn program_dir(&self) -> Option<&Path> {
        self.program_dir.as_deref()
    }

    /// Resolve a directory reference.
    ///
    /// Tried in order, first success wins:
    /// 1. the reference as written, if it is a directory
    /// 2. for `~` references, the home-expanded path if it is a directory,
    ///    otherwise the directory containing it
    /// 3. the canonicalized reference if it is a directory, otherwise the
    ///    directory containing the canonicalized file
    ///
    /// Returns `None` if nothing matched. Callers decide whether that is
    /// fatal, and whether a [`DirectoryVia::ContainingDirectory`] match is
    /// acceptable.
    pub fn resolve_directory(&self, reference: &str) -> Option<(ResolvedPath, DirectoryVia)> {
        if let Some(found) = ResolvedPath::directory(reference) {
            return Some((found, DirectoryVia::Literal));
        }

        if let Some(rest) = reference.strip_prefix('~') {
            let expanded = self.expand_home(rest)?;
            if let Some(found) = ResolvedPath::directory(&expanded) {
                return Some((found, DirectoryVia::HomeExpanded));
            }
            // Only an existing file may fall back to its parent.
            if !expanded.is_file() {
                return None;
            }
            tracing::debug!(
                path = %expanded.display(),
                "Expanded path is not a directory, using its parent"
            );
            return expanded
                .parent()
                .and_then(ResolvedPath::directory)
                .map(|found| (found, DirectoryVia::ContainingDirectory));
        }

        let canonical = dunce::canonicalize(reference).ok()?;
        if canonical.is_dir() {
            return Some((ResolvedPath::new(canonical), DirectoryVia::Canonicalized));
        }
        canonical
            .parent()
            .and_then(ResolvedPath::directory)
            .map(|found| (found, DirectoryVia::ContainingDirectory))
    }

    /// Locate a file reference from a manifest.
    ///
    /// Tried in fixed priority order: the literal reference, the reference
    /// joined onto the working directory, then joined onto the program
    /// directory.
    pub fn resolve_file(&self, reference: &str) -> Option<(ResolvedPath, ResolvedVia)> {
        if is_readable_file(Path::new(reference)) {
            return Some((ResolvedPath::new(reference), ResolvedVia::Literal));
        }

        let bases = [
            (self.cwd.as_deref(), ResolvedVia::WorkingDirectory),
            (self.program_dir.as_deref(), ResolvedVia::ProgramDirectory),
        ];
        bases.into_iter().find_map(|(base, via)| {
            let candidate = base?.join(reference);
            is_readable_file(&candidate).then(|| (ResolvedPath::new(candidate), via))
        })
    }

    /// Whether `reference` names a readable file under any fallback.
    pub fn exists_as_file(&self, reference: &str) -> bool {
        self.resolve_file(reference).is_some()
    }

    fn expand_home(&self, rest: &str) -> Option<PathBuf> {
        let home = self.home.as_ref()?;
        let rest = rest.trim_start_matches(['/', '\\']);
        Some(if rest.is_empty() {
            home.clone()
        } else {
            home.join(rest)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn env() -> (TempDir, PathResolver) {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        for dir in ["home/data", "cwd", "bin"] {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        let resolver = PathResolver::default()
            .with_home(root.join("home"))
            .with_cwd(root.join("cwd"))
            .with_program_dir(root.join("bin"));
        (temp, resolver)
    }

    #[test]
    fn existing_directory_is_returned_unchanged() {
        let (temp, resolver) = env();
        let reference = temp.path().join("cwd");
        let reference = reference.to_str().unwrap();

        let (found, via) = resolver.resolve_directory(reference).unwrap();
        assert_eq!(found.as_path(), Path::new(reference));
        assert_eq!(via, DirectoryVia::Literal);
    }

    #[test]
    fn tilde_expands_to_home_directory() {
        let (temp, resolver) = env();
        let (found, via) = resolver.resolve_directory("~/data").unwrap();
        assert_eq!(found.as_path(), temp.path().join("home/data"));
        assert_eq!(via, DirectoryVia::HomeExpanded);
    }

    #[test]
    fn tilde_file_falls_back_to_parent() {
        let (temp, resolver) = env();
        fs::write(temp.path().join("home/data/run.root"), "").unwrap();

        let (found, via) = resolver.resolve_directory("~/data/run.root").unwrap();
        assert_eq!(found.as_path(), temp.path().join("home/data"));
        assert_eq!(via, DirectoryVia::ContainingDirectory);
    }

    #[test]
    fn tilde_typo_does_not_fall_back_to_home() {
        let (_temp, resolver) = env();
        assert!(resolver.resolve_directory("~/typo").is_none());
        assert!(resolver.resolve_directory("~/data/typo").is_none());
    }

    #[test]
    fn tilde_without_home_is_not_found() {
        let resolver = PathResolver::default();
        assert!(resolver.resolve_directory("~/data").is_none());
    }

    #[test]
    fn dotdot_components_are_collapsed() {
        let (temp, resolver) = env();
        let file = temp.path().join("home/data/run.root");
        fs::write(&file, "").unwrap();
        let reference = temp.path().join("cwd/../home/data/run.root");

        let (found, via) = resolver
            .resolve_directory(reference.to_str().unwrap())
            .unwrap();
        assert_eq!(
            found.as_path(),
            dunce::canonicalize(temp.path().join("home/data")).unwrap()
        );
        assert_eq!(via, DirectoryVia::ContainingDirectory);
    }

    #[test]
    fn missing_reference_is_not_found() {
        let (temp, resolver) = env();
        let reference = temp.path().join("nowhere/at/all");
        assert!(resolver.resolve_directory(reference.to_str().unwrap()).is_none());
    }

    #[test]
    fn resolve_file_prefers_literal() {
        let (temp, resolver) = env();
        let file = temp.path().join("cwd/a.root");
        fs::write(&file, "").unwrap();

        let (found, via) = resolver.resolve_file(file.to_str().unwrap()).unwrap();
        assert_eq!(via, ResolvedVia::Literal);
        assert_eq!(found.as_path(), file.as_path());
    }

    #[test]
    fn resolve_file_tries_cwd_before_program_dir() {
        let (temp, resolver) = env();
        fs::write(temp.path().join("cwd/both.root"), "").unwrap();
        fs::write(temp.path().join("bin/both.root"), "").unwrap();
        fs::write(temp.path().join("bin/only-bin.root"), "").unwrap();

        let (found, via) = resolver.resolve_file("both.root").unwrap();
        assert_eq!(via, ResolvedVia::WorkingDirectory);
        assert_eq!(found.as_path(), temp.path().join("cwd/both.root"));

        let (found, via) = resolver.resolve_file("only-bin.root").unwrap();
        assert_eq!(via, ResolvedVia::ProgramDirectory);
        assert_eq!(found.as_path(), temp.path().join("bin/only-bin.root"));
    }

    #[test]
    fn resolve_file_rejects_directories() {
        let (_temp, resolver) = env();
        fs::create_dir_all(resolver.cwd().unwrap().join("dir.root")).unwrap();
        assert!(!resolver.exists_as_file("dir.root"));
    }
}
