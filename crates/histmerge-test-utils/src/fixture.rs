//! [`FixtureDir`] builder for merge-run test scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use histmerge_container::{Container, ContainerStore, JsonStore};
use tempfile::TempDir;

/// A temporary directory holding source containers and manifests.
///
/// # Example
///
/// ```rust,no_run
/// use histmerge_test_utils::{fixture::FixtureDir, hist};
///
/// let fx = FixtureDir::new();
/// fx.write_source("a.root", &hist::single_group("run", vec![hist::hist_1d("h1", &[(3, 3.0)])]));
/// fx.write_manifest("list.txt", &["a.root"]);
/// fx.assert_file_exists("a.root");
/// ```
pub struct FixtureDir {
    temp_dir: TempDir,
}

impl Default for FixtureDir {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureDir {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path for `rel`.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write a container to `rel`, creating parent directories.
    pub fn write_source(&self, rel: &str, container: &Container) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        JsonStore::pretty()
            .create(&path, container)
            .unwrap_or_else(|e| panic!("FixtureDir::write_source {}: {}", rel, e));
        path
    }

    /// Write arbitrary text to `rel`, creating parent directories.
    pub fn write_text(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    /// Write a manifest with one line per entry.
    pub fn write_manifest(&self, rel: &str, lines: &[&str]) -> PathBuf {
        let mut content = lines.join("\n");
        content.push('\n');
        self.write_text(rel, &content)
    }

    /// Load the container at `rel`.
    ///
    /// # Panics
    /// Panics if the file is missing or malformed.
    pub fn read_container(&self, rel: &str) -> Container {
        JsonStore::new()
            .open(&self.path(rel))
            .unwrap_or_else(|e| panic!("FixtureDir::read_container {}: {}", rel, e))
    }

    /// Assert that `rel` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, rel: &str) {
        let full_path = self.path(rel);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }
}
