//! Reading and writing containers on disk

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::container::{FORMAT_TAG, FORMAT_VERSION};
use crate::{Container, Error, Result};

/// Storage backend for containers.
///
/// The merge pipeline only talks to this trait, so the on-disk format can be
/// swapped without touching discovery or accumulation.
pub trait ContainerStore {
    /// Open and fully load a container. The returned value owns all its data.
    fn open(&self, path: &Path) -> Result<Container>;

    /// Create or overwrite a container at `path`.
    fn create(&self, path: &Path, container: &Container) -> Result<()>;
}

/// JSON-backed container store.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonStore {
    pretty: bool,
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write indented JSON instead of the compact form.
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl ContainerStore for JsonStore {
    fn open(&self, path: &Path) -> Result<Container> {
        let content = fs::read(path).map_err(|e| Error::io(path, e))?;
        let container: Container =
            serde_json::from_slice(&content).map_err(|e| Error::Malformed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        check(path, &container)?;
        tracing::debug!(
            path = %path.display(),
            groups = container.group_count(),
            "Opened container"
        );
        Ok(container)
    }

    fn create(&self, path: &Path, container: &Container) -> Result<()> {
        let content = if self.pretty {
            serde_json::to_vec_pretty(container)
        } else {
            serde_json::to_vec(container)
        }
        .map_err(|e| Error::Serialize {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        write_atomic(path, &content)
    }
}

fn check(path: &Path, container: &Container) -> Result<()> {
    let malformed = |message: String| Error::Malformed {
        path: path.to_path_buf(),
        message,
    };

    if container.format() != FORMAT_TAG {
        return Err(malformed(format!(
            "unknown format tag '{}'",
            container.format()
        )));
    }
    if container.version() > FORMAT_VERSION {
        return Err(malformed(format!(
            "unsupported version {} (newest known is {})",
            container.version(),
            FORMAT_VERSION
        )));
    }
    if let Some(name) = container.duplicate_group() {
        return Err(malformed(format!("duplicate group '{}'", name)));
    }
    for group in container.groups() {
        if let Some(name) = group.duplicate_record() {
            return Err(malformed(format!(
                "duplicate record '{}' in group '{}'",
                name,
                group.name()
            )));
        }
        for histogram in group.records() {
            histogram.validate().map_err(|e| malformed(e.to_string()))?;
        }
    }
    Ok(())
}

/// Write content atomically: temp file in the same directory, exclusive lock,
/// fsync, then rename over the destination.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let temp_name = format!(
        ".{}.{}.tmp",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    let written = write_locked(&mut temp_file, &temp_path, path, content);
    if written.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    written
}

fn write_locked(file: &mut File, temp_path: &Path, path: &Path, content: &[u8]) -> Result<()> {
    file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    file.write_all(content)
        .map_err(|e| Error::io(temp_path, e))?;
    file.sync_all().map_err(|e| Error::io(temp_path, e))?;
    file.unlock().map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;
    fs::rename(temp_path, path).map_err(|e| Error::io(path, e))
}
