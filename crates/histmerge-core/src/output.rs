//! Persisting accumulated records

use std::path::Path;

use histmerge_container::{Container, ContainerStore, Group};
use histmerge_fs::RobustnessConfig;
use histmerge_fs::io::{is_transient, with_retries};

use crate::accumulate::AccumulatedRecord;
use crate::{Error, Result};

/// Writes the merged records into a fresh container.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    group: String,
    robustness: RobustnessConfig,
}

impl OutputWriter {
    pub fn new(group: impl Into<String>, robustness: RobustnessConfig) -> Self {
        Self {
            group: group.into(),
            robustness,
        }
    }

    /// Create or overwrite `destination` with every record under its own name.
    ///
    /// The records are consumed and released once written.
    pub fn write<S>(
        &self,
        store: &S,
        destination: &Path,
        records: Vec<AccumulatedRecord>,
    ) -> Result<()>
    where
        S: ContainerStore + ?Sized,
    {
        let count = records.len();
        let mut group = Group::new(&self.group);
        for record in records {
            group.insert(record.histogram);
        }
        let mut container = Container::new();
        container.push_group(group);

        with_retries(
            self.robustness,
            || store.create(destination, &container),
            |e| e.io_kind().is_some_and(is_transient),
        )
        .map_err(|e| Error::OutputUnwritable {
            path: destination.to_path_buf(),
            source: e,
        })?;

        tracing::info!(
            path = %destination.display(),
            records = count,
            "Wrote merged histograms"
        );
        Ok(())
    }
}
