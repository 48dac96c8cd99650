//! Cross-file accumulation
//!
//! Sources are processed strictly in order, one open at a time:
//!
//! ```text
//!   AwaitingBaseline --(first usable source)--> Accumulating
//!          |                                        |
//!     skip unreadable /                       add matching records,
//!     group-less sources                      warn about missing ones
//! ```
//!
//! The baseline pass moves each requested record out of its container, so
//! the accumulated records never borrow from a source that has been closed.

use std::path::Path;

use histmerge_container::{Container, ContainerStore, Histogram};
use histmerge_fs::{ResolvedPath, RobustnessConfig};

use crate::config::{GroupSelector, MissingBaselinePolicy};
use crate::context::RunContext;
use crate::names::NameSet;
use crate::report::{Contribution, MergeReport, Warning};
use crate::source::open_source;
use crate::{Error, Result};

/// One merged record and how many sources fed it.
#[derive(Debug, Clone, PartialEq)]
pub struct AccumulatedRecord {
    pub histogram: Histogram,
    pub contributions: usize,
}

impl AccumulatedRecord {
    pub fn name(&self) -> &str {
        self.histogram.name()
    }
}

/// Options the accumulator needs from the run configuration.
#[derive(Debug, Clone, Default)]
pub struct AccumulateOptions {
    pub group: GroupSelector,
    pub missing_baseline: MissingBaselinePolicy,
    pub robustness: RobustnessConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    AwaitingBaseline,
    Accumulating,
}

/// Accumulates records source by source.
///
/// Feed opened containers with [`Accumulator::absorb`], or let
/// [`accumulate`] drive the whole loop from a store.
#[derive(Debug)]
pub struct Accumulator {
    names: NameSet,
    options: AccumulateOptions,
    phase: Phase,
    records: Vec<AccumulatedRecord>,
    report: MergeReport,
}

impl Accumulator {
    pub fn new(names: NameSet, options: AccumulateOptions) -> Self {
        Self {
            names,
            options,
            phase: Phase::AwaitingBaseline,
            records: Vec::new(),
            report: MergeReport::default(),
        }
    }

    /// Whether a baseline source has been absorbed yet.
    pub fn has_baseline(&self) -> bool {
        self.phase == Phase::Accumulating
    }

    pub fn records(&self) -> &[AccumulatedRecord] {
        &self.records
    }

    pub fn report(&self) -> &MergeReport {
        &self.report
    }

    pub fn report_mut(&mut self) -> &mut MergeReport {
        &mut self.report
    }

    /// Note a source that could not be opened and move on.
    pub fn skip_unreadable(&mut self, path: &Path, reason: impl std::fmt::Display) {
        self.report.sources.push(path.to_path_buf());
        self.report.warn(Warning::SourceUnreadable {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        });
    }

    /// Fold one opened source into the accumulated records.
    ///
    /// The container is consumed and dropped before this returns.
    pub fn absorb(&mut self, path: &Path, mut container: Container) -> Result<()> {
        self.report.sources.push(path.to_path_buf());

        let selector = self.options.group.clone();
        if self.phase == Phase::AwaitingBaseline {
            if let Some(warning) = selector.ignored_groups(path, &container) {
                tracing::debug!("{}", warning);
            }
        }
        let Some(group) = selector.select_mut(&mut container) else {
            self.report.warn(selector.missing(path));
            return Ok(());
        };
        tracing::debug!(path = %path.display(), group = group.name(), "Reading source");

        match self.phase {
            Phase::AwaitingBaseline => {
                for name in self.names.iter() {
                    match group.take(name) {
                        Some(histogram) => self.records.push(AccumulatedRecord {
                            histogram,
                            contributions: 1,
                        }),
                        None => match self.options.missing_baseline {
                            MissingBaselinePolicy::Fail => {
                                return Err(Error::MissingBaselineRecord {
                                    name: name.to_string(),
                                    path: path.to_path_buf(),
                                });
                            }
                            MissingBaselinePolicy::Skip => {
                                self.report.warn(Warning::BaselineRecordMissing {
                                    name: name.to_string(),
                                    path: path.to_path_buf(),
                                });
                            }
                        },
                    }
                }
                if self.records.is_empty() {
                    return Err(Error::NoRecordsEstablished {
                        path: path.to_path_buf(),
                    });
                }
                self.phase = Phase::Accumulating;
            }
            Phase::Accumulating => {
                for record in &mut self.records {
                    let Some(histogram) = group.get(record.histogram.name()) else {
                        self.report.warn(Warning::RecordMissing {
                            name: record.histogram.name().to_string(),
                            path: path.to_path_buf(),
                        });
                        continue;
                    };
                    match record.histogram.add(histogram) {
                        Ok(()) => record.contributions += 1,
                        Err(e) => self.report.warn(Warning::RecordIncompatible {
                            name: record.histogram.name().to_string(),
                            path: path.to_path_buf(),
                            reason: e.to_string(),
                        }),
                    }
                }
            }
        }

        self.report.merged.push(path.to_path_buf());
        Ok(())
    }

    /// Finish and hand over the records in name order.
    pub fn finish(mut self) -> Result<(Vec<AccumulatedRecord>, MergeReport)> {
        if self.phase == Phase::AwaitingBaseline {
            return Err(Error::NoReadableSource {
                total: self.report.sources.len(),
            });
        }
        self.report.contributions = self
            .records
            .iter()
            .map(|r| Contribution {
                name: r.name().to_string(),
                sources: r.contributions,
            })
            .collect();
        Ok((self.records, self.report))
    }
}

/// Stream every source through an [`Accumulator`].
///
/// Each source is opened, absorbed and closed before the next is opened.
/// The run context is checked between sources, never in the middle of one.
pub fn accumulate<S>(
    store: &S,
    sources: &[ResolvedPath],
    names: NameSet,
    options: AccumulateOptions,
    ctx: &RunContext,
) -> Result<(Vec<AccumulatedRecord>, MergeReport)>
where
    S: ContainerStore + ?Sized,
{
    let robustness = options.robustness;
    let mut accumulator = Accumulator::new(names, options);

    for (processed, source) in sources.iter().enumerate() {
        ctx.checkpoint(processed, sources.len())?;

        match open_source(store, source.as_path(), robustness) {
            Ok(container) => accumulator.absorb(source.as_path(), container)?,
            Err(e) => accumulator.skip_unreadable(source.as_path(), e),
        }
    }

    accumulator.finish()
}
