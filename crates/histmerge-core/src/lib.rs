//! Cross-file histogram accumulation
//!
//! A run goes through four stages, each taking the explicit [`MergeConfig`]:
//!
//! ```text
//!   discovery (histmerge-fs) -> name discovery -> accumulation -> output
//! ```
//!
//! - **Name discovery** fills the [`NameSet`] from the first source when every
//!   record is requested.
//! - **Accumulation** seeds one record per name from the first usable source
//!   and adds matching records from every later source.
//! - **Output** writes the accumulated records into a fresh container.
//!
//! Problems that only affect one source or one record are collected as
//! [`Warning`]s in the [`MergeReport`]; everything in [`Error`] aborts the run.

pub mod accumulate;
pub mod config;
pub mod context;
pub mod error;
pub mod group;
pub mod names;
pub mod output;
pub mod pipeline;
pub mod report;
mod source;

pub use accumulate::{AccumulateOptions, AccumulatedRecord, Accumulator, accumulate};
pub use config::{
    ALL_KEYWORD, DEFAULT_EXTENSION, DEFAULT_OUTPUT_GROUP, GroupSelector, MergeConfig,
    MergeSettings, MissingBaselinePolicy, NameSelection,
};
pub use context::{CancellationToken, RunContext};
pub use error::{Error, Result};
pub use names::{DiscoveredNames, NameSet, discover_names};
pub use output::OutputWriter;
pub use pipeline::merge;
pub use report::{Contribution, MergeReport, Warning};
