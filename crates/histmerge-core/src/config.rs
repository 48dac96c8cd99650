//! Merge run configuration
//!
//! [`MergeConfig`] is passed explicitly to every stage of a run. Optional
//! defaults can be loaded from a settings file ([`MergeSettings`]) and are
//! overridden by whatever the caller sets afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

use histmerge_fs::{ConfigStore, InputSource, RobustnessConfig};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default substring a source path must contain.
pub const DEFAULT_EXTENSION: &str = ".root";

/// Default group the merged records are written under.
pub const DEFAULT_OUTPUT_GROUP: &str = "merged";

/// Keyword that requests every record of the first source.
pub const ALL_KEYWORD: &str = "all";

/// Which records to merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameSelection {
    /// Every record found in the selected group of the first source
    All,
    /// Explicit names, in the order given
    Named(Vec<String>),
}

impl NameSelection {
    /// Build a selection from raw arguments. Any `all` switches to [`NameSelection::All`].
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = args.into_iter().map(Into::into).collect();
        if names.iter().any(|n| n == ALL_KEYWORD) {
            Self::All
        } else {
            Self::Named(names)
        }
    }

    /// Append names taken literally, so `all` among them is just a record name.
    /// A selection that is already [`NameSelection::All`] stays unchanged.
    pub fn extend_literal<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self {
            Self::All => Self::All,
            Self::Named(mut existing) => {
                existing.extend(names.into_iter().map(Into::into));
                Self::Named(existing)
            }
        }
    }
}

/// Which top-level group of each source holds the records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupSelector {
    /// The first group in enumeration order; further groups are ignored
    #[default]
    First,
    /// The group with this name
    Named(String),
}

impl GroupSelector {
    /// `"first"` (or empty) selects the first group, anything else a named group.
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" | "first" => Self::First,
            name => Self::Named(name.to_string()),
        }
    }
}

/// What to do when the baseline source lacks a requested record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingBaselinePolicy {
    /// Abort the run with a diagnostic naming the record and source
    #[default]
    Fail,
    /// Warn and leave the record out for the rest of the run
    Skip,
}

impl std::str::FromStr for MissingBaselinePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fail" => Ok(Self::Fail),
            "skip" => Ok(Self::Skip),
            other => Err(format!("expected 'fail' or 'skip', got '{}'", other)),
        }
    }
}

/// Everything a merge run needs to know.
#[derive(Debug, Clone)]
pub struct MergeConfig {
    pub input: InputSource,
    pub output: PathBuf,
    pub names: NameSelection,
    pub extension: String,
    pub group: GroupSelector,
    pub output_group: String,
    pub missing_baseline: MissingBaselinePolicy,
    pub verbose: bool,
    pub robustness: RobustnessConfig,
    pub deadline: Option<Duration>,
}

impl MergeConfig {
    pub fn new(input: InputSource, output: impl Into<PathBuf>, names: NameSelection) -> Self {
        Self {
            input,
            output: output.into(),
            names,
            extension: DEFAULT_EXTENSION.to_string(),
            group: GroupSelector::First,
            output_group: DEFAULT_OUTPUT_GROUP.to_string(),
            missing_baseline: MissingBaselinePolicy::Fail,
            verbose: false,
            robustness: RobustnessConfig::default(),
            deadline: None,
        }
    }

    /// Reject configurations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.extension.is_empty() {
            return Err(Error::config("extension must not be empty"));
        }
        if self.output.as_os_str().is_empty() {
            return Err(Error::config("no output file given"));
        }
        if self.output_group.is_empty() {
            return Err(Error::config("output group must not be empty"));
        }
        if let GroupSelector::Named(name) = &self.group {
            if name.is_empty() {
                return Err(Error::config("group name must not be empty"));
            }
        }
        match &self.names {
            NameSelection::Named(names) if names.is_empty() => {
                Err(Error::config("no histograms given, use -p NAME or -p all"))
            }
            NameSelection::Named(names) if names.iter().any(String::is_empty) => {
                Err(Error::config("histogram names must not be empty"))
            }
            _ => Ok(()),
        }
    }

    /// Overlay values from a settings file. Unset settings keep current values.
    pub fn apply(&mut self, settings: MergeSettings) {
        if let Some(extension) = settings.extension {
            self.extension = extension;
        }
        if let Some(group) = settings.group {
            self.group = GroupSelector::parse(&group);
        }
        if let Some(output_group) = settings.output_group {
            self.output_group = output_group;
        }
        if let Some(policy) = settings.missing_baseline {
            self.missing_baseline = policy;
        }
        if let Some(retries) = settings.retries {
            self.robustness.max_retries = retries;
        }
        if let Some(secs) = settings.timeout_secs {
            self.deadline = Some(Duration::from_secs(secs));
        }
    }
}

/// Optional defaults loaded from a TOML, JSON or YAML settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MergeSettings {
    pub extension: Option<String>,
    pub group: Option<String>,
    pub output_group: Option<String>,
    pub missing_baseline: Option<MissingBaselinePolicy>,
    pub retries: Option<u32>,
    pub timeout_secs: Option<u64>,
}

impl MergeSettings {
    /// Load settings, detecting the format from the file extension.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load(path)?)
    }
}
