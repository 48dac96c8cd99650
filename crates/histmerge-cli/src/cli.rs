//! CLI argument parsing using clap derive

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, ArgGroup, Parser, ValueEnum};
use histmerge_core::{GroupSelector, MergeConfig, MergeSettings, MissingBaselinePolicy, NameSelection};
use histmerge_fs::InputSource;

use crate::error::{CliError, Result};

/// Merge histograms stored in many files into one output file
#[derive(Parser, Debug)]
#[command(name = "histmerge")]
#[command(author, version, about, long_about = None)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .args(["input_file", "directory"])
))]
pub struct Cli {
    /// File containing a list of files which should be used
    #[arg(short = 'i', long = "input-file", value_name = "FILE")]
    pub input_file: Option<PathBuf>,

    /// Directory to scan recursively for files
    #[arg(short = 'd', long, value_name = "INPUT-DIR")]
    pub directory: Option<PathBuf>,

    /// File name where the merged histograms should be stored
    #[arg(short = 'o', long, value_name = "FILENAME")]
    pub output: PathBuf,

    /// Name(s) of the histogram(s) to merge from each input file.
    /// Use the keyword 'all' to merge every histogram of the first file
    #[arg(
        short = 'p',
        long = "plots",
        value_name = "HISTOGRAM",
        num_args = 1..,
        action = ArgAction::Append
    )]
    pub plots: Vec<String>,

    /// Further histogram names
    #[arg(value_name = "HISTOGRAMS")]
    pub names: Vec<String>,

    /// Print additional information
    #[arg(long)]
    pub verbose: bool,

    /// Substring an input path must contain
    #[arg(long, value_name = "SUBSTRING")]
    pub extension: Option<String>,

    /// Group to read in every file ('first' for the first group)
    #[arg(long, value_name = "NAME")]
    pub group: Option<String>,

    /// Group the merged histograms are written under
    #[arg(long, value_name = "NAME")]
    pub output_group: Option<String>,

    /// What to do when the first file lacks a requested histogram
    #[arg(long, value_enum, value_name = "POLICY")]
    pub missing_baseline: Option<MissingBaseline>,

    /// Retries for transient I/O failures
    #[arg(long, value_name = "N")]
    pub retries: Option<u32>,

    /// Abort between files once this many seconds have passed
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Settings file (TOML, JSON or YAML) with defaults for the options above
    #[arg(long, value_name = "FILE", env = "HISTMERGE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Missing-baseline policy as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingBaseline {
    /// Abort the run
    Fail,
    /// Warn and leave the histogram out
    Skip,
}

impl From<MissingBaseline> for MissingBaselinePolicy {
    fn from(value: MissingBaseline) -> Self {
        match value {
            MissingBaseline::Fail => Self::Fail,
            MissingBaseline::Skip => Self::Skip,
        }
    }
}

impl Cli {
    /// The input chosen through the `source` group, which clap keeps exclusive.
    fn input(&self) -> Result<InputSource> {
        match (&self.input_file, &self.directory) {
            (Some(file), _) => Ok(InputSource::Manifest(file.clone())),
            (None, Some(dir)) => Ok(InputSource::Directory(dir.clone())),
            (None, None) => Err(CliError::user(
                "You've specified neither a file nor a directory as input!",
            )),
        }
    }

    /// Build the run configuration: defaults, then the settings file, then flags.
    pub fn to_config(&self) -> Result<MergeConfig> {
        let names = NameSelection::from_args(self.plots.iter().cloned())
            .extend_literal(self.names.iter().cloned());
        let mut config = MergeConfig::new(self.input()?, self.output.clone(), names);

        if let Some(path) = &self.config {
            config.apply(MergeSettings::load(path)?);
        }

        if let Some(extension) = &self.extension {
            config.extension = extension.clone();
        }
        if let Some(group) = &self.group {
            config.group = GroupSelector::parse(group);
        }
        if let Some(output_group) = &self.output_group {
            config.output_group = output_group.clone();
        }
        if let Some(policy) = self.missing_baseline {
            config.missing_baseline = policy.into();
        }
        if let Some(retries) = self.retries {
            config.robustness.max_retries = retries;
        }
        if let Some(secs) = self.timeout {
            config.deadline = Some(Duration::from_secs(secs));
        }
        config.verbose = self.verbose;
        Ok(config)
    }
}
