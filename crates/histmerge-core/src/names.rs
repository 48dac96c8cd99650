//! The set of record names a run merges

use std::path::Path;

use histmerge_container::ContainerStore;
use histmerge_fs::RobustnessConfig;

use crate::config::GroupSelector;
use crate::report::Warning;
use crate::source::open_source;
use crate::{Error, Result};

/// Record names in merge order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameSet {
    names: Vec<String>,
}

impl NameSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a name. Returns `false` if it was already present.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        let name = name.into();
        if self.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    /// Build from user-supplied names, keeping first occurrences.
    ///
    /// Returns the repeated names as warnings; merging the same record twice
    /// would double-count it.
    pub fn from_requested<I, S>(requested: I) -> (Self, Vec<Warning>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        let mut warnings = Vec::new();
        for name in requested {
            let name = name.into();
            if !set.insert(name.clone()) {
                warnings.push(Warning::DuplicateName { name });
            }
        }
        (set, warnings)
    }
}

impl<'a> IntoIterator for &'a NameSet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}

/// Names found in the first source, plus any warnings raised on the way.
#[derive(Debug, Clone)]
pub struct DiscoveredNames {
    pub names: NameSet,
    /// Name of the group the names were read from
    pub group: String,
    /// `(name, title)` of every record in that group, in enumeration order
    pub titles: Vec<(String, String)>,
    pub warnings: Vec<Warning>,
}

impl DiscoveredNames {
    /// Log the name and title of every discovered record.
    pub fn log_listing(&self) {
        tracing::info!("The following histograms are stored in the file:");
        for (name, title) in &self.titles {
            tracing::info!("Name: {},\tTitle: {}", name, title);
        }
    }
}

/// Populate a name set from the selected group of `first`.
///
/// Failing to open the source, finding no group, or finding no records is
/// fatal. Extra groups beyond the first produce a warning. The source is
/// closed before returning.
pub fn discover_names<S>(
    store: &S,
    first: &Path,
    selector: &GroupSelector,
    robustness: RobustnessConfig,
    verbose: bool,
) -> Result<DiscoveredNames>
where
    S: ContainerStore + ?Sized,
{
    let container = open_source(store, first, robustness).map_err(|e| Error::SourceUnopenable {
        path: first.to_path_buf(),
        source: e,
    })?;

    if container.group_count() == 0 {
        return Err(Error::NoGroups {
            path: first.to_path_buf(),
        });
    }

    let mut warnings = Vec::new();
    if let Some(warning) = selector.ignored_groups(first, &container) {
        tracing::warn!("{}", warning);
        warnings.push(warning);
    }

    let group = selector.select(&container).ok_or_else(|| match selector {
        GroupSelector::Named(name) => Error::GroupNotFound {
            path: first.to_path_buf(),
            group: name.clone(),
        },
        GroupSelector::First => Error::NoGroups {
            path: first.to_path_buf(),
        },
    })?;

    let mut names = NameSet::new();
    for record in group.records() {
        names.insert(record.name());
    }
    if names.is_empty() {
        return Err(Error::EmptyNameSet {
            path: first.to_path_buf(),
        });
    }

    let discovered = DiscoveredNames {
        names,
        group: group.name().to_string(),
        titles: group
            .records()
            .iter()
            .map(|r| (r.name().to_string(), r.title().to_string()))
            .collect(),
        warnings,
    };
    if verbose {
        discovered.log_listing();
    }
    Ok(discovered)
}
