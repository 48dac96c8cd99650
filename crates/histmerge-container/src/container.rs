//! In-memory container: ordered top-level groups of named histograms

use serde::{Deserialize, Serialize};

use crate::Histogram;

/// Identifier written into every container file.
pub const FORMAT_TAG: &str = "histmerge-container";

/// Current on-disk format version.
pub const FORMAT_VERSION: u32 = 1;

/// A named group of histograms.
///
/// Records keep insertion order, which is the enumeration order callers see.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Group {
    name: String,
    #[serde(default)]
    records: Vec<Histogram>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Histogram] {
        &self.records
    }

    /// Record names in enumeration order.
    pub fn record_names(&self) -> Vec<String> {
        self.records.iter().map(|h| h.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Histogram> {
        self.records.iter().find(|h| h.name() == name)
    }

    /// Remove a record and hand ownership to the caller.
    ///
    /// The returned histogram no longer refers to this group or its container.
    pub fn take(&mut self, name: &str) -> Option<Histogram> {
        let idx = self.records.iter().position(|h| h.name() == name)?;
        Some(self.records.remove(idx))
    }

    /// Insert a record, replacing any existing record with the same name in place.
    pub fn insert(&mut self, histogram: Histogram) {
        match self.records.iter_mut().find(|h| h.name() == histogram.name()) {
            Some(existing) => *existing = histogram,
            None => self.records.push(histogram),
        }
    }

    pub(crate) fn duplicate_record(&self) -> Option<&str> {
        self.records.iter().enumerate().find_map(|(i, h)| {
            self.records[..i]
                .iter()
                .any(|prev| prev.name() == h.name())
                .then(|| h.name())
        })
    }
}

/// A container of top-level groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Container {
    format: String,
    version: u32,
    #[serde(default)]
    groups: Vec<Group>,
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    pub fn new() -> Self {
        Self {
            format: FORMAT_TAG.to_string(),
            version: FORMAT_VERSION,
            groups: Vec::new(),
        }
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Top-level group names in enumeration order.
    pub fn group_names(&self) -> Vec<String> {
        self.groups.iter().map(|g| g.name().to_string()).collect()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn first_group(&self) -> Option<&Group> {
        self.groups.first()
    }

    pub fn first_group_mut(&mut self) -> Option<&mut Group> {
        self.groups.first_mut()
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name() == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.name() == name)
    }

    /// Append a group, replacing any existing group with the same name in place.
    pub fn push_group(&mut self, group: Group) {
        match self.groups.iter_mut().find(|g| g.name() == group.name()) {
            Some(existing) => *existing = group,
            None => self.groups.push(group),
        }
    }

    pub(crate) fn duplicate_group(&self) -> Option<&str> {
        self.groups.iter().enumerate().find_map(|(i, g)| {
            self.groups[..i]
                .iter()
                .any(|prev| prev.name() == g.name())
                .then(|| g.name())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hist(name: &str) -> Histogram {
        Histogram::new_1d(name, "", 2, 0.0, 1.0).unwrap()
    }

    #[test]
    fn group_preserves_insertion_order() {
        let mut group = Group::new("run");
        group.insert(hist("h2"));
        group.insert(hist("h1"));
        group.insert(hist("h3"));
        assert_eq!(group.record_names(), vec!["h2", "h1", "h3"]);
    }

    #[test]
    fn insert_replaces_same_name_in_place() {
        let mut group = Group::new("run");
        group.insert(hist("a"));
        group.insert(hist("b"));
        let mut replacement = hist("a");
        replacement.fill(&[0.5]);
        group.insert(replacement);

        assert_eq!(group.record_names(), vec!["a", "b"]);
        assert_eq!(group.get("a").unwrap().entries(), 1.0);
    }

    #[test]
    fn take_detaches_record() {
        let mut container = Container::new();
        let mut group = Group::new("run");
        group.insert(hist("h1"));
        container.push_group(group);

        let taken = container.first_group_mut().unwrap().take("h1").unwrap();
        drop(container);
        assert_eq!(taken.name(), "h1");
    }

    #[test]
    fn first_group_follows_enumeration_order() {
        let mut container = Container::new();
        container.push_group(Group::new("zeta"));
        container.push_group(Group::new("alpha"));
        assert_eq!(container.first_group().unwrap().name(), "zeta");
        assert_eq!(container.group_names(), vec!["zeta", "alpha"]);
    }
}
