//! Choosing the group that holds a source's records
//!
//! Every source is resolved independently: with [`GroupSelector::First`] each
//! file may name its first group differently, only its position matters.

use std::path::Path;

use histmerge_container::{Container, Group};

use crate::config::GroupSelector;
use crate::report::Warning;

impl GroupSelector {
    pub fn select<'c>(&self, container: &'c Container) -> Option<&'c Group> {
        match self {
            Self::First => container.first_group(),
            Self::Named(name) => container.group(name),
        }
    }

    pub fn select_mut<'c>(&self, container: &'c mut Container) -> Option<&'c mut Group> {
        match self {
            Self::First => container.first_group_mut(),
            Self::Named(name) => container.group_mut(name),
        }
    }

    /// Warning for a source where this selector finds nothing.
    pub fn missing(&self, path: &Path) -> Warning {
        Warning::SourceWithoutGroup {
            path: path.to_path_buf(),
            group: match self {
                Self::First => None,
                Self::Named(name) => Some(name.clone()),
            },
        }
    }

    /// Warning when positional selection silently ignores further groups.
    pub fn ignored_groups(&self, path: &Path, container: &Container) -> Option<Warning> {
        match self {
            Self::First if container.group_count() > 1 => Some(Warning::MultipleGroups {
                path: path.to_path_buf(),
                count: container.group_count(),
                used: container.first_group()?.name().to_string(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn container(groups: &[&str]) -> Container {
        let mut c = Container::new();
        for g in groups {
            c.push_group(Group::new(*g));
        }
        c
    }

    #[test]
    fn first_selector_is_positional() {
        let c = container(&["run7", "calib"]);
        assert_eq!(GroupSelector::First.select(&c).unwrap().name(), "run7");
    }

    #[test]
    fn named_selector_finds_by_name() {
        let c = container(&["run7", "calib"]);
        let selector = GroupSelector::Named("calib".into());
        assert_eq!(selector.select(&c).unwrap().name(), "calib");
        assert!(GroupSelector::Named("nope".into()).select(&c).is_none());
    }

    #[test]
    fn multiple_groups_warn_only_for_first_selector() {
        let c = container(&["a", "b", "c"]);
        let path = Path::new("x.root");
        assert!(matches!(
            GroupSelector::First.ignored_groups(path, &c),
            Some(Warning::MultipleGroups { count: 3, .. })
        ));
        assert!(
            GroupSelector::Named("a".into())
                .ignored_groups(path, &c)
                .is_none()
        );
        assert!(
            GroupSelector::First
                .ignored_groups(path, &container(&["a"]))
                .is_none()
        );
    }
}
