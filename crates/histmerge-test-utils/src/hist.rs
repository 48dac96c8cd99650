//! Shorthand constructors for test histograms and containers.

use histmerge_container::{Container, Group, Histogram};

/// A 1D histogram with 10 unit-width bins over `[0, 10)` and the given
/// `(global_bin, content)` pairs set.
pub fn hist_1d(name: &str, cells: &[(usize, f64)]) -> Histogram {
    let mut h = Histogram::new_1d(name, format!("{} title", name), 10, 0.0, 10.0)
        .expect("hist_1d: valid binning");
    for &(bin, value) in cells {
        h.set_bin_content(bin, value)
            .expect("hist_1d: bin in range");
    }
    h
}

/// A container with one group per `(group_name, records)` entry, in order.
pub fn container(groups: Vec<(&str, Vec<Histogram>)>) -> Container {
    let mut c = Container::new();
    for (name, records) in groups {
        let mut group = Group::new(name);
        for record in records {
            group.insert(record);
        }
        c.push_group(group);
    }
    c
}

/// A container with a single group.
pub fn single_group(group: &str, records: Vec<Histogram>) -> Container {
    container(vec![(group, records)])
}
