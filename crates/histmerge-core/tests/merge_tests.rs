//! End-to-end merge runs against fixture files on disk

use histmerge_container::JsonStore;
use histmerge_core::{
    CancellationToken, Error, GroupSelector, MergeConfig, MissingBaselinePolicy, NameSelection,
    RunContext, Warning, merge,
};
use histmerge_fs::{InputSource, PathResolver, RobustnessConfig, SkipReason};
use histmerge_test_utils::fixture::FixtureDir;
use histmerge_test_utils::hist::{container, hist_1d, single_group};
use pretty_assertions::assert_eq;

fn config(input: InputSource, fx: &FixtureDir, names: NameSelection) -> MergeConfig {
    let mut cfg = MergeConfig::new(input, fx.path("out/merged.root"), names);
    cfg.robustness = RobustnessConfig::no_retries();
    cfg
}

fn named(names: &[&str]) -> NameSelection {
    NameSelection::Named(names.iter().map(|n| n.to_string()).collect())
}

fn resolver(fx: &FixtureDir) -> PathResolver {
    PathResolver::default()
        .with_cwd(fx.root())
        .with_program_dir(fx.path("bin"))
}

fn run(cfg: &MergeConfig, fx: &FixtureDir) -> histmerge_core::Result<histmerge_core::MergeReport> {
    std::fs::create_dir_all(fx.path("out")).unwrap();
    merge(cfg, &JsonStore::new(), &resolver(fx), &RunContext::new())
}

#[test]
fn bin_counts_add_across_files_and_missing_record_only_warns() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("run1", vec![hist_1d("h1", &[(4, 3.0)])]));
    fx.write_source("data/b.root", &single_group("run2", vec![hist_1d("h1", &[(4, 7.0)])]));
    fx.write_source("data/c.root", &single_group("run3", vec![hist_1d("h2", &[(4, 50.0)])]));

    let cfg = config(
        InputSource::Directory(fx.path("data")),
        &fx,
        named(&["h1"]),
    );
    let report = run(&cfg, &fx).unwrap();

    let out = fx.read_container("out/merged.root");
    let h1 = out.first_group().unwrap().get("h1").unwrap();
    assert_eq!(h1.bin_content(4), 10.0);
    assert_eq!(
        report.warnings,
        vec![Warning::RecordMissing {
            name: "h1".into(),
            path: fx.path("data/c.root"),
        }]
    );
    assert_eq!(report.contributions[0].sources, 2);
    assert_eq!(report.merged.len(), 3);
}

#[test]
fn merge_all_uses_first_group_of_first_file_in_order() {
    let fx = FixtureDir::new();
    fx.write_source(
        "data/a.root",
        &container(vec![
            ("physics", vec![hist_1d("h1", &[(1, 1.0)]), hist_1d("h2", &[(2, 2.0)])]),
            ("calib", vec![hist_1d("c1", &[])]),
        ]),
    );
    fx.write_source(
        "data/b.root",
        &single_group("other-name", vec![hist_1d("h2", &[(2, 5.0)]), hist_1d("h1", &[(1, 1.0)])]),
    );

    let cfg = config(InputSource::Directory(fx.path("data")), &fx, NameSelection::All);
    let report = run(&cfg, &fx).unwrap();

    assert_eq!(report.record_names(), vec!["h1", "h2"]);
    let out = fx.read_container("out/merged.root");
    let group = out.first_group().unwrap();
    assert_eq!(group.record_names(), vec!["h1", "h2"]);
    assert_eq!(group.get("h1").unwrap().bin_content(1), 2.0);
    assert_eq!(group.get("h2").unwrap().bin_content(2), 7.0);
    assert!(
        report
            .warnings
            .iter()
            .any(|w| matches!(w, Warning::MultipleGroups { count: 2, .. }))
    );
}

#[test]
fn merge_all_on_groupless_first_file_is_fatal() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &container(Vec::new()));

    let cfg = config(InputSource::Directory(fx.path("data")), &fx, NameSelection::All);
    let err = run(&cfg, &fx).unwrap_err();

    assert!(matches!(err, Error::NoGroups { .. }));
    fx.assert_file_not_exists("out/merged.root");
}

#[test]
fn manifest_with_unresolvable_line_still_merges() {
    let fx = FixtureDir::new();
    fx.write_source("a.root", &single_group("g", vec![hist_1d("h1", &[(2, 1.0)])]));
    fx.write_source("bin/b.root", &single_group("g", vec![hist_1d("h1", &[(2, 1.0)])]));
    let manifest = fx.write_manifest(
        "list.txt",
        &["# sources", "", "a.root", "does-not-exist.root", "b.root"],
    );

    let cfg = config(InputSource::Manifest(manifest), &fx, named(&["h1"]));
    let report = run(&cfg, &fx).unwrap();

    assert_eq!(report.sources, vec![fx.path("a.root"), fx.path("bin/b.root")]);
    assert!(matches!(
        &report.warnings[0],
        Warning::EntrySkipped(entry)
            if entry.reference == "does-not-exist.root" && entry.reason == SkipReason::NotFound
    ));
    let out = fx.read_container("out/merged.root");
    assert_eq!(out.first_group().unwrap().get("h1").unwrap().bin_content(2), 2.0);
}

#[test]
fn unreadable_source_is_skipped_and_next_becomes_baseline() {
    let fx = FixtureDir::new();
    fx.write_text("data/a.root", "this is not a container");
    fx.write_source("data/b.root", &single_group("g", vec![hist_1d("h1", &[(1, 4.0)])]));

    let cfg = config(InputSource::Directory(fx.path("data")), &fx, named(&["h1"]));
    let report = run(&cfg, &fx).unwrap();

    assert_eq!(report.merged, vec![fx.path("data/b.root")]);
    assert!(matches!(report.warnings[0], Warning::SourceUnreadable { .. }));
    let out = fx.read_container("out/merged.root");
    assert_eq!(out.first_group().unwrap().get("h1").unwrap().bin_content(1), 4.0);
}

#[test]
fn source_with_overflowing_binning_is_skipped() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[(1, 2.0)])]));
    fx.write_text(
        "data/b.root",
        r#"{"format":"histmerge-container","version":1,"groups":[
            {"name":"g","records":[
                {"name":"h1","axes":[{"bins":18446744073709551615,"low":0.0,"high":10.0}],"contents":[]}
            ]}
        ]}"#,
    );

    let cfg = config(InputSource::Directory(fx.path("data")), &fx, NameSelection::All);
    let report = run(&cfg, &fx).unwrap();

    assert_eq!(report.merged, vec![fx.path("data/a.root")]);
    assert!(matches!(
        &report.warnings[..],
        [Warning::SourceUnreadable { path, .. }] if *path == fx.path("data/b.root")
    ));
    let out = fx.read_container("out/merged.root");
    assert_eq!(out.first_group().unwrap().get("h1").unwrap().bin_content(1), 2.0);
}

#[test]
fn directory_input_naming_a_file_is_fatal() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[(1, 1.0)])]));
    fx.write_source("data/b.root", &single_group("g", vec![hist_1d("h1", &[(1, 1.0)])]));

    let cfg = config(InputSource::Directory(fx.path("data/a.root")), &fx, named(&["h1"]));
    let err = run(&cfg, &fx).unwrap_err();

    assert!(matches!(err, Error::NotADirectory { .. }));
    fx.assert_file_not_exists("out/merged.root");
}

#[test]
fn no_readable_source_is_fatal() {
    let fx = FixtureDir::new();
    fx.write_text("data/a.root", "garbage");
    fx.write_text("data/b.root", "more garbage");

    let cfg = config(InputSource::Directory(fx.path("data")), &fx, named(&["h1"]));
    let err = run(&cfg, &fx).unwrap_err();
    assert!(matches!(err, Error::NoReadableSource { total: 2 }));
}

#[test]
fn missing_baseline_record_policy_is_honoured() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[(1, 1.0)])]));
    fx.write_source(
        "data/b.root",
        &single_group("g", vec![hist_1d("h1", &[(1, 1.0)]), hist_1d("h2", &[(1, 1.0)])]),
    );

    let mut cfg = config(InputSource::Directory(fx.path("data")), &fx, named(&["h1", "h2"]));
    let err = run(&cfg, &fx).unwrap_err();
    assert!(matches!(err, Error::MissingBaselineRecord { ref name, .. } if name == "h2"));

    cfg.missing_baseline = MissingBaselinePolicy::Skip;
    let report = run(&cfg, &fx).unwrap();
    assert_eq!(report.record_names(), vec!["h1"]);
}

#[test]
fn named_group_selector_applies_to_every_source() {
    let fx = FixtureDir::new();
    for (file, value) in [("data/a.root", 1.0), ("data/b.root", 2.0)] {
        fx.write_source(
            file,
            &container(vec![
                ("physics", vec![hist_1d("h1", &[(1, 100.0)])]),
                ("calib", vec![hist_1d("h1", &[(1, value)])]),
            ]),
        );
    }

    let mut cfg = config(InputSource::Directory(fx.path("data")), &fx, NameSelection::All);
    cfg.group = GroupSelector::Named("calib".into());
    run(&cfg, &fx).unwrap();

    let out = fx.read_container("out/merged.root");
    assert_eq!(out.first_group().unwrap().get("h1").unwrap().bin_content(1), 3.0);
}

#[test]
fn output_can_be_merged_again() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[(1, 1.0)])]));
    let cfg = config(InputSource::Directory(fx.path("data")), &fx, NameSelection::All);
    run(&cfg, &fx).unwrap();

    let manifest = fx.write_manifest("again.txt", &["out/merged.root", "out/merged.root"]);
    let mut again = config(InputSource::Manifest(manifest), &fx, NameSelection::All);
    again.output = fx.path("out/twice.root");
    run(&again, &fx).unwrap();

    let out = fx.read_container("out/twice.root");
    assert_eq!(out.first_group().unwrap().get("h1").unwrap().bin_content(1), 2.0);
}

#[test]
fn cancelled_run_writes_nothing() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[])]));
    std::fs::create_dir_all(fx.path("out")).unwrap();

    let token = CancellationToken::new();
    token.cancel();
    let cfg = config(InputSource::Directory(fx.path("data")), &fx, named(&["h1"]));
    let err = merge(
        &cfg,
        &JsonStore::new(),
        &resolver(&fx),
        &RunContext::new().with_token(token),
    )
    .unwrap_err();

    assert!(matches!(err, Error::Cancelled { processed: 0, total: 1 }));
    fx.assert_file_not_exists("out/merged.root");
}

#[test]
fn duplicate_requested_names_are_merged_once() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[(1, 1.0)])]));
    fx.write_source("data/b.root", &single_group("g", vec![hist_1d("h1", &[(1, 1.0)])]));

    let cfg = config(InputSource::Directory(fx.path("data")), &fx, named(&["h1", "h1"]));
    let report = run(&cfg, &fx).unwrap();

    let out = fx.read_container("out/merged.root");
    assert_eq!(out.first_group().unwrap().get("h1").unwrap().bin_content(1), 2.0);
    assert!(matches!(report.warnings[0], Warning::DuplicateName { .. }));
}

#[test]
fn unwritable_output_is_fatal() {
    let fx = FixtureDir::new();
    fx.write_source("data/a.root", &single_group("g", vec![hist_1d("h1", &[])]));

    let mut cfg = config(InputSource::Directory(fx.path("data")), &fx, named(&["h1"]));
    cfg.output = fx.path("no/such/dir/merged.root");
    let err = run(&cfg, &fx).unwrap_err();
    assert!(matches!(err, Error::OutputUnwritable { .. }));
}
