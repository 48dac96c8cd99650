//! CLI end-to-end tests that invoke the compiled `histmerge` binary.

use assert_cmd::Command;
use histmerge_test_utils::fixture::FixtureDir;
use histmerge_test_utils::hist::{hist_1d, single_group};
use predicates::prelude::*;

fn histmerge() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_histmerge"));
    cmd.env_remove("RUST_LOG").env_remove("HISTMERGE_CONFIG");
    cmd
}

fn two_runs(fx: &FixtureDir) {
    fx.write_source(
        "runs/a.root",
        &single_group("run1", vec![hist_1d("h1", &[(5, 3.0)]), hist_1d("h2", &[(1, 1.0)])]),
    );
    fx.write_source(
        "runs/b.root",
        &single_group("run2", vec![hist_1d("h1", &[(5, 7.0)]), hist_1d("h2", &[(1, 2.0)])]),
    );
}

#[test]
fn test_help_exits_zero() {
    histmerge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--input-file"))
        .stdout(predicate::str::contains("--plots"));
}

#[test]
fn test_missing_input_is_a_usage_error() {
    histmerge()
        .args(["-o", "out.root", "-p", "h1"])
        .assert()
        .code(2);
}

#[test]
fn test_input_file_and_directory_conflict() {
    histmerge()
        .args(["-i", "list.txt", "-d", "runs", "-o", "out.root", "-p", "h1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_directory_merge_sums_bins() {
    let fx = FixtureDir::new();
    two_runs(&fx);
    fx.write_text("runs/notes.txt", "not a histogram file");

    histmerge()
        .current_dir(fx.root())
        .args(["-d", "runs", "-o", "out.root", "-p", "h1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 of 2 files"))
        .stdout(predicate::str::contains("h1 (2 files)"));

    let output = fx.read_container("out.root");
    let merged = output.group("merged").unwrap();
    assert_eq!(merged.record_names(), vec!["h1"]);
    assert_eq!(merged.get("h1").unwrap().bin_content(5), 10.0);
}

#[test]
fn test_all_keyword_merges_every_histogram() {
    let fx = FixtureDir::new();
    two_runs(&fx);

    histmerge()
        .current_dir(fx.root())
        .args(["-d", "runs/", "-o", "out.root", "-p", "all"])
        .assert()
        .success();

    let output = fx.read_container("out.root");
    let merged = output.group("merged").unwrap();
    assert_eq!(merged.record_names(), vec!["h1", "h2"]);
    assert_eq!(merged.get("h2").unwrap().bin_content(1), 3.0);
}

#[test]
fn test_manifest_with_missing_entry_warns_and_succeeds() {
    let fx = FixtureDir::new();
    two_runs(&fx);
    fx.write_manifest(
        "list.txt",
        &["# runs", "runs/a.root", "runs/gone.root", "runs/b.root"],
    );

    histmerge()
        .current_dir(fx.root())
        .args(["-i", "list.txt", "-o", "out.root", "-p", "h1"])
        .assert()
        .success()
        .stderr(predicate::str::contains("gone.root"));

    let output = fx.read_container("out.root");
    assert_eq!(
        output.group("merged").unwrap().get("h1").unwrap().bin_content(5),
        10.0
    );
}

#[test]
fn test_unreadable_manifest_exits_one() {
    let fx = FixtureDir::new();

    histmerge()
        .current_dir(fx.root())
        .args(["-i", "missing.txt", "-o", "out.root", "-p", "h1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error opening file"));

    fx.assert_file_not_exists("out.root");
}

#[test]
fn test_unwritable_output_exits_one() {
    let fx = FixtureDir::new();
    two_runs(&fx);

    histmerge()
        .current_dir(fx.root())
        .args(["-d", "runs", "-o", "no/such/dir/out.root", "-p", "h1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_empty_directory_exits_one() {
    let fx = FixtureDir::new();
    std::fs::create_dir_all(fx.path("empty")).unwrap();

    histmerge()
        .current_dir(fx.root())
        .args(["-d", "empty", "-o", "out.root", "-p", "h1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("doesn't contain any files"));
}
