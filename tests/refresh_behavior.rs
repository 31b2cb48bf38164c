use assert_cmd::Command;
use predicates::str::contains;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn locseng(index: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("locseng"));
    cmd.arg("--quiet").arg("--index-path").arg(index).env_remove("LOCSENG_INDEX_PATH");
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "command failed: {output:?}");
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_refresh_indexes_new_files() {
    let docs = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");
    fs::write(docs.path().join("old.txt"), "old content").unwrap();

    locseng(&index).arg("add").arg(docs.path()).assert().success();

    fs::write(docs.path().join("new.txt"), "refresh token").unwrap();

    let stdout = stdout_of(locseng(&index).args(["query", "refresh"]));
    assert!(stdout.trim().is_empty(), "query must not reindex: {stdout}");

    locseng(&index).arg("refresh").assert().success();

    let stdout = stdout_of(locseng(&index).args(["query", "refresh"]));
    assert!(stdout.lines().any(|line| line.ends_with("new.txt")), "got: {stdout}");
}

#[test]
fn test_refresh_drops_deleted_files() {
    let docs = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");
    fs::write(docs.path().join("keep.txt"), "shared keep").unwrap();
    fs::write(docs.path().join("gone.md"), "shared gone").unwrap();

    locseng(&index).arg("add").arg(docs.path()).assert().success();
    fs::remove_file(docs.path().join("gone.md")).unwrap();
    locseng(&index).arg("refresh").assert().success();

    let stdout = stdout_of(locseng(&index).arg("gone"));
    assert!(stdout.trim().is_empty(), "deleted file still ranked: {stdout}");
}

#[test]
fn test_refresh_with_empty_index() {
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");

    locseng(&index).arg("refresh").assert().success();
    assert_eq!(stdout_of(locseng(&index).arg("list")), "");
}

#[test]
fn test_list_and_remove_roundtrip() {
    let docs = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");
    fs::write(docs.path().join("a.txt"), "alpha").unwrap();

    locseng(&index).arg("add").arg(docs.path()).assert().success();

    let canonical = docs.path().canonicalize().unwrap();
    let listed = stdout_of(locseng(&index).arg("list"));
    assert_eq!(listed.trim_end(), canonical.to_string_lossy());

    locseng(&index).arg("remove").arg(docs.path()).assert().success();
    assert_eq!(stdout_of(locseng(&index).arg("list")), "");
    assert!(stdout_of(locseng(&index).arg("alpha")).is_empty());
}

#[test]
fn test_query_json_format() {
    let docs = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");
    fs::write(docs.path().join("a.txt"), "alpha beta").unwrap();
    fs::write(docs.path().join("b.txt"), "beta gamma").unwrap();

    locseng(&index).arg("add").arg(docs.path()).assert().success();

    let stdout = stdout_of(locseng(&index).args(["query", "--format", "json", "alpha"]));
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let results = value["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0]["path"].as_str().unwrap().ends_with("a.txt"));
    assert!(results[0]["rank"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_query_limit() {
    let docs = tempdir().unwrap();
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");
    fs::write(docs.path().join("a.txt"), "alpha").unwrap();
    fs::write(docs.path().join("b.txt"), "beta beta").unwrap();
    fs::write(docs.path().join("c.txt"), "gamma gamma gamma").unwrap();

    locseng(&index).arg("add").arg(docs.path()).assert().success();

    let stdout = stdout_of(locseng(&index).args(["query", "-n", "2", "alpha", "beta", "gamma"]));
    assert_eq!(stdout.lines().count(), 2);
}

#[test]
fn test_remove_missing_directory_fails() {
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");

    locseng(&index).arg("remove").arg(state.path().join("nope")).assert().failure().code(3);
}

#[test]
fn test_no_arguments_prints_usage() {
    let state = tempdir().unwrap();
    let index = state.path().join("index.json");

    locseng(&index).assert().success().stdout(contains("Usage"));
    assert!(!index.exists());
}
