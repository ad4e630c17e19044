//! Integration tests for the `scrivener` binary entry point.
//!
//! Covers help output, usage failures, and edits and file reads driven end to
//! end with the allow-list supplied through a configuration file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

/// Writes a configuration file allowing `root` and returns its path.
fn allow_root(root: &Path) -> Result<PathBuf> {
    let config = root.join("scrivener.toml");
    let roots = serde_json::to_string(&[root])?;
    fs::write(&config, format!("allowed_directories = {roots}\n"))?;
    Ok(config)
}

#[test]
fn help_lists_commands() {
    let mut command = cargo_bin_cmd!("scrivener");
    command.arg("--help");
    command
        .assert()
        .success()
        .stdout(contains("edit-block"))
        .stdout(contains("replace"));
}

#[test]
fn missing_command_exits_with_failure() {
    let mut command = cargo_bin_cmd!("scrivener");
    command.assert().failure().stderr(contains("Usage"));
}

#[test]
fn replace_edits_a_file_under_an_allowed_directory() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = fs::canonicalize(temp_dir.path())?;
    let path = root.join("greeting.txt");
    fs::write(&path, "hello world\n")?;

    let mut command = cargo_bin_cmd!("scrivener");
    command
        .arg("--config-path")
        .arg(allow_root(&root)?)
        .arg("replace")
        .arg(&path)
        .args(["--find", "world", "--replace", "there", "--no-backup"]);
    command
        .assert()
        .success()
        .stdout(contains("Replaced 1 occurrences"));

    assert_eq!(fs::read_to_string(&path)?, "hello there\n");
    Ok(())
}

#[test]
fn edit_reads_operations_from_stdin() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = fs::canonicalize(temp_dir.path())?;
    let path = root.join("list.txt");
    fs::write(&path, "one\ntwo\nthree")?;

    let mut command = cargo_bin_cmd!("scrivener");
    command
        .arg("--config-path")
        .arg(allow_root(&root)?)
        .arg("edit")
        .arg(&path)
        .args(["--operations", "-"])
        .write_stdin(r#"[{"start_line": 2, "end_line": 2, "replacement": "TWO"}]"#);
    command.assert().success();

    assert_eq!(fs::read_to_string(&path)?, "one\nTWO\nthree");
    let backups = fs::read_dir(&root)?
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().starts_with("list.txt.backup."))
        .count();
    assert_eq!(backups, 1);
    Ok(())
}

#[test]
fn read_file_honours_the_configured_line_limit() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = fs::canonicalize(temp_dir.path())?;
    let path = root.join("long.txt");
    fs::write(&path, "1\n2\n3\n4")?;

    let mut command = cargo_bin_cmd!("scrivener");
    command
        .arg("--config-path")
        .arg(allow_root(&root)?)
        .args(["--file-read-line-limit", "2"])
        .arg("read-file")
        .arg(&path);
    command
        .assert()
        .success()
        .stdout("1\n2\n... (truncated due to line limit)\n");
    Ok(())
}
