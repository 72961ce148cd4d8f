use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

pub const AUTHOR_NAME: &str = "fake_user";
pub const AUTHOR_EMAIL: &str = "fake_email@email.com";
pub const AUTHOR_DATE: &str = "2023-01-01 12:00:00 +0000";

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// A repository whose first commit holds `1.txt`, `a/2.txt` and `a/b/3.txt`.
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_lit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_lit_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();

    lit_commit(repository_dir.path(), "Initial commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_lit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("lit").expect("Failed to find lit binary");
    cmd.current_dir(dir);
    cmd.env_remove("LIT_AUTHOR_NAME")
        .env_remove("LIT_AUTHOR_EMAIL")
        .env_remove("LIT_AUTHOR_DATE");
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn lit_commit(dir: &Path, message: &str) -> Command {
    let mut cmd = run_lit_command(dir, &["commit", "-m", message]);
    cmd.envs(vec![
        ("LIT_AUTHOR_NAME", AUTHOR_NAME),
        ("LIT_AUTHOR_EMAIL", AUTHOR_EMAIL),
        ("LIT_AUTHOR_DATE", AUTHOR_DATE),
    ]);
    cmd
}

/// Commit id the current branch points at, if any.
pub fn head_commit_oid(dir: &Path) -> Option<String> {
    let head = std::fs::read_to_string(dir.join(".lit").join("HEAD")).ok()?;
    let ref_path = head.trim().strip_prefix("ref: ")?;

    std::fs::read_to_string(dir.join(".lit").join(ref_path))
        .ok()
        .map(|oid| oid.trim().to_string())
}

pub fn cat_file(dir: &Path, oid: &str) -> String {
    let output = run_lit_command(dir, &["cat-file", "-p", oid])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    String::from_utf8(output).expect("object is not UTF-8")
}

/// Count the object files in the store.
pub fn object_count(dir: &Path) -> usize {
    walkdir::WalkDir::new(dir.join(".lit").join("objects"))
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .count()
}
