use assert_fs::TempDir;
use assert_fs::fixture::{FileWriteStr, PathChild};
use common::command::{cat_file, object_count, repository_dir, run_lit_command};
use fake::Fake;
use fake::faker::lorem::en::{Word, Words};
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn hash_object_prints_the_blob_id(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_lit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    repository_dir.child("a.txt").write_str("hello")?;

    run_lit_command(repository_dir.path(), &["hash-object", "a.txt"])
        .assert()
        .success()
        .stdout(format!("{}\n", common::HELLO_BLOB));

    assert_eq!(object_count(repository_dir.path()), 0);

    Ok(())
}

#[rstest]
fn write_blob_object_successfully(repository_dir: TempDir) -> Result<(), Box<dyn std::error::Error>> {
    run_lit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    let file_name = format!("{}.txt", Word().fake::<String>());
    let file_content = Words(5..10).fake::<Vec<String>>().join(" ");
    repository_dir.child(&file_name).write_str(&file_content)?;

    let output = run_lit_command(repository_dir.path(), &["hash-object", "-w", &file_name])
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{40}\n$")?)
        .get_output()
        .stdout
        .clone();
    let oid = String::from_utf8(output)?.trim().to_string();

    let object_path = repository_dir
        .path()
        .join(".lit/objects")
        .join(&oid[..2])
        .join(&oid[2..]);
    assert!(object_path.is_file());
    assert_eq!(cat_file(repository_dir.path(), &oid), file_content);

    Ok(())
}

#[rstest]
fn writing_the_same_content_twice_stores_one_object(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    run_lit_command(repository_dir.path(), &["init"])
        .assert()
        .success();
    let content = Words(5..10).fake::<Vec<String>>().join(" ");
    repository_dir.child("one.txt").write_str(&content)?;
    repository_dir.child("two.txt").write_str(&content)?;

    for file in ["one.txt", "two.txt", "one.txt"] {
        run_lit_command(repository_dir.path(), &["hash-object", "-w", file])
            .assert()
            .success();
    }

    assert_eq!(object_count(repository_dir.path()), 1);

    Ok(())
}

#[rstest]
#[case::malformed("not-an-id")]
#[case::missing("0000000000000000000000000000000000000000")]
fn cat_file_rejects_unknown_objects(
    repository_dir: TempDir,
    #[case] oid: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    run_lit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_lit_command(repository_dir.path(), &["cat-file", "-p", oid])
        .assert()
        .failure();

    Ok(())
}
