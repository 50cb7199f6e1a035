use std::path::Path;
use std::process::Output;

use assert_cmd::Command;

fn run(dir: &Path, args: &[&str]) -> Output {
    let database = dir.join("bookshelf.db");
    Command::cargo_bin("bookshelf")
        .unwrap()
        .args(args)
        .env("BOOKSHELF_CONFIG_DIR", dir)
        .env("BOOKSHELF_ENV", "local")
        .env(
            "BOOKSHELF_DATABASE__URL",
            format!("sqlite://{}", database.display()),
        )
        .env("RUST_LOG", "error")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn migrate_dry_run_then_apply_then_noop() {
    let dir = tempfile::tempdir().unwrap();

    let dry_run = run(dir.path(), &["migrate", "--dry-run"]);
    assert!(dry_run.status.success());
    assert!(stdout(&dry_run).contains("pending books/001_init"));

    let applied = run(dir.path(), &["migrate"]);
    assert!(applied.status.success());
    assert!(stdout(&applied).contains("applied books/001_init"));

    let again = run(dir.path(), &["migrate"]);
    assert!(again.status.success());
    assert!(stdout(&again).contains("database schema is up to date"));
}

#[test]
fn unknown_environment_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("migrate")
        .env("BOOKSHELF_CONFIG_DIR", dir.path())
        .env("BOOKSHELF_ENV", "qa")
        .output()
        .unwrap();

    assert!(!output.status.success());
}
