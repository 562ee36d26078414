use assert_cmd::cargo;
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;

fn treecp() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("treecp"));
    cmd.arg("--no-config");
    cmd
}

#[test]
fn test_cli_no_args() {
    Command::new(cargo::cargo_bin!("treecp"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_cli_help() {
    Command::new(cargo::cargo_bin!("treecp"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("target-directory"));
}

#[test]
fn test_copy_single_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("source.txt");
    let dest = temp.child("dest.txt");

    source.write_str("Hello, World!").unwrap();

    treecp()
        .arg(source.path())
        .arg(dest.path())
        .assert()
        .success();

    dest.assert("Hello, World!");
}

#[test]
fn test_copy_single_file_to_directory() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("source.txt");
    let dest_dir = temp.child("dest");

    source.write_str("Test content").unwrap();
    dest_dir.create_dir_all().unwrap();

    treecp()
        .arg(source.path())
        .arg(dest_dir.path())
        .assert()
        .success();

    dest_dir.child("source.txt").assert("Test content");
}

#[test]
fn test_copy_multiple_files() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file1 = temp.child("file1.txt");
    let file2 = temp.child("file2.txt");
    let dest_dir = temp.child("dest");

    file1.write_str("Content 1").unwrap();
    file2.write_str("Content 2").unwrap();

    treecp()
        .arg(file1.path())
        .arg(file2.path())
        .arg(dest_dir.path())
        .assert()
        .success();

    dest_dir.child("file1.txt").assert("Content 1");
    dest_dir.child("file2.txt").assert("Content 2");
}

#[test]
fn test_copy_with_target_directory_flag() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file1 = temp.child("file1.txt");
    let source_dir = temp.child("tree");
    let dest_dir = temp.child("dest");

    file1.write_str("Content 1").unwrap();
    source_dir.child("sub/file2.txt").write_str("Content 2").unwrap();
    dest_dir.create_dir_all().unwrap();

    treecp()
        .arg("-t")
        .arg(dest_dir.path())
        .arg(file1.path())
        .arg(source_dir.path())
        .assert()
        .success();

    dest_dir.child("file1.txt").assert("Content 1");
    dest_dir.child("tree/sub/file2.txt").assert("Content 2");
}

#[test]
fn test_copy_directory_contents() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source_dir = temp.child("source");
    let dest_dir = temp.child("dest");

    source_dir.child("file1.txt").write_str("content1").unwrap();
    source_dir.child("file2.txt").write_str("content2").unwrap();
    source_dir
        .child("subdir/file3.txt")
        .write_str("content3")
        .unwrap();

    treecp()
        .arg("-j")
        .arg("2")
        .arg(source_dir.path())
        .arg(dest_dir.path())
        .assert()
        .success();

    dest_dir.child("file1.txt").assert("content1");
    dest_dir.child("file2.txt").assert("content2");
    dest_dir.child("subdir/file3.txt").assert("content3");
}

#[test]
fn test_copy_directory_onto_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source_dir = temp.child("source");
    let dest = temp.child("dest.txt");

    source_dir.child("file.txt").write_str("content").unwrap();
    dest.write_str("occupied").unwrap();

    treecp()
        .arg(source_dir.path())
        .arg(dest.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("onto file"));

    dest.assert("occupied");
}

#[test]
fn test_no_clobber() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("source.txt");
    let dest = temp.child("dest.txt");

    source.write_str("New content").unwrap();
    dest.write_str("Old content").unwrap();

    treecp()
        .arg("-n")
        .arg(source.path())
        .arg(dest.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    dest.assert("Old content");
}

#[test]
fn test_keep_going_copies_remaining_sources() {
    let temp = assert_fs::TempDir::new().unwrap();
    let file1 = temp.child("file1.txt");
    let file2 = temp.child("file2.txt");
    let dest_dir = temp.child("dest");

    file1.write_str("Content 1").unwrap();
    file2.write_str("Content 2").unwrap();

    treecp()
        .arg("-k")
        .arg("-t")
        .arg(dest_dir.path())
        .arg(file1.path())
        .arg(temp.child("missing.txt").path())
        .arg(file2.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.txt"));

    dest_dir.child("file1.txt").assert("Content 1");
    dest_dir.child("file2.txt").assert("Content 2");
}

#[test]
fn test_invalid_source() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dest = temp.child("dest.txt");

    treecp()
        .arg("/nonexistent/file.txt")
        .arg(dest.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));

    dest.assert(predicate::path::missing());
}

#[test]
fn test_empty_source_argument() {
    let temp = assert_fs::TempDir::new().unwrap();
    let dest = temp.child("dest");

    treecp()
        .arg("")
        .arg(dest.path())
        .assert()
        .failure();

    dest.assert(predicate::path::missing());
}

#[test]
fn test_missing_destination() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("source.txt");
    source.write_str("content").unwrap();

    treecp()
        .arg(source.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("destination"));
}

#[test]
fn test_config_file_is_applied() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("config.toml");
    let source = temp.child("source.txt");
    let dest = temp.child("dest.txt");

    config.write_str("[copy]\nno_clobber = true\n").unwrap();
    source.write_str("New content").unwrap();
    dest.write_str("Old content").unwrap();

    Command::new(cargo::cargo_bin!("treecp"))
        .arg("--config")
        .arg(config.path())
        .arg(source.path())
        .arg(dest.path())
        .assert()
        .failure();

    dest.assert("Old content");
}

#[test]
fn test_invalid_config_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let config = temp.child("config.toml");
    let source = temp.child("source.txt");

    config.write_str("[log]\nlevel = \"chatty\"\n").unwrap();
    source.write_str("content").unwrap();

    Command::new(cargo::cargo_bin!("treecp"))
        .arg("--config")
        .arg(config.path())
        .arg(source.path())
        .arg(temp.child("dest.txt").path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("log.level"));
}

#[test]
fn test_verbose_logs_copied_files() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("source.txt");
    let dest = temp.child("dest.txt");
    source.write_str("content").unwrap();

    treecp()
        .arg("-vv")
        .arg(source.path())
        .arg(dest.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("copied"));
}

#[test]
fn test_copy_preserves_content_integrity() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("source.bin");
    let dest = temp.child("dest.bin");

    let binary_data: Vec<u8> = (0..=255).cycle().take(10240).collect();
    fs::write(source.path(), &binary_data).unwrap();

    treecp()
        .arg(source.path())
        .arg(dest.path())
        .assert()
        .success();

    let dest_data = fs::read(dest.path()).unwrap();
    assert_eq!(binary_data, dest_data, "Binary content should be preserved");
}

#[test]
fn test_copy_large_file() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source = temp.child("large.txt");
    let dest = temp.child("large_copy.txt");

    let large_content = "x".repeat(5 * 1024 * 1024);
    fs::write(source.path(), &large_content).unwrap();

    treecp()
        .arg(source.path())
        .arg(dest.path())
        .assert()
        .success();

    let dest_size = fs::metadata(dest.path()).unwrap().len();
    assert_eq!(dest_size, 5 * 1024 * 1024);
}

#[test]
fn test_parallel_workers_log_through_cli_subscriber() {
    let temp = assert_fs::TempDir::new().unwrap();
    let source_dir = temp.child("source");
    let dest_dir = temp.child("dest");

    source_dir.child("a.txt").write_str("a").unwrap();
    source_dir.child("b.txt").write_str("b").unwrap();

    treecp()
        .arg("-vv")
        .arg("-j")
        .arg("2")
        .arg(source_dir.path())
        .arg(dest_dir.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("a.txt"))
        .stderr(predicate::str::contains("b.txt"));
}
