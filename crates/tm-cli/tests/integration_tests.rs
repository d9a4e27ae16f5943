//! Integration tests for the `tm` binary

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Path to the compiled tm binary
fn tm_bin() -> String {
    env!("CARGO_BIN_EXE_tm").to_string()
}

/// Run a `tm` CLI command and return (stdout, stderr, success).
fn run_tm(args: &[&str]) -> (String, String, bool) {
    let output = Command::new(tm_bin())
        .args(args)
        .env_remove("TIDEMARK_ENV")
        .env_remove("TIDEMARK_DATABASE")
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("Failed to execute tm with args {:?}: {}", args, e));
    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.success(),
    )
}

/// Scaffold a project with `tm init` and add two migrations.
fn init_project(parent: &Path) -> PathBuf {
    let parent_str = parent.to_str().unwrap();
    let (stdout, stderr, ok) = run_tm(&["-p", parent_str, "init", "demo"]);
    assert!(ok, "init failed: {stderr}");
    assert!(stdout.contains("Creating new Tidemark project: demo"));

    let root = parent.join("demo");
    let migrations = root.join("migrations");
    fs::write(
        migrations.join("20240101000000_a.sql"),
        "CREATE TABLE users (id INTEGER, email VARCHAR);",
    )
    .unwrap();
    fs::write(
        migrations.join("20240102000000_b.sql"),
        "CREATE TABLE orders (id INTEGER, user_id INTEGER);",
    )
    .unwrap();
    fs::write(
        migrations.join("drop.sql"),
        "DROP TABLE IF EXISTS orders;\nDROP TABLE IF EXISTS users;\n",
    )
    .unwrap();
    root
}

#[test]
fn test_init_scaffolds_project() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    assert!(root.join("tidemark.yml").is_file());
    assert!(root.join("migrations/install.sql").is_file());
    assert!(root.join("migrations/drop.sql").is_file());

    let (_, stderr, ok) = run_tm(&["-p", tmp.path().to_str().unwrap(), "init", "demo"]);
    assert!(!ok);
    assert!(stderr.contains("already exists"));
}

#[test]
fn test_init_rejects_path_traversal() {
    let tmp = TempDir::new().unwrap();
    let (_, stderr, ok) = run_tm(&["-p", tmp.path().to_str().unwrap(), "init", "../escape"]);
    assert!(!ok);
    assert!(stderr.contains("Invalid project name"));
}

#[test]
fn test_migrate_requires_declared_environment() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    fs::remove_dir_all(root.join("migrations")).unwrap();

    for op in ["install", "up", "reset"] {
        let (_, stderr, ok) = run_tm(&["-p", root.to_str().unwrap(), "migrate", op]);
        assert!(!ok);
        assert!(stderr.contains("[M001]"), "stderr: {stderr}");
    }

    // Refused before the database is opened or the project is prepared.
    assert!(!root.join("dev.duckdb").exists());
    assert!(!root.join("migrations").exists());
}

#[test]
fn test_migrate_requires_declared_environment_json() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    let (stdout, _, ok) = run_tm(&[
        "-p",
        root.to_str().unwrap(),
        "migrate",
        "up",
        "--output",
        "json",
    ]);
    assert!(!ok);
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert!(json["operation"].is_null());
    assert!(json["error"].as_str().unwrap().contains("[M001]"));
    assert!(!root.join("dev.duckdb").exists());
}

#[test]
fn test_verbose_logs_migrations_dir_creation() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    fs::remove_dir_all(root.join("migrations")).unwrap();

    let (_, stderr, ok) = run_tm(&["-v", "-p", root.to_str().unwrap(), "status"]);
    assert!(ok, "status failed: {stderr}");
    assert!(stderr.contains("Creating migrations directory"), "stderr: {stderr}");
    assert!(root.join("migrations").is_dir());
}

#[test]
fn test_log_file_receives_migrations_dir_creation() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    fs::remove_dir_all(root.join("migrations")).unwrap();
    let config = fs::read_to_string(root.join("tidemark.yml")).unwrap();
    fs::write(
        root.join("tidemark.yml"),
        format!("{config}\nlog_file: tidemark.log\n"),
    )
    .unwrap();

    let (_, stderr, ok) = run_tm(&["-v", "-p", root.to_str().unwrap(), "new", "first"]);
    assert!(ok, "new failed: {stderr}");
    assert!(!stderr.contains("Creating migrations directory"));
    let log = fs::read_to_string(root.join("tidemark.log")).unwrap();
    assert!(log.contains("Creating migrations directory"), "log: {log}");
}

#[test]
fn test_install_up_and_idempotent_rerun() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    let dir = root.to_str().unwrap();

    let (stdout, stderr, ok) = run_tm(&["-p", dir, "--env", "development", "migrate", "install"]);
    assert!(ok, "install failed: {stderr}");
    assert!(stdout.contains("created migration table"));

    let (stdout, stderr, ok) = run_tm(&["-p", dir, "--env", "development", "migrate"]);
    assert!(ok, "up failed: {stderr}");
    assert!(stdout.contains("migrated tables: \n20240101000000_a.sql\n20240102000000_b.sql"));

    let (stdout, _, ok) = run_tm(&["-p", dir, "--env", "development", "migrate", "up"]);
    assert!(ok);
    assert_eq!(stdout.trim_end(), "migrated tables:");
}

#[test]
fn test_production_blocks_reset() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    let dir = root.to_str().unwrap();

    let (_, stderr, ok) = run_tm(&["-p", dir, "--env", "production", "migrate", "reset"]);
    assert!(!ok);
    assert!(stderr.contains("'reset' operation is not allowed in a production environment"));
    assert!(stderr.contains("production-safe migration operations have not been set"));
}

#[test]
fn test_dry_run_json() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    let dir = root.to_str().unwrap();

    let (stdout, stderr, ok) = run_tm(&[
        "-p",
        dir,
        "--env",
        "development",
        "migrate",
        "reset",
        "--dry-run",
        "--output",
        "json",
    ]);
    assert!(ok, "dry run failed: {stderr}");
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(json["operation"], "reset");
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["dropped"].as_array().unwrap().len(), 2);
    assert_eq!(json["migrated"].as_array().unwrap().len(), 2);
    assert!(json["error"].is_null());

    // Nothing was applied.
    let (stdout, _, ok) = run_tm(&["-p", dir, "status", "-o", "json"]);
    assert!(ok);
    let status: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(status["installed"], false);
    assert_eq!(status["pending"].as_array().unwrap().len(), 2);
}

#[test]
fn test_new_then_status() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    let dir = root.to_str().unwrap();

    let (stdout, stderr, ok) = run_tm(&["-p", dir, "new", "add_index"]);
    assert!(ok, "new failed: {stderr}");
    let created = PathBuf::from(stdout.trim());
    assert!(created.is_file());
    assert!(created
        .file_name()
        .unwrap()
        .to_str()
        .unwrap()
        .ends_with("_add_index.sql"));

    run_tm(&["-p", dir, "--env", "development", "migrate", "install"]);
    let (stdout, _, ok) = run_tm(&["-p", dir, "status"]);
    assert!(ok);
    assert!(stdout.contains("head: <empty>"));
    assert!(stdout.contains("20240101000000_a.sql"));
    assert!(stdout.contains("_add_index.sql"));
}

#[test]
fn test_unknown_operation_fails() {
    let tmp = TempDir::new().unwrap();
    let root = init_project(tmp.path());
    let (_, stderr, ok) = run_tm(&[
        "-p",
        root.to_str().unwrap(),
        "--env",
        "development",
        "migrate",
        "sideways",
    ]);
    assert!(!ok);
    assert!(stderr.contains("sideways"));
}
