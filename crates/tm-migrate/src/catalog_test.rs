use super::*;
use chrono::Utc;
use tempfile::TempDir;

fn catalog_with(files: &[(&str, &str)]) -> (TempDir, FileCatalog) {
    let dir = TempDir::new().unwrap();
    for (name, body) in files {
        fs::write(dir.path().join(name), body).unwrap();
    }
    let catalog = FileCatalog::new(dir.path());
    (dir, catalog)
}

#[test]
fn test_list_is_lexical_and_excludes_reserved() {
    let (_dir, catalog) = catalog_with(&[
        ("20240102000000_b.sql", "SELECT 2"),
        ("install.sql", "CREATE TABLE x (id INT)"),
        ("20240101000000_a.sql", "SELECT 1"),
        ("drop.sql", "DROP TABLE x"),
    ]);
    let files = catalog.list().unwrap();
    assert_eq!(files, vec!["20240101000000_a.sql", "20240102000000_b.sql"]);
}

#[test]
fn test_list_skips_directories() {
    let (dir, catalog) = catalog_with(&[("20240101000000_a.sql", "SELECT 1")]);
    fs::create_dir(dir.path().join("20240101000001_dir.sql")).unwrap();
    assert_eq!(catalog.list().unwrap(), vec!["20240101000000_a.sql"]);
}

#[test]
fn test_list_is_restartable() {
    let (_dir, catalog) = catalog_with(&[("20240101000000_a.sql", "SELECT 1")]);
    assert_eq!(catalog.list().unwrap(), catalog.list().unwrap());
}

#[test]
fn test_list_missing_directory() {
    let dir = TempDir::new().unwrap();
    let catalog = FileCatalog::new(dir.path().join("missing"));
    let err = catalog.list().unwrap_err();
    assert!(matches!(err, MigrationError::FileSystem { .. }));
}

#[test]
fn test_read_whole_file() {
    let body = "CREATE TABLE users (\n  id INT\n);\n";
    let (_dir, catalog) = catalog_with(&[("20240101000000_users.sql", body)]);
    assert_eq!(catalog.read("20240101000000_users.sql").unwrap(), body);
}

#[test]
fn test_read_drop_statements_skips_blank_lines() {
    let (_dir, catalog) = catalog_with(&[(
        "drop.sql",
        "DROP TABLE IF EXISTS b;\n\n  DROP TABLE IF EXISTS a;\r\n",
    )]);
    assert_eq!(
        catalog.read_drop_statements().unwrap(),
        vec!["DROP TABLE IF EXISTS b;", "DROP TABLE IF EXISTS a;"]
    );
}

#[test]
fn test_read_drop_statements_missing() {
    let (_dir, catalog) = catalog_with(&[]);
    let err = catalog.read_drop_statements().unwrap_err();
    match err {
        MigrationError::FileSystem { path, source } => {
            assert!(path.ends_with("drop.sql"));
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected FileSystem error, got {other:?}"),
    }
}

#[test]
fn test_read_install_script() {
    let (_dir, catalog) = catalog_with(&[]);
    assert!(catalog.read_install_script().unwrap().is_none());

    let (_dir, catalog) = catalog_with(&[("install.sql", "  \n")]);
    assert!(catalog.read_install_script().unwrap().is_none());

    let (_dir, catalog) = catalog_with(&[("install.sql", "CREATE SCHEMA app;")]);
    assert_eq!(
        catalog.read_install_script().unwrap().as_deref(),
        Some("CREATE SCHEMA app;")
    );
}

#[test]
fn test_create_at_names_file_by_timestamp() {
    let (_dir, catalog) = catalog_with(&[]);
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
    let path = catalog.create_at(&now, "add_orders").unwrap();

    assert!(path.is_absolute());
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        "20240304050607_add_orders.sql"
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
    assert_eq!(catalog.list().unwrap(), vec!["20240304050607_add_orders.sql"]);
}

#[test]
fn test_create_at_same_second_collides() {
    let (_dir, catalog) = catalog_with(&[]);
    let now = Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap();
    catalog.create_at(&now, "add_orders").unwrap();
    let err = catalog.create_at(&now, "add_orders").unwrap_err();
    match err {
        MigrationError::FileSystem { source, .. } => {
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists)
        }
        other => panic!("expected FileSystem error, got {other:?}"),
    }
}

#[test]
fn test_create_rejects_bad_label() {
    let (_dir, catalog) = catalog_with(&[]);
    let err = catalog.create("../outside").unwrap_err();
    assert!(err.is_configuration());
}
