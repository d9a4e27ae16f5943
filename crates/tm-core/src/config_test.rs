use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: test_project").unwrap();
    assert_eq!(config.name, "test_project");
    assert_eq!(config.migrations_path, "migrations");
    assert_eq!(config.head_table, "migrations");
    assert_eq!(config.database.path, ":memory:");
    assert!(config.environment.is_none());
    assert!(config.production_operations.is_none());
    assert!(!config.atomic_head);
    assert!(config.log_file.is_none());
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: billing
migrations_path: db/migrations
database:
  path: ./billing.duckdb
head_table: meta.schema_head
environment: production
production_operations:
  - up
atomic_head: true
log_file: tidemark.log
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    config.validate().unwrap();
    assert_eq!(config.migrations_path, "db/migrations");
    assert_eq!(config.head_table, "meta.schema_head");
    assert_eq!(config.environment, Some(Environment::Production));
    assert_eq!(config.production_operations, Some(vec![Operation::Up]));
    assert!(config.atomic_head);

    let root = Path::new("/srv/billing");
    assert_eq!(
        config.migrations_path_absolute(root),
        PathBuf::from("/srv/billing/db/migrations")
    );
    assert_eq!(
        config.log_file_absolute(root),
        Some(PathBuf::from("/srv/billing/tidemark.log"))
    );
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: x\nmodel_paths: [models]");
    assert!(result.is_err());
}

#[test]
fn test_unknown_production_operation_rejected() {
    let result: Result<Config, _> =
        serde_yaml::from_str("name: x\nproduction_operations: [up, qwerty]");
    assert!(result.is_err());
}

#[test]
fn test_validate_rejects_bad_head_table() {
    for table in ["", "1table", "bad-name", "a..b", "drop table x"] {
        let config = Config {
            head_table: table.to_string(),
            ..serde_yaml::from_str("name: x").unwrap()
        };
        assert!(
            matches!(config.validate(), Err(CoreError::ConfigInvalid { .. })),
            "head_table {table:?} should be rejected"
        );
    }
}

#[test]
fn test_validate_rejects_empty_name() {
    let config: Config = serde_yaml::from_str("name: ''").unwrap();
    assert!(config.validate().is_err());
}

#[test]
fn test_database_path_resolution() {
    let root = Path::new("/srv/app");
    let mut config: Config = serde_yaml::from_str("name: x").unwrap();
    assert_eq!(config.database_path(root), ":memory:");

    config.database.path = "app.duckdb".to_string();
    assert_eq!(config.database_path(root), "/srv/app/app.duckdb");

    config.database.path = "/data/app.duckdb".to_string();
    assert_eq!(config.database_path(root), "/data/app.duckdb");
}

#[test]
fn test_gate_from_config() {
    let config: Config = serde_yaml::from_str("name: x").unwrap();
    assert!(!config.gate(None).is_declared());

    let gate = config.gate(Some(Environment::Production));
    assert!(gate.is_declared());
    assert!(!gate.production_operations_configured());
    assert!(!gate.allowed(Operation::Drop));

    let config: Config = serde_yaml::from_str(
        "name: x\nenvironment: production\nproduction_operations: [up, drop]",
    )
    .unwrap();
    let gate = config.gate(None);
    assert!(gate.production_operations_configured());
    assert!(gate.allowed(Operation::Drop));
    assert!(!gate.allowed(Operation::Install));
}

#[test]
fn test_cli_environment_overrides_config() {
    let config: Config = serde_yaml::from_str("name: x\nenvironment: production").unwrap();
    let gate = config.gate(Some(Environment::Development));
    assert_eq!(gate.environment(), Some(Environment::Development));
    assert!(gate.allowed(Operation::Reset));
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tidemark.yaml"), "name: from_yaml").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_yaml");
}

#[test]
fn test_load_from_dir_missing() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_invalid_yaml() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("tidemark.yml"), "name: [unclosed").unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::YamlParse(_)));
}
