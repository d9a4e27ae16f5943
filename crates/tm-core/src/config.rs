//! Configuration types and parsing for tidemark.yml

use crate::error::{CoreError, CoreResult};
use crate::gate::{Environment, OperationGate};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file names searched in a project directory, in order.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["tidemark.yml", "tidemark.yaml"];

/// Main project configuration from tidemark.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Project name
    pub name: String,

    /// Directory holding install.sql, drop.sql and the timestamped migrations
    #[serde(default = "default_migrations_path")]
    pub migrations_path: String,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Table that stores the migration head
    #[serde(default = "default_head_table")]
    pub head_table: String,

    /// Declared environment. Leaving it unset forbids every operation
    /// unless the CLI declares one.
    #[serde(default)]
    pub environment: Option<Environment>,

    /// Operations allowed in production (default: up, install)
    #[serde(default)]
    pub production_operations: Option<Vec<Operation>>,

    /// Apply each migration and its head update in a single transaction
    #[serde(default)]
    pub atomic_head: bool,

    /// Append engine logs to this file instead of stderr
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Database path (DuckDB file or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Special path selecting an in-memory database.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

const DEFAULT_MIGRATIONS_PATH: &str = "migrations";

const DEFAULT_HEAD_TABLE: &str = "migrations";

fn default_db_path() -> String {
    IN_MEMORY_DB_PATH.to_string()
}

fn default_migrations_path() -> String {
    DEFAULT_MIGRATIONS_PATH.to_string()
}

fn default_head_table() -> String {
    DEFAULT_HEAD_TABLE.to_string()
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for tidemark.yml or tidemark.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.exists())
            .map(|path| Self::load(&path))
            .unwrap_or_else(|| {
                Err(CoreError::ConfigNotFound {
                    path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
                })
            })
    }

    /// Validate the configuration
    fn validate(&self) -> CoreResult<()> {
        if self.name.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Project name cannot be empty".to_string(),
            });
        }

        if self.migrations_path.trim().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "migrations_path cannot be empty".to_string(),
            });
        }

        if !is_valid_table_name(&self.head_table) {
            return Err(CoreError::ConfigInvalid {
                message: format!(
                    "head_table '{}' must be a (optionally schema-qualified) identifier of letters, digits and underscores",
                    self.head_table
                ),
            });
        }

        Ok(())
    }

    /// Absolute path of the migrations directory
    pub fn migrations_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migrations_path)
    }

    /// Database path, resolved against the project root unless in-memory
    pub fn database_path(&self, root: &Path) -> String {
        if self.database.path == IN_MEMORY_DB_PATH || Path::new(&self.database.path).is_absolute()
        {
            self.database.path.clone()
        } else {
            root.join(&self.database.path).display().to_string()
        }
    }

    /// Absolute path of the log file, if one is configured
    pub fn log_file_absolute(&self, root: &Path) -> Option<PathBuf> {
        self.log_file.as_ref().map(|p| root.join(p))
    }

    /// Build the production gate described by this config.
    ///
    /// `environment_override` (from the command line) wins over the
    /// `environment` key.
    pub fn gate(&self, environment_override: Option<Environment>) -> OperationGate {
        let mut gate = match environment_override.or(self.environment) {
            Some(env) => OperationGate::declared(env),
            None => OperationGate::undeclared(),
        };
        if let Some(ops) = &self.production_operations {
            gate = gate.with_production_operations(ops.iter().copied());
        }
        gate
    }
}

fn is_valid_table_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            !part.is_empty()
                && !part.starts_with(|c: char| c.is_ascii_digit())
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
