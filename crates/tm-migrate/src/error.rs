//! Error types for the migration engine.

use crate::executor::StatementFailures;
use thiserror::Error;
use tm_core::{CoreError, MigrationName, Operation};

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors surfaced by the engine and dispatcher. None are retried.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// Environment undeclared, bad base path, unknown operation (M001).
    #[error("[M001] Configuration error: {0}")]
    Configuration(String),

    /// Migration, install or drop file could not be read, listed or created (M002).
    #[error("[M002] File system error on '{path}': {source}")]
    FileSystem {
        path: String,
        source: std::io::Error,
    },

    /// One or more statement executions failed (M003).
    #[error("[M003] {0}")]
    Statement(#[from] StatementFailures),

    /// Operation blocked by the production gate (M004).
    #[error("[M004] '{operation}' operation is not allowed in a production environment")]
    PolicyViolation { operation: Operation },

    /// The head table could not be read (M005).
    #[error("[M005] Failed to read migrations table: {0}")]
    HeadRead(String),

    /// The head could not be written (M006).
    #[error("[M006] Failed to set migration head to '{file}': {source}")]
    HeadWrite {
        file: String,
        source: StatementFailures,
    },

    /// A migration file failed; carries the filename (M007).
    #[error("[M007] Failed on migration {file}: {source}")]
    MigrationFailed {
        file: MigrationName,
        source: Box<MigrationError>,
    },

    /// Error from the core crate (config, names).
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MigrationError {
    /// Create a configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a file system error for `path`.
    pub fn file_system(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().display().to_string(),
            source,
        }
    }

    /// Wrap `source` with the migration file it happened on.
    pub fn migration_failed(file: MigrationName, source: MigrationError) -> Self {
        Self::MigrationFailed {
            file,
            source: Box::new(source),
        }
    }

    /// Whether the operation was refused by the production gate.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, Self::PolicyViolation { .. })
    }

    /// Whether this is a configuration problem (including bad core config).
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Core(_))
    }
}
