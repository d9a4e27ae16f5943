//! Error types for tm-core

use thiserror::Error;

/// Core error type for Tidemark
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Invalid configuration value
    #[error("[E002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E003: Project directory not found
    #[error("[E003] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// E004: No base path supplied
    #[error("[E004] You must provide a base path")]
    BasePathMissing,

    /// E005: Base path is read-only
    #[error("[E005] Base path does not exist or is not writable: {path}")]
    BasePathNotWritable { path: String },

    /// E006: Migrations directory could not be created
    #[error("[E006] Failed to create migrations directory at {path}: {source}. Try creating the directory manually.")]
    MigrationsDirCreate {
        path: String,
        source: std::io::Error,
    },

    /// E007: Operation name is not one of install/up/drop/reset
    #[error("[E007] Unknown migrate operation '{name}': expected one of install, up, drop, reset")]
    UnknownOperation { name: String },

    /// E008: Migration name cannot be used as a filename
    #[error("[E008] Invalid migration name '{name}': {reason}")]
    InvalidMigrationName { name: String, reason: String },

    /// E009: IO error
    #[error("[E009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E010: IO error with file path context
    #[error("[E010] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E011: YAML parse error
    #[error("[E011] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
