//! tm-core - Core library for Tidemark
//!
//! This crate provides the shared types used across Tidemark: project
//! configuration (`tidemark.yml`), project loading, migrate operations, the
//! production gate, migration file names and SQL quoting helpers.

pub mod config;
pub mod error;
pub mod gate;
pub mod migration_name;
pub mod operation;
pub mod project;
pub mod sql_utils;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use gate::{Environment, OperationGate, DEFAULT_PRODUCTION_OPERATIONS};
pub use migration_name::{MigrationName, DROP_FILE_NAME, INSTALL_FILE_NAME};
pub use operation::Operation;
pub use project::Project;
