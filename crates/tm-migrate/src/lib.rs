//! tm-migrate - Migration engine for Tidemark
//!
//! Applies lexically ordered migration files to a database and records the
//! last applied file (the head) so re-runs only apply new files. The
//! [`Dispatcher`] gates destructive operations in production.

pub mod catalog;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod executor;
pub mod head;

pub use catalog::FileCatalog;
pub use dispatcher::{ensure_declared, Dispatcher};
pub use engine::{MigrationConfig, MigrationEngine, MigrationStatus, OperationReport};
pub use error::{MigrateResult, MigrationError};
pub use executor::{StatementExecutor, StatementFailures};
pub use head::{Head, HeadTracker};
