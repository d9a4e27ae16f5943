//! Migration engine: install, drop, migrate (up) and reset.

use std::path::PathBuf;

use serde::Serialize;
use tm_core::sql_utils::quote_qualified;
use tm_core::{MigrationName, Operation, Project, INSTALL_FILE_NAME};
use tm_db::Database;

use crate::catalog::FileCatalog;
use crate::error::{MigrateResult, MigrationError};
use crate::executor::StatementExecutor;
use crate::head::{Head, HeadTracker};

/// Configuration for the migration engine.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    /// Path to the migrations directory.
    pub migrations_dir: PathBuf,
    /// Name of the head table.
    pub head_table: String,
    /// Whether each migration and its head write share one transaction.
    pub atomic_head: bool,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            migrations_dir: PathBuf::from("./migrations"),
            head_table: "migrations".to_string(),
            atomic_head: false,
        }
    }
}

impl MigrationConfig {
    /// Create a new configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every setting from a loaded project.
    pub fn from_project(project: &Project) -> Self {
        Self {
            migrations_dir: project.migrations_dir(),
            head_table: project.config.head_table.clone(),
            atomic_head: project.config.atomic_head,
        }
    }

    /// Set the migrations directory.
    pub fn migrations_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.migrations_dir = dir.into();
        self
    }

    /// Set the head table name.
    pub fn head_table(mut self, table: impl Into<String>) -> Self {
        self.head_table = table.into();
        self
    }

    /// Enable atomic head updates.
    pub fn atomic_head(mut self, atomic: bool) -> Self {
        self.atomic_head = atomic;
        self
    }
}

/// Outcome of an operation, including partial progress on failure.
#[derive(Debug, Default)]
pub struct OperationReport {
    /// The operation that ran, once resolved.
    pub operation: Option<Operation>,
    /// Drop statements executed, in order.
    pub dropped: Vec<String>,
    /// Migration files applied, in order.
    pub migrated: Vec<MigrationName>,
    /// The error that stopped the operation.
    pub error: Option<MigrationError>,
}

impl OperationReport {
    fn for_operation(operation: Operation) -> Self {
        Self {
            operation: Some(operation),
            ..Self::default()
        }
    }

    /// A report carrying only an error.
    pub fn failed(operation: Option<Operation>, error: MigrationError) -> Self {
        Self {
            operation,
            error: Some(error),
            ..Self::default()
        }
    }

    fn with_error(mut self, error: MigrationError) -> Self {
        self.error = Some(error);
        self
    }

    /// Whether the operation completed without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a `Result`, dropping partial progress on failure.
    pub fn into_result(mut self) -> MigrateResult<Self> {
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(self),
        }
    }
}

/// Head and pending files, as reported by `tm status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationStatus {
    /// Whether the head table exists.
    pub installed: bool,
    /// Current head file name, if any.
    pub head: Option<String>,
    /// Files at or before the head.
    pub applied: Vec<MigrationName>,
    /// Files `up` would run.
    pub pending: Vec<MigrationName>,
}

/// Applies migration files to a database and tracks the head.
pub struct MigrationEngine<D: Database> {
    config: MigrationConfig,
    catalog: FileCatalog,
    head: HeadTracker,
    executor: StatementExecutor<D>,
}

impl<D: Database> MigrationEngine<D> {
    /// Create an engine. Nothing is read or executed until an operation runs.
    pub fn new(config: MigrationConfig, db: D) -> Self {
        let catalog = FileCatalog::new(config.migrations_dir.clone());
        let head = HeadTracker::new(config.head_table.clone());
        Self {
            config,
            catalog,
            head,
            executor: StatementExecutor::new(db),
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// The file catalog.
    pub fn catalog(&self) -> &FileCatalog {
        &self.catalog
    }

    /// The head tracker.
    pub fn head(&self) -> &HeadTracker {
        &self.head
    }

    /// The underlying database.
    pub fn database(&self) -> &D {
        self.executor.database()
    }

    /// In debug mode statements (including head writes) are logged, not
    /// executed.
    pub fn set_debug(&mut self, debug: bool) {
        self.executor.set_debug(debug);
        self.head.clear_simulated();
    }

    /// Whether the engine is in debug mode.
    pub fn is_debug(&self) -> bool {
        self.executor.is_debug()
    }

    /// Create the head table if needed, then run `install.sql` if present.
    ///
    /// The head value is never touched.
    pub fn install(&self) -> MigrateResult<()> {
        log::info!("Creating migrations table {}", self.head.table());
        self.executor.execute(&self.head.create_table_sql())?;

        if let Some(script) = self.catalog.read_install_script()? {
            log::info!("Running {INSTALL_FILE_NAME}");
            self.executor.execute(&script)?;
        }
        Ok(())
    }

    /// Run `drop.sql` line by line.
    ///
    /// Stops at the first failing statement. On success the head is reset to
    /// the install marker when the head table still exists.
    pub fn drop_all(&self) -> OperationReport {
        let report = OperationReport::for_operation(Operation::Drop);
        self.drop_into(report)
    }

    fn drop_into(&self, mut report: OperationReport) -> OperationReport {
        let statements = match self.catalog.read_drop_statements() {
            Ok(statements) => statements,
            Err(e) => {
                log::error!("{e}");
                return report.with_error(e);
            }
        };

        for statement in statements {
            if let Err(e) = self.executor.execute(&statement) {
                return report.with_error(e.into());
            }
            report.dropped.push(statement);
        }

        match self.head.exists(&self.executor) {
            Ok(true) => {
                if let Err(e) = self.head.set(&self.executor, INSTALL_FILE_NAME) {
                    log::error!("{e}");
                    return report.with_error(e);
                }
            }
            Ok(false) => {}
            Err(e) => return report.with_error(e),
        }
        report
    }

    /// Apply every migration after the head, in lexical order.
    ///
    /// Stops at the first failure; the head still advances to the last file
    /// that completed.
    pub fn migrate(&self) -> OperationReport {
        let report = OperationReport::for_operation(Operation::Up);
        self.migrate_into(report)
    }

    fn migrate_into(&self, mut report: OperationReport) -> OperationReport {
        let files = match self.catalog.list() {
            Ok(files) => files,
            Err(e) => {
                log::error!("{e}");
                return report.with_error(e);
            }
        };

        let head = match self.head.get(&self.executor) {
            Ok(head) => head,
            Err(e) => return report.with_error(e),
        };

        let atomic = self.atomic_enabled();
        let mut last: Option<MigrationName> = None;
        let mut run_error = None;

        for file in files {
            if file.is_reserved() {
                log::info!("Skipping file: {file}");
                continue;
            }
            if head.covers(&file) {
                log::info!("Migration has already been run: {file}");
                continue;
            }

            log::info!("Running migration: {file}");
            let result = if atomic {
                self.apply_atomically(&file)
            } else {
                self.apply(&file)
            };

            match result {
                Ok(()) => {
                    report.migrated.push(file.clone());
                    last = Some(file);
                }
                Err(e) => {
                    log::error!("{e}");
                    run_error = Some(MigrationError::migration_failed(file, e));
                    break;
                }
            }
        }

        if !atomic {
            if let Some(last) = &last {
                if let Err(e) = self.head.set(&self.executor, last) {
                    if let Some(run_error) = &run_error {
                        log::error!("{run_error}");
                    }
                    log::error!("{e}");
                    return report.with_error(e);
                }
            }
        }

        report.error = run_error;
        report
    }

    /// Drop, install, then migrate. Stops at the first failing step.
    pub fn reset(&self) -> OperationReport {
        let report = self.drop_into(OperationReport::for_operation(Operation::Reset));
        if !report.is_success() {
            return report;
        }
        log::info!("All tables dropped.");

        log::info!("Rebuilding migrations table.");
        if let Err(e) = self.install() {
            log::error!("{e}");
            return report.with_error(e);
        }
        log::info!("Migrations table created.");

        self.migrate_into(report)
    }

    /// Current head and the files `up` would apply.
    pub fn status(&self) -> MigrateResult<MigrationStatus> {
        let files = self.catalog.list()?;
        let installed = self.head.exists(&self.executor)?;
        let head = if installed {
            self.head.get(&self.executor)?
        } else {
            Head::Empty
        };

        let (applied, pending): (Vec<_>, Vec<_>) =
            files.into_iter().partition(|file| head.covers(file));
        Ok(MigrationStatus {
            installed,
            head: head.file_name().map(str::to_string),
            applied,
            pending,
        })
    }

    /// Execute one migration file without touching the head.
    pub fn run_file(&self, file: &str) -> MigrateResult<()> {
        let statement = self.catalog.read(file)?;
        self.executor.execute(&statement)?;
        Ok(())
    }

    /// `DROP TABLE IF EXISTS` the given (optionally qualified) table.
    pub fn drop_table(&self, table: &str) -> MigrateResult<()> {
        let statement = format!("DROP TABLE IF EXISTS {}", quote_qualified(table));
        self.executor.execute(&statement)?;
        Ok(())
    }

    /// Create an empty, timestamped migration file and return its path.
    pub fn create_migration(&self, label: &str) -> MigrateResult<PathBuf> {
        self.catalog.create(label)
    }

    fn atomic_enabled(&self) -> bool {
        if !self.config.atomic_head {
            return false;
        }
        let supported = self.database().supports_transactions();
        if !supported {
            log::warn!(
                "atomic_head requested but {} does not support transactions; head is written after each run",
                self.database().db_type()
            );
        }
        supported
    }

    fn apply(&self, file: &MigrationName) -> MigrateResult<()> {
        let statement = self.catalog.read(file)?;
        self.executor.execute(&statement)?;
        Ok(())
    }

    /// Apply `file` and move the head to it inside one transaction.
    fn apply_atomically(&self, file: &MigrationName) -> MigrateResult<()> {
        let statement = self.catalog.read(file)?;
        self.executor.execute("BEGIN TRANSACTION")?;

        let body = self
            .executor
            .execute(&statement)
            .map_err(MigrationError::from)
            .and_then(|()| self.head.set(&self.executor, file));

        match body {
            Ok(()) => {
                if let Err(mut failures) = self.executor.execute("COMMIT") {
                    if let Err(rollback) = self.executor.execute("ROLLBACK") {
                        failures.extend(rollback);
                    }
                    return Err(failures.into());
                }
                Ok(())
            }
            Err(e) => {
                if let Err(rollback) = self.executor.execute("ROLLBACK") {
                    log::error!("ROLLBACK failed: {rollback}");
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
