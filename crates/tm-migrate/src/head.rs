//! The migration head: the single persisted "last applied migration" record.

use crate::error::{MigrateResult, MigrationError};
use crate::executor::StatementExecutor;
use std::cell::RefCell;
use std::fmt;
use tm_core::sql_utils::{quote_ident, quote_qualified, split_qualified_name, string_literal};
use tm_core::{MigrationName, INSTALL_FILE_NAME};
use tm_db::{Database, DbError};

/// Progress recorded in the head table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Head {
    /// No record; every migration is pending.
    #[default]
    Empty,
    /// `install.sql`, written after a drop; every migration is pending.
    InstallMarker,
    /// The most recently applied migration.
    Applied(MigrationName),
}

impl Head {
    /// Interpret the stored `file_name` (if any).
    pub fn from_record(record: Option<String>) -> Self {
        match record {
            None => Head::Empty,
            Some(name) if name.is_empty() => Head::Empty,
            Some(name) if name == INSTALL_FILE_NAME => Head::InstallMarker,
            Some(name) => Head::Applied(MigrationName::new(name)),
        }
    }

    /// The stored file name, `None` when empty.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Head::Empty => None,
            Head::InstallMarker => Some(INSTALL_FILE_NAME),
            Head::Applied(name) => Some(name.as_str()),
        }
    }

    /// Whether `file` has already been applied under this head.
    pub fn covers(&self, file: &str) -> bool {
        match self {
            Head::Applied(head) => head.as_str() >= file,
            Head::Empty | Head::InstallMarker => false,
        }
    }
}

impl fmt::Display for Head {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file_name() {
            Some(name) => f.write_str(name),
            None => f.write_str("<empty>"),
        }
    }
}

/// Reads and writes the head table.
///
/// Writes go through the [`StatementExecutor`], so in debug mode they are
/// only logged. The value such a write would have stored is kept in memory
/// and returned by [`HeadTracker::get`] for the rest of the debug run.
#[derive(Debug)]
pub struct HeadTracker {
    table: String,
    simulated: RefCell<Option<Head>>,
}

impl HeadTracker {
    /// Track the head stored in `table` (optionally schema-qualified).
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            simulated: RefCell::new(None),
        }
    }

    /// Name of the head table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// DDL creating the head table, its id sequence and (when qualified)
    /// its schema. Every statement is idempotent.
    pub fn create_table_sql(&self) -> String {
        let mut sql = String::new();
        if self.table.contains('.') {
            let (schema, _) = split_qualified_name(&self.table);
            sql.push_str(&format!(
                "CREATE SCHEMA IF NOT EXISTS {};\n",
                quote_qualified(schema)
            ));
        }
        let sequence = format!("{}_id_seq", self.table);
        sql.push_str(&format!(
            "CREATE SEQUENCE IF NOT EXISTS {};\n",
            quote_qualified(&sequence)
        ));
        sql.push_str(&format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {} BIGINT PRIMARY KEY DEFAULT nextval({}),\n    {} VARCHAR NOT NULL\n);",
            quote_qualified(&self.table),
            quote_ident("id"),
            string_literal(&sequence),
            quote_ident("file_name"),
        ));
        sql
    }

    /// Statements replacing the head with `file`: truncate, then insert.
    pub fn write_statements(&self, file: &str) -> [String; 2] {
        let table = quote_qualified(&self.table);
        [
            format!("DELETE FROM {table}"),
            format!(
                "INSERT INTO {table} (file_name) VALUES ({})",
                string_literal(file)
            ),
        ]
    }

    /// Read the current head.
    pub fn get<D: Database>(&self, executor: &StatementExecutor<D>) -> MigrateResult<Head> {
        if executor.is_debug() {
            if let Some(head) = self.simulated.borrow().clone() {
                log::info!("Migration head (debug): {head}");
                return Ok(head);
            }
        }

        let sql = format!(
            "SELECT file_name FROM {} ORDER BY id LIMIT 1",
            quote_qualified(&self.table)
        );
        let rows = match executor.database().query_strings(&sql) {
            Ok(rows) => rows,
            // The table is only created by install, which a dry run skips.
            Err(DbError::TableNotFound(_)) if executor.is_debug() => Vec::new(),
            Err(e) => {
                log::error!("Failed to read migrations table: {e}");
                return Err(MigrationError::HeadRead(e.to_string()));
            }
        };

        let head = Head::from_record(rows.into_iter().next());
        match &head {
            Head::Empty => log::info!("Migrations table is empty"),
            other => log::info!("Migration head: {other}"),
        }
        Ok(head)
    }

    /// Replace the head with `file`. An empty `file` is a no-op.
    pub fn set<D: Database>(&self, executor: &StatementExecutor<D>, file: &str) -> MigrateResult<()> {
        if file.is_empty() {
            return Ok(());
        }
        log::info!("Setting migration head to: {file}");

        for statement in self.write_statements(file) {
            executor
                .execute(&statement)
                .map_err(|source| MigrationError::HeadWrite {
                    file: file.to_string(),
                    source,
                })?;
        }

        self.record(executor, file);
        Ok(())
    }

    /// Remember `file` as the debug-run head. Has no effect outside debug
    /// mode, where the database holds the truth.
    pub(crate) fn record<D: Database>(&self, executor: &StatementExecutor<D>, file: &str) {
        if executor.is_debug() {
            *self.simulated.borrow_mut() = Some(Head::from_record(Some(file.to_string())));
        }
    }

    /// Whether the head table exists.
    pub fn exists<D: Database>(&self, executor: &StatementExecutor<D>) -> MigrateResult<bool> {
        executor
            .database()
            .relation_exists(&self.table)
            .map_err(|e| MigrationError::HeadRead(e.to_string()))
    }

    /// Forget any head simulated by a debug run.
    pub fn clear_simulated(&self) {
        self.simulated.borrow_mut().take();
    }
}

#[cfg(test)]
#[path = "head_test.rs"]
mod tests;
