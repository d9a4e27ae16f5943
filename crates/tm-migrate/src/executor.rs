//! Statement execution with debug (dry-run) short-circuiting.

use thiserror::Error;
use tm_db::{Database, DbError};

/// Every failure produced while executing one statement, joined into a
/// single error message for the caller.
#[derive(Error, Debug)]
#[error("{}", join_messages(.failures))]
pub struct StatementFailures {
    failures: Vec<DbError>,
}

impl StatementFailures {
    /// Wrap a single failure.
    pub fn single(error: DbError) -> Self {
        Self {
            failures: vec![error],
        }
    }

    /// Record an additional failure (e.g. a failed rollback).
    pub fn push(&mut self, error: DbError) {
        self.failures.push(error);
    }

    /// Append every failure from `other`.
    pub fn extend(&mut self, other: StatementFailures) {
        self.failures.extend(other.failures);
    }

    /// The individual failures, in the order they happened.
    pub fn failures(&self) -> &[DbError] {
        &self.failures
    }
}

fn join_messages(failures: &[DbError]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<DbError> for StatementFailures {
    fn from(error: DbError) -> Self {
        Self::single(error)
    }
}

/// Executes raw statements against a [`Database`].
///
/// In debug mode statements are logged and reported as successful without
/// reaching the database.
pub struct StatementExecutor<D> {
    db: D,
    debug: bool,
}

impl<D: Database> StatementExecutor<D> {
    /// Create an executor in normal (executing) mode.
    pub fn new(db: D) -> Self {
        Self { db, debug: false }
    }

    /// Switch debug mode on or off.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if debug {
            log::info!("DEBUG MODE ON");
        }
    }

    /// Whether statements are only being logged.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Execute one statement.
    pub fn execute(&self, statement: &str) -> Result<(), StatementFailures> {
        if self.debug {
            log::info!("migration debug: {statement}");
            return Ok(());
        }
        self.db.execute_batch(statement).map_err(|e| {
            log::error!("{e}");
            StatementFailures::single(e)
        })
    }

    /// Borrow the underlying database (reads bypass debug mode).
    pub fn database(&self) -> &D {
        &self.db
    }
}
