//! Test doubles for code that drives a [`Database`].
//!
//! Enabled by the `test-support` feature.

use crate::error::{DbError, DbResult};
use crate::traits::Database;
use std::cell::{Cell, RefCell};

/// Wraps a real database, recording every statement passed to
/// [`Database::execute_batch`] and optionally failing selected statements.
///
/// Reads (`query_strings`, `relation_exists`) are forwarded and counted
/// separately, so tests can assert that a code path touched no database at
/// all.
pub struct RecordingDatabase<D> {
    inner: D,
    executed: RefCell<Vec<String>>,
    reads: Cell<usize>,
    fail_patterns: RefCell<Vec<String>>,
}

impl<D: Database> RecordingDatabase<D> {
    /// Wrap `inner`.
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            executed: RefCell::new(Vec::new()),
            reads: Cell::new(0),
            fail_patterns: RefCell::new(Vec::new()),
        }
    }

    /// Fail (without executing) any statement containing `pattern`.
    pub fn fail_when_contains(&self, pattern: impl Into<String>) {
        self.fail_patterns.borrow_mut().push(pattern.into());
    }

    /// Stop injecting failures.
    pub fn clear_failures(&self) {
        self.fail_patterns.borrow_mut().clear();
    }

    /// Statements that reached the wrapped database, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    /// Number of statements that reached the wrapped database.
    pub fn execution_count(&self) -> usize {
        self.executed.borrow().len()
    }

    /// Number of read calls forwarded to the wrapped database.
    pub fn read_count(&self) -> usize {
        self.reads.get()
    }

    /// Total calls of any kind.
    pub fn total_calls(&self) -> usize {
        self.execution_count() + self.read_count()
    }

    /// Borrow the wrapped database.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Database> Database for RecordingDatabase<D> {
    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        if let Some(pattern) = self
            .fail_patterns
            .borrow()
            .iter()
            .find(|p| sql.contains(p.as_str()))
        {
            return Err(DbError::ExecutionError(format!(
                "injected failure ({pattern}): {sql}"
            )));
        }
        self.executed.borrow_mut().push(sql.to_string());
        self.inner.execute_batch(sql)
    }

    fn query_strings(&self, sql: &str) -> DbResult<Vec<String>> {
        self.reads.set(self.reads.get() + 1);
        self.inner.query_strings(sql)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        self.reads.set(self.reads.get() + 1);
        self.inner.relation_exists(name)
    }

    fn supports_transactions(&self) -> bool {
        self.inner.supports_transactions()
    }

    fn db_type(&self) -> &'static str {
        self.inner.db_type()
    }
}
