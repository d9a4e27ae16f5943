//! Database trait definition

use crate::error::DbResult;

/// Database capability required by the migration engine.
///
/// Execution is synchronous: each call blocks until the database has
/// finished, so statements are applied strictly in sequence.
pub trait Database {
    /// Execute one or more raw SQL statements
    fn execute_batch(&self, sql: &str) -> DbResult<()>;

    /// Run a query and return the first column of every row as text
    fn query_strings(&self, sql: &str) -> DbResult<Vec<String>>;

    /// Check if a table or view exists (optionally schema-qualified)
    fn relation_exists(&self, name: &str) -> DbResult<bool>;

    /// Whether `BEGIN` / `COMMIT` / `ROLLBACK` may wrap DDL statements
    fn supports_transactions(&self) -> bool {
        true
    }

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

impl<T: Database + ?Sized> Database for &T {
    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        (**self).execute_batch(sql)
    }

    fn query_strings(&self, sql: &str) -> DbResult<Vec<String>> {
        (**self).query_strings(sql)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        (**self).relation_exists(name)
    }

    fn supports_transactions(&self) -> bool {
        (**self).supports_transactions()
    }

    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }
}

impl<T: Database + ?Sized> Database for Box<T> {
    fn execute_batch(&self, sql: &str) -> DbResult<()> {
        (**self).execute_batch(sql)
    }

    fn query_strings(&self, sql: &str) -> DbResult<Vec<String>> {
        (**self).query_strings(sql)
    }

    fn relation_exists(&self, name: &str) -> DbResult<bool> {
        (**self).relation_exists(name)
    }

    fn supports_transactions(&self) -> bool {
        (**self).supports_transactions()
    }

    fn db_type(&self) -> &'static str {
        (**self).db_type()
    }
}
