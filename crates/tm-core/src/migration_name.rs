//! Strongly-typed migration file name wrapper.
//!
//! Migration files are named `<YYYYMMDDHHMMSS>_<label>.sql`. Lexical order of
//! the full file name is the only ordering signal the engine uses, so the
//! fixed-width timestamp prefix is what makes lexical order chronological.

use crate::error::{CoreError, CoreResult};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

/// File name of the head-table bootstrap script.
pub const INSTALL_FILE_NAME: &str = "install.sql";

/// File name of the newline-delimited teardown script.
pub const DROP_FILE_NAME: &str = "drop.sql";

/// Extension every migration file carries.
const MIGRATION_EXTENSION: &str = "sql";

/// `chrono` format of the timestamp prefix.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_WIDTH: usize = 14;

/// Strongly-typed wrapper for migration file names (including `.sql`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MigrationName(String);

impl MigrationName {
    /// Create a new `MigrationName`, panicking in debug builds if the name is empty.
    pub fn new(name: impl Into<String>) -> Self {
        let s = name.into();
        debug_assert!(!s.is_empty(), "MigrationName must not be empty");
        Self(s)
    }

    /// Build the file name for a new migration authored at `now`.
    ///
    /// The label must be non-empty and must not contain path separators.
    pub fn generate<Tz>(now: &DateTime<Tz>, label: &str) -> CoreResult<Self>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        validate_label(label)?;
        Ok(Self(format!(
            "{}_{}.{}",
            now.format(TIMESTAMP_FORMAT),
            label,
            MIGRATION_EXTENSION
        )))
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 14-digit timestamp prefix, if the name follows the convention.
    pub fn timestamp(&self) -> Option<&str> {
        let (prefix, _) = self.0.split_once('_')?;
        if prefix.len() == TIMESTAMP_WIDTH && prefix.bytes().all(|b| b.is_ascii_digit()) {
            Some(prefix)
        } else {
            None
        }
    }

    /// Whether this is one of the reserved `install.sql` / `drop.sql` scripts.
    pub fn is_reserved(&self) -> bool {
        self.0 == INSTALL_FILE_NAME || self.0 == DROP_FILE_NAME
    }
}

fn validate_label(label: &str) -> CoreResult<()> {
    let invalid = |reason: &str| CoreError::InvalidMigrationName {
        name: label.to_string(),
        reason: reason.to_string(),
    };

    if label.trim().is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if label.contains('/') || label.contains('\\') || label.contains("..") {
        return Err(invalid("name must not contain '/', '\\' or '..'"));
    }
    if label.chars().any(char::is_whitespace) {
        return Err(invalid("name must not contain whitespace"));
    }
    Ok(())
}

impl fmt::Display for MigrationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for MigrationName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MigrationName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<str> for MigrationName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for MigrationName {
    fn eq(&self, other: &String) -> bool {
        self.0 == *other
    }
}
