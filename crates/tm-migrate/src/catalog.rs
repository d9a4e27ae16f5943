//! Migration file catalog.
//!
//! A migrations directory holds `install.sql`, `drop.sql` and any number of
//! `<timestamp>_<name>.sql` files, each one statement read as a single blob.

use crate::error::{MigrateResult, MigrationError};
use chrono::{DateTime, Local, TimeZone};
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tm_core::{MigrationName, DROP_FILE_NAME, INSTALL_FILE_NAME};

/// Lists, reads and creates migration files in one directory.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    dir: PathBuf,
}

impl FileCatalog {
    /// Create a catalog over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of a file inside the migrations directory.
    pub fn path_of(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    /// List migration files in lexical order, excluding `install.sql` and
    /// `drop.sql`. Only regular files are returned.
    pub fn list(&self) -> MigrateResult<Vec<MigrationName>> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| MigrationError::file_system(&self.dir, e))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| MigrationError::file_system(&self.dir, e))?;
            let file_type = entry
                .file_type()
                .map_err(|e| MigrationError::file_system(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(MigrationName::from) else {
                log::warn!("Skipping non UTF-8 file name: {}", entry.path().display());
                continue;
            };
            if name.is_reserved() {
                log::debug!("Skipping file: {name}");
                continue;
            }
            files.push(name);
        }

        files.sort();
        Ok(files)
    }

    /// Read a migration file as one statement.
    pub fn read(&self, file: &str) -> MigrateResult<String> {
        let path = self.path_of(file);
        fs::read_to_string(&path).map_err(|e| MigrationError::file_system(&path, e))
    }

    /// Read `drop.sql` as one statement per line, skipping blank lines.
    pub fn read_drop_statements(&self) -> MigrateResult<Vec<String>> {
        let path = self.path_of(DROP_FILE_NAME);
        let file = fs::File::open(&path).map_err(|e| MigrationError::file_system(&path, e))?;

        let mut statements = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| MigrationError::file_system(&path, e))?;
            let statement = line.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
        }
        Ok(statements)
    }

    /// Read `install.sql`, if present and not blank.
    pub fn read_install_script(&self) -> MigrateResult<Option<String>> {
        let path = self.path_of(INSTALL_FILE_NAME);
        match fs::read_to_string(&path) {
            Ok(script) if script.trim().is_empty() => Ok(None),
            Ok(script) => Ok(Some(script)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(MigrationError::file_system(&path, e)),
        }
    }

    /// Create an empty migration file named after the current local time.
    pub fn create(&self, label: &str) -> MigrateResult<PathBuf> {
        self.create_at(&Local::now(), label)
    }

    /// Create an empty migration file named `<now>_<label>.sql`.
    ///
    /// Fails if a file with that exact name already exists (two files
    /// created within the same second).
    pub fn create_at<Tz>(&self, now: &DateTime<Tz>, label: &str) -> MigrateResult<PathBuf>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let name = MigrationName::generate(now, label)?;
        let dir = fs::canonicalize(&self.dir).map_err(|e| MigrationError::file_system(&self.dir, e))?;
        let path = dir.join(name.as_str());

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| MigrationError::file_system(&path, e))?;

        log::info!("Created migration file {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
