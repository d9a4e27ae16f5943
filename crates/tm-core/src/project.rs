//! Project discovery and loading

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// A Tidemark project: a base directory holding `tidemark.yml` and the
/// migrations directory.
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,
}

impl Project {
    /// Load a project from a directory.
    ///
    /// The base path must be non-empty, exist and be writable. The migrations
    /// directory is created when missing.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let project = Self::open(path)?;
        project.prepare()?;
        Ok(project)
    }

    /// Resolve the base path and read its configuration without writing
    /// anything to disk.
    pub fn open(path: &Path) -> CoreResult<Self> {
        let root = resolve_base_path(path)?;
        let config = Config::load_from_dir(&root)?;
        Ok(Self { root, config })
    }

    /// Check the base path accepts writes and create the migrations
    /// directory when missing.
    pub fn prepare(&self) -> CoreResult<()> {
        ensure_writable(&self.root)?;
        self.ensure_migrations_dir()
    }

    /// Absolute path of the migrations directory
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migrations_path_absolute(&self.root)
    }

    /// Database path resolved against the project root
    pub fn database_path(&self) -> String {
        self.config.database_path(&self.root)
    }

    /// Absolute path of the configured log file, if any
    pub fn log_file(&self) -> Option<PathBuf> {
        self.config.log_file_absolute(&self.root)
    }

    fn ensure_migrations_dir(&self) -> CoreResult<()> {
        let dir = self.migrations_dir();
        if dir.is_dir() {
            return Ok(());
        }
        log::info!("Creating migrations directory {}", dir.display());
        std::fs::create_dir_all(&dir).map_err(|e| CoreError::MigrationsDirCreate {
            path: dir.display().to_string(),
            source: e,
        })
    }
}

/// Make `path` absolute and check it is an existing directory.
fn resolve_base_path(path: &Path) -> CoreResult<PathBuf> {
    let trimmed = path.to_string_lossy();
    let trimmed = trimmed.trim_end_matches('/');
    if trimmed.is_empty() && !path.has_root() {
        return Err(CoreError::BasePathMissing);
    }

    let root = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    let metadata = match std::fs::metadata(&root) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }
        Err(e) => {
            return Err(CoreError::IoWithPath {
                path: root.display().to_string(),
                source: e,
            });
        }
    };

    if !metadata.is_dir() {
        return Err(CoreError::BasePathNotWritable {
            path: root.display().to_string(),
        });
    }

    Ok(root)
}

/// Check `root` accepts writes by creating and removing a scratch file.
fn ensure_writable(root: &Path) -> CoreResult<()> {
    tempfile::Builder::new()
        .prefix(".tidemark-")
        .tempfile_in(root)
        .map(drop)
        .map_err(|e| {
            log::debug!("Write check failed in {}: {e}", root.display());
            CoreError::BasePathNotWritable {
                path: root.display().to_string(),
            }
        })
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
