//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use tm_core::Project;
use tm_db::DuckDbBackend;
use tm_migrate::{MigrationConfig, MigrationEngine};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; main prints nothing for it.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Install the `env_logger` backend.
///
/// `RUST_LOG` wins; otherwise `warn`, or `info` with `--verbose`. With a
/// log file, records are appended there instead of stderr.
pub(crate) fn init_logging(global: &GlobalArgs, log_file: Option<&Path>) -> Result<()> {
    let level = if global.verbose { "info" } else { "warn" };
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Some(path) = log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // Ignore a logger installed earlier in the same process.
    let _ = builder.try_init();
    Ok(())
}

/// Read the project named by `--project-dir` and install logging.
///
/// Apart from a configured log file nothing is written yet; see
/// [`prepare_project`].
pub(crate) fn open_project(global: &GlobalArgs) -> Result<Project> {
    let project_path = Path::new(&global.project_dir);
    let project = Project::open(project_path).with_context(|| {
        format!("Failed to load project from: {}", project_path.display())
    })?;
    init_logging(global, project.log_file().as_deref())?;
    Ok(project)
}

/// Check the project directory is writable and create the migrations
/// directory when missing.
pub(crate) fn prepare_project(project: &Project) -> Result<()> {
    project.prepare().with_context(|| {
        format!("Failed to load project from: {}", project.root.display())
    })?;
    log::debug!("Loaded project '{}' from {}", project.config.name, project.root.display());
    Ok(())
}

/// Open and prepare the project named by `--project-dir`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let project = open_project(global)?;
    prepare_project(&project)?;
    Ok(project)
}

/// Open the project database, honoring `--database`.
pub(crate) fn open_database(project: &Project, global: &GlobalArgs) -> Result<DuckDbBackend> {
    let path = global
        .database
        .clone()
        .unwrap_or_else(|| project.database_path());
    log::info!("Opening database {path}");
    DuckDbBackend::new(&path).with_context(|| format!("Failed to open database: {path}"))
}

/// Build a migration engine for the project.
pub(crate) fn build_engine(
    project: &Project,
    global: &GlobalArgs,
) -> Result<MigrationEngine<DuckDbBackend>> {
    let db = open_database(project, global)?;
    Ok(MigrationEngine::new(MigrationConfig::from_project(project), db))
}

/// Join lines under a heading, e.g. `migrated tables: \na\nb`.
pub(crate) fn format_list<T: fmt::Display>(heading: &str, items: &[T]) -> String {
    let body: Vec<String> = items.iter().map(ToString::to_string).collect();
    format!("{heading}: \n{}", body.join("\n"))
}
