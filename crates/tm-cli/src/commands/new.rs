//! New command implementation - creates an empty timestamped migration file

use anyhow::{Context, Result};
use tm_migrate::FileCatalog;

use crate::cli::{GlobalArgs, NewArgs};
use crate::commands::common;

/// Execute the new command
pub(crate) fn execute(args: &NewArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let catalog = FileCatalog::new(project.migrations_dir());
    let path = catalog
        .create(&args.name)
        .with_context(|| format!("Failed to create migration '{}'", args.name))?;
    println!("{}", path.display());
    Ok(())
}
