//! Init command implementation - scaffolds a new Tidemark project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tm_core::{DROP_FILE_NAME, INSTALL_FILE_NAME};

use crate::cli::{GlobalArgs, InitArgs};
use crate::commands::common;

/// Execute the init command
pub(crate) fn execute(args: &InitArgs, global: &GlobalArgs) -> Result<()> {
    common::init_logging(global, None)?;

    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&global.project_dir).join(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            project_dir.display()
        );
    }

    println!("Creating new Tidemark project: {}\n", args.name);

    let migrations_dir = project_dir.join("migrations");
    fs::create_dir_all(&migrations_dir)
        .with_context(|| format!("Failed to create directory: {}", migrations_dir.display()))?;

    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

migrations_path: migrations
head_table: migrations

database:
  path: "{db_path}"

# Declare the environment here or with --env / TIDEMARK_ENV.
# Nothing runs until it is declared.
# environment: development

# Operations allowed when environment is production (default: up, install)
# production_operations: [up, install]

# Apply each migration and its head update in one transaction
atomic_head: false

# log_file: tidemark.log
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("tidemark.yml"), config_content)
        .context("Failed to write tidemark.yml")?;

    // Both scripts start empty: install.sql runs as one statement and
    // drop.sql runs one statement per line.
    for script in [INSTALL_FILE_NAME, DROP_FILE_NAME] {
        fs::write(migrations_dir.join(script), "")
            .with_context(|| format!("Failed to write migrations/{script}"))?;
    }

    println!("  tidemark.yml");
    println!("  migrations/{INSTALL_FILE_NAME}");
    println!("  migrations/{DROP_FILE_NAME}");
    println!("\nNext steps:");
    println!("  cd {}", project_dir.display());
    println!("  export TIDEMARK_ENV=development");
    println!("  tm migrate install");
    println!("  tm new create_users");
    println!("  tm migrate");

    Ok(())
}
