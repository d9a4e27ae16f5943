//! Status command implementation - shows the head and pending migrations

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, OutputFormat, StatusArgs};
use crate::commands::common;

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::load_project(global)?;
    let engine = common::build_engine(&project, global)?;
    let status = engine
        .status()
        .context("Failed to read migration status")?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&status)?),
        OutputFormat::Text => {
            if !status.installed {
                println!("migrations table not installed (run `tm migrate install`)");
            }
            println!("head: {}", status.head.as_deref().unwrap_or("<empty>"));
            println!("applied: {}", status.applied.len());
            println!("{}", common::format_list("pending", &status.pending));
        }
    }
    Ok(())
}
