//! Migrate command implementation - runs install, up, drop or reset

use anyhow::Result;
use serde::Serialize;
use tm_core::{Environment, MigrationName, Operation};
use tm_migrate::{ensure_declared, Dispatcher, OperationReport};

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};

/// JSON shape of a migrate run
#[derive(Debug, Serialize)]
struct MigrateOutput<'a> {
    operation: Option<Operation>,
    dry_run: bool,
    dropped: &'a [String],
    migrated: &'a [MigrationName],
    error: Option<String>,
}

/// Execute the migrate command
pub(crate) fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let project = common::open_project(global)?;
    let gate = project.config.gate(global.env.map(Environment::from));

    let report = match ensure_declared(&gate) {
        Err(e) => OperationReport::failed(None, e),
        Ok(()) => {
            common::prepare_project(&project)?;
            let engine = common::build_engine(&project, global)?;
            let mut dispatcher = Dispatcher::new(engine, gate);
            let name = args.operation.as_deref().unwrap_or_default();
            dispatcher.handle(name, args.dry_run)
        }
    };

    match args.output {
        OutputFormat::Json => print_json(&report, args.dry_run)?,
        OutputFormat::Text => print_text(&report),
    }

    match report.error {
        None => Ok(()),
        Some(err) if args.output == OutputFormat::Json => {
            log::error!("{err}");
            Err(ExitCode(1).into())
        }
        Some(err) => Err(err.into()),
    }
}

fn print_text(report: &OperationReport) {
    // Nothing happened before the failure.
    if !report.is_success() && report.dropped.is_empty() && report.migrated.is_empty() {
        return;
    }
    match report.operation {
        Some(Operation::Install) => println!("created migration table"),
        None => {}
        Some(Operation::Drop) => {
            println!("{}", common::format_list("dropped tables", &report.dropped))
        }
        Some(Operation::Up) => {
            println!("{}", common::format_list("migrated tables", &report.migrated))
        }
        Some(Operation::Reset) => {
            println!("{}", common::format_list("dropped tables", &report.dropped));
            println!("{}", common::format_list("migrated tables", &report.migrated));
        }
    }
}

fn print_json(report: &OperationReport, dry_run: bool) -> Result<()> {
    let output = MigrateOutput {
        operation: report.operation,
        dry_run,
        dropped: &report.dropped,
        migrated: &report.migrated,
        error: report.error.as_ref().map(ToString::to_string),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
