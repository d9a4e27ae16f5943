//! Tidemark CLI - idempotent, production-gated SQL schema migrations

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{init, migrate, new, status};

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Init(args) => init::execute(args, &cli.global),
        cli::Commands::Migrate(args) => migrate::execute(args, &cli.global),
        cli::Commands::New(args) => new::execute(args, &cli.global),
        cli::Commands::Status(args) => status::execute(args, &cli.global),
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        let code = match err.downcast_ref::<ExitCode>() {
            Some(ExitCode(code)) => *code,
            None => {
                eprintln!("Error: {err:#}");
                1
            }
        };
        std::process::exit(code);
    }
}
