//! testbridge CLI
//!
//! Reconciles Gherkin features, locator files and TypeScript step
//! definitions with the test-management datastore.

mod cli;
mod commands;
mod error;

use std::path::Path;

use bridge_core::Pass;
use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .compact()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    if !root.is_dir() {
        return Err(CliError::user(format!(
            "Repository root {} is not a directory",
            root.display()
        )));
    }
    execute_command(&root, &cli.command)
}

fn execute_command(root: &Path, cmd: &Commands) -> Result<bool> {
    match cmd {
        Commands::Locators(args) => commands::run_pass(root, Pass::Locators, args, false),
        Commands::LocatorGroups(args) => commands::run_pass(root, Pass::LocatorGroups, args, false),
        Commands::Suites(args) => commands::run_pass(root, Pass::Suites, args, false),
        Commands::Cases { args, mint_ids } => {
            commands::run_pass(root, Pass::Cases, args, *mint_ids)
        }
        Commands::StepGroups(args) => commands::run_pass(root, Pass::StepGroups, args, false),
        Commands::Steps(args) => commands::run_pass(root, Pass::StepTemplates, args, false),
        Commands::Sync { direction, args } => commands::run_sync(root, *direction, args),
        Commands::Init => commands::run_init(root),
    }
}
