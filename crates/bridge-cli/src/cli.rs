//! CLI argument parsing using clap derive

use std::path::PathBuf;

use bridge_core::Direction;
use clap::{Args, Parser, Subcommand};

/// testbridge - Keep feature files, locators and step definitions in sync
/// with the test-management datastore
#[derive(Parser, Debug)]
#[command(name = "testbridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository root (defaults to the current directory)
    #[arg(short = 'C', long, global = true, env = "TESTBRIDGE_ROOT")]
    pub root: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Flags shared by the single-pass commands
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PassArgs {
    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the result as JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Reconcile locators from locator group files
    Locators(PassArgs),

    /// Reconcile locator groups and remove empty ones
    LocatorGroups(PassArgs),

    /// Reconcile test suites from feature files
    Suites(PassArgs),

    /// Reconcile test cases from feature scenarios
    Cases {
        #[command(flatten)]
        args: PassArgs,

        /// Mint identifier tags for scenarios without one, even when the
        /// configuration turns minting off
        #[arg(long)]
        mint_ids: bool,
    },

    /// Reconcile step-template groups from step files
    StepGroups(PassArgs),

    /// Reconcile step templates from step definitions
    Steps(PassArgs),

    /// Run every pass in one direction
    ///
    /// Examples:
    ///   testbridge sync                        # files to datastore
    ///   testbridge sync --direction db-to-fs   # datastore to files
    ///   testbridge sync --dry-run --json       # preview as JSON
    Sync {
        /// fs-to-db or db-to-fs
        #[arg(short, long, default_value_t = Direction::FsToDb)]
        direction: Direction,

        #[command(flatten)]
        args: PassArgs,
    },

    /// Write a default .testbridge/config.toml
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("testbridge").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_cases_with_mint_ids() {
        let cli = parse(&["cases", "--mint-ids", "--dry-run"]);
        assert_eq!(
            cli.command,
            Commands::Cases {
                args: PassArgs {
                    dry_run: true,
                    json: false,
                },
                mint_ids: true,
            }
        );
    }

    #[test]
    fn parse_sync_direction() {
        let cli = parse(&["sync", "--direction", "db-to-fs", "--json"]);
        match cli.command {
            Commands::Sync { direction, args } => {
                assert_eq!(direction, Direction::DbToFs);
                assert!(args.json);
                assert!(!args.dry_run);
            }
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn sync_defaults_to_fs_to_db() {
        let cli = parse(&["sync"]);
        assert!(matches!(
            cli.command,
            Commands::Sync {
                direction: Direction::FsToDb,
                ..
            }
        ));
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let err = Cli::try_parse_from(["testbridge", "sync", "--direction", "both"]).unwrap_err();
        assert!(err.to_string().contains("unknown direction"), "{err}");
    }

    #[test]
    fn verbose_is_global() {
        let cli = parse(&["locators", "-v"]);
        assert!(cli.verbose);
    }
}
