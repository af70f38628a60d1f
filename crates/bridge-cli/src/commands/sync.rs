//! Reconciliation commands: the single passes and the full sync
//!
//! Both load the configuration and the datastore snapshot, run, print, and
//! save the snapshot back unless nothing could have changed it.

use std::path::Path;

use bridge_core::{Bridge, Config, ConfigResolver, Direction, Pass, ReconcileOptions};
use bridge_fs::NormalizedPath;
use bridge_store::MemoryStore;
use colored::Colorize;

use super::report::{print_json, print_report, print_result};
use crate::cli::PassArgs;
use crate::error::Result;

fn load(path: &Path) -> Result<(NormalizedPath, Config, MemoryStore)> {
    let root = NormalizedPath::new(path);
    let config = ConfigResolver::new(root.clone()).resolve()?;
    let store = MemoryStore::load(&config.store_path(&root).to_native())?;
    Ok((root, config, store))
}

fn save(root: &NormalizedPath, config: &Config, store: &MemoryStore) -> Result<()> {
    let path = config.store_path(root);
    store.save(&path.to_native())?;
    tracing::debug!("Datastore saved to {}", path);
    Ok(())
}

/// Run one filesystem-to-datastore pass.
///
/// `mint_ids` only matters for [`Pass::Cases`]; it adds to, never removes,
/// the configured minting.
pub fn run_pass(path: &Path, pass: Pass, args: &PassArgs, mint_ids: bool) -> Result<bool> {
    let (root, config, mut store) = load(path)?;
    let options = ReconcileOptions {
        dry_run: args.dry_run,
        mint_identifiers: config.sync.mint_identifiers || mint_ids,
    };

    if !args.json {
        println!("{} Reconciling {:?} from {}", "=>".blue().bold(), pass, root.as_str().cyan());
    }
    let result = Bridge::new(root.clone(), config.clone(), &mut store).run(pass, &options)?;

    if !args.dry_run {
        save(&root, &config, &store)?;
    }
    if args.json {
        print_json(&result)?;
    } else {
        print_result(&result);
    }
    Ok(!result.has_errors())
}

/// Run every pass in `direction`.
pub fn run_sync(path: &Path, direction: Direction, args: &PassArgs) -> Result<bool> {
    let (root, config, mut store) = load(path)?;
    let options = ReconcileOptions {
        dry_run: args.dry_run,
        mint_identifiers: config.sync.mint_identifiers,
    };

    if !args.json {
        println!("{} Syncing {} in {}", "=>".blue().bold(), direction, root.as_str().cyan());
    }
    let report = Bridge::new(root.clone(), config.clone(), &mut store).sync(direction, &options)?;

    // Exporting reads the datastore without changing it
    if !args.dry_run && direction == Direction::FsToDb {
        save(&root, &config, &store)?;
    }
    if args.json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(!report.has_errors())
}
