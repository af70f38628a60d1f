//! Human-readable and JSON rendering of pass results

use bridge_core::{ReconcileResult, SyncReport};
use colored::Colorize;

use crate::error::Result;

/// Print one pass: a summary line, then every non-empty item list.
pub fn print_result(result: &ReconcileResult) {
    let status = if result.has_errors() {
        "FAILED".red().bold()
    } else if result.has_changes() {
        "CHANGED".yellow().bold()
    } else {
        "OK".green().bold()
    };
    let suffix = if result.dry_run { " (dry run)" } else { "" };
    println!(
        "{} {}{}: {} scanned, {} existing, {} created, {} updated, {} unchanged, {} deleted, {} skipped",
        status,
        result.kind.cyan(),
        suffix.dimmed(),
        result.scanned,
        result.existing,
        result.created.len(),
        result.updated.len(),
        result.unchanged.len(),
        result.deleted.len(),
        result.skipped.len(),
    );

    print_items("created", "+".green().to_string(), &result.created);
    print_items("updated", "~".yellow().to_string(), &result.updated);
    print_items("deleted", "-".red().to_string(), &result.deleted);
    print_items("skipped", "?".dimmed().to_string(), &result.skipped);
    print_items("warnings", "!".yellow().to_string(), &result.warnings);
    print_items("errors", "x".red().bold().to_string(), &result.errors);
}

fn print_items(heading: &str, bullet: String, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {}:", heading.bold());
    for item in items {
        println!("   {} {}", bullet, item);
    }
}

/// Print every pass of a sync followed by a one-line total.
pub fn print_report(report: &SyncReport) {
    for pass in &report.passes {
        print_result(pass);
    }
    println!();

    let errors = report.error_count();
    if errors > 0 {
        println!(
            "{} {} finished with {} error(s).",
            "FAILED".red().bold(),
            report.direction,
            errors
        );
    } else if report.has_changes() {
        let verb = if report.dry_run { "would change" } else { "changed" };
        println!("{} {} {} files or records.", "OK".green().bold(), report.direction, verb);
    } else {
        println!("{} {} is already in sync.", "OK".green().bold(), report.direction);
    }
}

/// Print any serializable report as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
