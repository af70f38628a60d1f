//! Datastore to filesystem exporters
//!
//! Each exporter renders the stored artifacts of one kind and writes only the
//! files whose text changed. Results use the same [`ReconcileResult`] shape as
//! the filesystem passes, labeled by file path.

mod features;
mod locators;
mod steps;

pub use features::export_features;
pub use locators::export_locators;
pub use steps::export_steps;

use bridge_fs::{NormalizedPath, io};

use crate::reconcile::ReconcileResult;

/// Write `content` to `path` unless it is already there.
///
/// The path is recorded as created, updated or unchanged. Nothing is written
/// in a dry run.
pub(crate) fn write_file(path: &NormalizedPath, content: &str, result: &mut ReconcileResult) {
    let label = path.to_string();
    let current = match io::read_text_opt(path) {
        Ok(current) => current,
        Err(e) => {
            result.error(e.to_string());
            return;
        }
    };
    if current.as_deref() == Some(content) {
        tracing::debug!("{} is up to date", label);
        result.unchanged.push(label);
        return;
    }
    if !result.dry_run
        && let Err(e) = io::write_text(path, content)
    {
        result.error(e.to_string());
        return;
    }
    tracing::debug!("Wrote {}", label);
    match current {
        Some(_) => result.updated.push(label),
        None => result.created.push(label),
    }
}

/// Delete a file the datastore no longer accounts for.
pub(crate) fn remove_file(path: &NormalizedPath, result: &mut ReconcileResult) {
    if !result.dry_run
        && let Err(e) = io::remove_file(path)
    {
        result.error(e.to_string());
        return;
    }
    result.deleted.push(path.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_file_classifies_outcomes() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("a/b.json"));
        let mut result = ReconcileResult::new("files", false);

        write_file(&path, "one", &mut result);
        write_file(&path, "one", &mut result);
        write_file(&path, "two", &mut result);

        assert_eq!(result.created, vec![path.to_string()]);
        assert_eq!(result.unchanged, vec![path.to_string()]);
        assert_eq!(result.updated, vec![path.to_string()]);
        assert_eq!(io::read_text(&path).unwrap(), "two");
    }

    #[test]
    fn dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path().join("x.feature"));
        let mut result = ReconcileResult::new("files", true);

        write_file(&path, "Feature: X\n", &mut result);
        assert_eq!(result.created.len(), 1);
        assert!(!path.exists());

        std::fs::write(path.to_native(), "stale").unwrap();
        remove_file(&path, &mut result);
        assert_eq!(result.deleted.len(), 1);
        assert!(path.exists());
    }
}
