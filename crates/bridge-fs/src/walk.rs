//! Recursive artifact discovery

use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Recursively discover files under `root` whose extension matches `extension`.
///
/// Hidden directories (leading `.`) are skipped. Results are sorted so every
/// pass visits files in the same order regardless of directory listing order.
///
/// # Errors
///
/// Returns [`Error::ScanRootMissing`] when `root` is not a directory. Errors
/// on individual entries below the root are logged and skipped.
pub fn discover_files(root: &NormalizedPath, extension: &str) -> Result<Vec<NormalizedPath>> {
    if !root.is_dir() {
        return Err(Error::ScanRootMissing {
            path: root.to_native(),
        });
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root.to_native())
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with('.'))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {}: {}", root, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = NormalizedPath::new(entry.path());
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(path);
        }
    }

    files.sort();
    tracing::debug!("Discovered {} .{} files under {}", files.len(), extension, root);
    Ok(files)
}
