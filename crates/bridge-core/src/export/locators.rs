use std::collections::HashSet;

use bridge_content::LocatorMap;
use bridge_content::locator::{locator_file_path, render_locator_file};
use bridge_fs::{NormalizedPath, io};
use bridge_store::Datastore;

use super::{remove_file, write_file};
use crate::Result;
use crate::hierarchy::paths_by_id;
use crate::kinds::scan_locator_files;
use crate::reconcile::{ReconcileResult, dry_run_suffix};

/// Write one JSON file per stored locator group and refresh the locator map.
///
/// Group files that no stored group accounts for (deleted or moved groups)
/// are removed.
pub fn export_locators(
    store: &dyn Datastore,
    root: &NormalizedPath,
    map_path: Option<&NormalizedPath>,
    dry_run: bool,
) -> Result<ReconcileResult> {
    let mut result = ReconcileResult::new("locator files", dry_run);
    tracing::info!("Exporting locator groups to {}{}", root, dry_run_suffix(dry_run));

    let mut scan = ReconcileResult::new("locator files", dry_run);
    let files = if root.exists() {
        scan_locator_files(root, map_path, false, &mut scan)?
    } else {
        Vec::new()
    };
    result.existing = files.len();

    let modules = paths_by_id(store);
    let locators = store.locators();
    let groups = store.locator_groups();
    result.scanned = groups.len();

    let mut written = HashSet::new();
    let mut map_entries = Vec::new();
    for group in &groups {
        let Some(module_path) = modules.get(&group.module_id) else {
            result.error(format!("{}: group has no module path", group.name));
            continue;
        };
        let entries: Vec<(String, String)> = locators
            .iter()
            .filter(|l| l.group_id == group.id)
            .map(|l| (l.name.clone(), l.value.clone()))
            .collect();
        let path = locator_file_path(root, module_path, &group.name);
        let content = match render_locator_file(&entries) {
            Ok(content) => content,
            Err(e) => {
                result.error(format!("{path}: {e}"));
                continue;
            }
        };
        write_file(&path, &content, &mut result);
        if let Some(relative) = path.strip_prefix(root) {
            map_entries.push((group.name.clone(), relative.to_string()));
        }
        written.insert(path);
    }

    for file in &files {
        if !written.contains(&file.path) {
            remove_file(&file.path, &mut result);
        }
    }

    if let Some(map_path) = map_path {
        update_map(map_path, &map_entries, &mut result);
    }
    result.log_summary();
    Ok(result)
}

/// Bring the locator map in line with `entries` (`(group name, relative path)`).
///
/// A stored entry whose path matches but whose name differs is a renamed
/// group and is renamed in place, keeping its position.
fn update_map(
    map_path: &NormalizedPath,
    entries: &[(String, String)],
    result: &mut ReconcileResult,
) {
    let current = match io::read_text_opt(map_path) {
        Ok(current) => current,
        Err(e) => {
            result.error(e.to_string());
            return;
        }
    };
    let mut map = match LocatorMap::parse(current.as_deref().unwrap_or_default()) {
        Ok(map) => map,
        Err(e) => {
            result.error(format!("{map_path}: {e}"));
            return;
        }
    };

    for (name, path) in entries {
        let renamed_from = map
            .entries()
            .iter()
            .find(|e| e.path == *path && e.name != *name)
            .map(|e| e.name.clone());
        match renamed_from {
            Some(old_name) => map.rename(&old_name, name, path),
            None => map.add(name, path),
        };
    }
    let keep: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    map.retain_names(&keep);

    match map.render() {
        Ok(text) => write_file(map_path, &text, result),
        Err(e) => result.error(format!("{map_path}: {e}")),
    }
}
