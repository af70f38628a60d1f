//! Module tree addressed by slash-delimited paths
//!
//! `"/users/admins"` names the module `admins` whose parent is the root-level
//! module `users`. Resolution creates missing ancestors on the way down and is
//! idempotent: resolving the same path twice creates nothing the second time.
//! Creation is read-then-create without locking, so passes must run serially.

use std::collections::{HashMap, HashSet};

use bridge_store::{Datastore, Id, Module};

use crate::reconcile::{ReconcileResult, dry_run_suffix};
use crate::{Error, Result};

/// Trimmed, non-empty segments of `path`, with `.` segments dropped.
pub fn segments(path: &str) -> Vec<&str> {
    path.split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Canonical form of `path`: `/a/b`.
pub fn normalize(path: &str) -> String {
    format!("/{}", segments(path).join("/"))
}

/// Resolve `path` to its leaf module, creating missing nodes.
///
/// # Errors
///
/// [`Error::EmptyPath`] when nothing is left after normalization. Datastore
/// errors propagate.
pub fn resolve(store: &mut dyn Datastore, path: &str) -> Result<Id> {
    let parts = segments(path);
    if parts.is_empty() {
        return Err(Error::EmptyPath {
            path: path.to_string(),
        });
    }

    let mut parent = None;
    for name in parts {
        let id = match store.find_module(name, parent) {
            Some(module) => module.id,
            None => {
                let id = store.create_module(name, parent)?;
                tracing::debug!("Created module '{}' under {:?}", name, parent);
                id
            }
        };
        parent = Some(id);
    }
    parent.ok_or_else(|| Error::EmptyPath {
        path: path.to_string(),
    })
}

/// Same traversal as [`resolve`] without creating anything.
pub fn find_by_path(store: &dyn Datastore, path: &str) -> Option<Id> {
    let parts = segments(path);
    if parts.is_empty() {
        return None;
    }
    let mut parent = None;
    for name in parts {
        parent = Some(store.find_module(name, parent)?.id);
    }
    parent
}

/// Materialized `/a/b` path of every module, keyed by id.
///
/// Modules whose ancestor chain is broken or cyclic are left out.
pub fn paths_by_id(store: &dyn Datastore) -> HashMap<Id, String> {
    let modules: HashMap<Id, Module> = store.modules().into_iter().map(|m| (m.id, m)).collect();
    let mut paths = HashMap::with_capacity(modules.len());

    for module in modules.values() {
        let mut names = vec![module.name.as_str()];
        let mut visited = HashSet::from([module.id]);
        let mut current = module.parent_id;
        let mut complete = true;
        while let Some(parent_id) = current {
            match modules.get(&parent_id) {
                Some(parent) if visited.insert(parent.id) => {
                    names.push(parent.name.as_str());
                    current = parent.parent_id;
                }
                _ => {
                    complete = false;
                    break;
                }
            }
        }
        if complete {
            names.reverse();
            paths.insert(module.id, format!("/{}", names.join("/")));
        }
    }
    paths
}

/// Every module with its materialized path, sorted by path.
pub fn all_with_paths(store: &dyn Datastore) -> Vec<(Module, String)> {
    let paths = paths_by_id(store);
    let mut out: Vec<(Module, String)> = store
        .modules()
        .into_iter()
        .filter_map(|m| {
            let path = paths.get(&m.id)?.clone();
            Some((m, path))
        })
        .collect();
    out.sort_by(|a, b| a.1.cmp(&b.1));
    out
}

/// Delete modules that own no child modules, locator groups or suites.
///
/// Works bottom-up, so a chain that empties out is removed entirely.
pub fn prune_empty(store: &mut dyn Datastore, dry_run: bool) -> Result<ReconcileResult> {
    let mut result = ReconcileResult::new("modules", dry_run);
    tracing::info!("Pruning empty modules{}", dry_run_suffix(dry_run));

    let modules = all_with_paths(store);
    result.existing = modules.len();
    let owners: HashSet<Id> = store
        .locator_groups()
        .iter()
        .map(|g| g.module_id)
        .chain(store.suites().iter().map(|s| s.module_id))
        .collect();

    let mut visited: HashSet<Id> = HashSet::new();
    let mut gone: HashSet<Id> = HashSet::new();
    loop {
        let mut progress = false;
        for (module, path) in &modules {
            if visited.contains(&module.id) || owners.contains(&module.id) {
                continue;
            }
            let has_children = modules
                .iter()
                .any(|(m, _)| m.parent_id == Some(module.id) && !gone.contains(&m.id));
            if has_children {
                continue;
            }
            visited.insert(module.id);

            if !dry_run
                && let Err(e) = store.delete_module(module.id)
            {
                if e.is_restrict() {
                    result.skip(path.clone(), e);
                } else {
                    result.error(format!("{path}: delete failed: {e}"));
                }
                continue;
            }
            tracing::debug!("Deleted empty module {}", path);
            result.deleted.push(path.clone());
            gone.insert(module.id);
            progress = true;
        }
        if !progress {
            break;
        }
    }

    let deleted: HashSet<&String> = result.deleted.iter().collect();
    result.unchanged = modules
        .iter()
        .map(|(_, path)| path)
        .filter(|path| !deleted.contains(path))
        .cloned()
        .collect();
    Ok(result)
}
