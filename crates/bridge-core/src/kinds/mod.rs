//! The concrete artifact kinds driven by [`crate::reconcile`]
//!
//! Children find-or-create their parents (a locator creates its group, a
//! template its step group, a test case its suite), so each parent pass can
//! sweep with a restrict guard and a full pass stays idempotent in the order
//! locators, locator groups, step templates, step groups, suites, cases.
//!
//! Records owned by a file that fails to parse are never swept; the file is
//! reported and its records wait for the next clean scan.

mod cases;
mod locator_groups;
mod locators;
mod step_groups;
mod step_templates;
mod suites;

pub use cases::Cases;
pub use locator_groups::LocatorGroups;
pub use locators::{LocatorKey, Locators};
pub use step_groups::StepGroups;
pub use step_templates::StepTemplates;
pub use suites::{SuiteKey, Suites};

use std::collections::HashSet;

use bridge_blocks::find_leading_block;
use bridge_content::feature::{FeatureFile, discover_features};
use bridge_content::locator::parse_locator_file;
use bridge_content::{GroupMeta, LocatorFileKey};
use bridge_fs::{NormalizedPath, discover_files, io};
use bridge_store::{Datastore, Id};

use crate::Result;
use crate::hierarchy;
use crate::reconcile::ReconcileResult;

/// A locator group file found on disk.
pub(crate) struct LocatorFile {
    pub path: NormalizedPath,
    pub key: LocatorFileKey,
    /// Parsed entries; `None` when the file could not be parsed.
    pub entries: Option<Vec<(String, String)>>,
}

/// Every locator group file under `root`, excluding the map index.
///
/// Misplaced files are errors. Unparsable files are reported only when
/// `report_parse_errors` is set, so one problem is not reported by two passes.
pub(crate) fn scan_locator_files(
    root: &NormalizedPath,
    map_path: Option<&NormalizedPath>,
    report_parse_errors: bool,
    result: &mut ReconcileResult,
) -> Result<Vec<LocatorFile>> {
    let mut files = Vec::new();
    for path in discover_files(root, "json")? {
        if map_path == Some(&path) {
            continue;
        }
        let key = match LocatorFileKey::from_path(root, &path) {
            Ok(key) => key,
            Err(e) => {
                result.error(e.to_string());
                continue;
            }
        };
        let entries = match io::read_text(&path)
            .map_err(crate::Error::from)
            .and_then(|text| Ok(parse_locator_file(&text, path.as_str())?))
        {
            Ok(entries) => Some(entries),
            Err(e) => {
                if report_parse_errors {
                    result.error(e.to_string());
                }
                None
            }
        };
        files.push(LocatorFile { path, key, entries });
    }
    Ok(files)
}

/// A step-definition file with a valid leading group block.
pub(crate) struct StepFile {
    pub path: NormalizedPath,
    pub source: String,
    pub group: GroupMeta,
}

/// Every `.ts` file under `root` that declares a step group.
///
/// Files without a leading `@type` block are not step files and are skipped
/// with a warning. An invalid block is an error.
pub(crate) fn scan_step_files(
    root: &NormalizedPath,
    result: &mut ReconcileResult,
) -> Result<Vec<StepFile>> {
    let mut files = Vec::new();
    for path in discover_files(root, "ts")? {
        let source = match io::read_text(&path) {
            Ok(source) => source,
            Err(e) => {
                result.error(e.to_string());
                continue;
            }
        };
        let Some(block) = find_leading_block(&source, "type") else {
            result.skip(path.to_string(), "no leading step group block");
            continue;
        };
        match GroupMeta::from_block(&block.metadata) {
            Ok(group) => files.push(StepFile {
                path,
                source,
                group,
            }),
            Err(e) => result.error(format!("{path}: {e}")),
        }
    }
    Ok(files)
}

/// Module path of a feature file: its directory relative to `root`.
///
/// Features directly in the root have no module.
pub(crate) fn feature_module_path(root: &NormalizedPath, path: &NormalizedPath) -> Option<String> {
    let relative = path.strip_prefix(root)?;
    let dirs: Vec<&str> = relative.components().collect();
    let modules = &dirs[..dirs.len().saturating_sub(1)];
    (!modules.is_empty()).then(|| format!("/{}", modules.join("/")))
}

/// Feature files found by [`scan_feature_files`].
pub(crate) struct ScannedFeatures {
    /// Parsed files paired with their module path.
    pub files: Vec<(String, FeatureFile)>,
    /// Module paths holding a file that failed to parse. Records in these
    /// modules cannot be told apart from that file's, so they are not swept.
    pub unparsed_modules: HashSet<String>,
}

/// Every feature file under `root`.
pub(crate) fn scan_feature_files(
    root: &NormalizedPath,
    report_errors: bool,
    result: &mut ReconcileResult,
) -> Result<ScannedFeatures> {
    let scan = discover_features(root)?;
    let mut unparsed_modules = HashSet::new();
    for (path, message) in &scan.errors {
        if report_errors {
            result.error(format!("{path}: {message}"));
        }
        if let Some(module) = feature_module_path(root, path) {
            unparsed_modules.insert(module);
        }
    }
    let mut files = Vec::new();
    for file in scan.files {
        match feature_module_path(root, &file.path) {
            Some(module) => files.push((module, file)),
            None if report_errors => {
                result.error(format!("{}: must live inside a module directory", file.path));
            }
            None => {}
        }
    }
    Ok(ScannedFeatures {
        files,
        unparsed_modules,
    })
}

/// Module id of `module_path`, created when missing.
pub(crate) fn module_id(store: &mut dyn Datastore, module_path: &str) -> Result<Id> {
    hierarchy::resolve(store, module_path)
}

/// Case-sensitive set comparison of two name lists.
pub(crate) fn same_set(a: &[String], b: &[String]) -> bool {
    let mut a: Vec<&String> = a.iter().collect();
    let mut b: Vec<&String> = b.iter().collect();
    a.sort();
    a.dedup();
    b.sort();
    b.dedup();
    a == b
}
