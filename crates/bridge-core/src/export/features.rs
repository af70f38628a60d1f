use std::collections::{HashMap, HashSet};

use bridge_content::feature::{FeatureStep, discover_features, merge, render};
use bridge_content::generate::slug;
use bridge_content::{FeatureDocument, Keyword, Scenario};
use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, Id, TestCase};

use super::write_file;
use crate::Result;
use crate::hierarchy::{paths_by_id, segments};
use crate::kinds::{SuiteKey, feature_module_path};
use crate::reconcile::{ReconcileResult, dry_run_suffix};
use crate::tags::{IdentifierTag, tag_names};

/// Default file of a suite: `<root>/<module dirs>/<slug>.feature`.
fn default_path(root: &NormalizedPath, key: &SuiteKey) -> NormalizedPath {
    let mut path = root.clone();
    for segment in segments(&key.module_path) {
        path = path.join(segment);
    }
    path.join(&format!("{}.feature", slug(&key.name)))
}

fn feature_step(text: &str, order: usize) -> FeatureStep {
    let (keyword, rest) = Keyword::split(text).unwrap_or((Keyword::Given, text));
    FeatureStep {
        keyword,
        text: rest.to_string(),
        order,
        line: 0,
    }
}

fn scenario(store: &dyn Datastore, case: &TestCase, names: &HashMap<Id, String>) -> Scenario {
    let mut tags: Vec<String> = store
        .case_tags(case.id)
        .iter()
        .filter_map(|id| names.get(id).cloned())
        .collect();
    // Identifier first, filters in storage order
    tags.sort_by_key(|name| IdentifierTag::parse(name).is_err());

    let mut steps = store.case_steps(case.id);
    steps.sort_by_key(|s| s.order);
    Scenario {
        title: case.title.clone(),
        description: case.description.clone(),
        outline: false,
        tags,
        steps: steps.iter().map(|s| feature_step(&s.text, s.order)).collect(),
        line: 0,
        tag_line: None,
    }
}

fn identifier_key(scenario: &Scenario) -> Option<String> {
    scenario
        .tags
        .iter()
        .find(|t| IdentifierTag::parse(t).is_ok())
        .cloned()
}

/// Write one feature file per stored suite, its linked cases as scenarios.
///
/// A suite already backed by a file keeps that file and only the header,
/// tags and steps of its scenarios are edited; see [`merge`]. Feature files
/// without a stored suite are left in place and reported as skipped.
pub fn export_features(
    store: &dyn Datastore,
    root: &NormalizedPath,
    dry_run: bool,
) -> Result<ReconcileResult> {
    let mut result = ReconcileResult::new("feature files", dry_run);
    tracing::info!("Exporting suites to {}{}", root, dry_run_suffix(dry_run));

    let mut on_disk: HashMap<SuiteKey, (NormalizedPath, String)> = HashMap::new();
    if root.exists() {
        let scan = discover_features(root)?;
        result.existing = scan.files.len();
        for (path, message) in scan.errors {
            result.warn(format!("{path}: {message}"));
        }
        for file in scan.files {
            let Some(module_path) = feature_module_path(root, &file.path) else {
                continue;
            };
            let key = SuiteKey {
                module_path,
                name: file.document.title,
            };
            on_disk.entry(key).or_insert((file.path, file.source));
        }
    }

    let modules = paths_by_id(store);
    let names: HashMap<Id, String> = store.tags().into_iter().map(|t| (t.id, t.name)).collect();
    let cases = store.test_cases();
    let suites = store.suites();
    result.scanned = suites.len();

    let mut linked = HashSet::new();
    let mut exported = HashSet::new();
    for suite in &suites {
        let Some(module_path) = modules.get(&suite.module_id) else {
            result.error(format!("{}: suite has no module path", suite.name));
            continue;
        };
        let key = SuiteKey {
            module_path: module_path.clone(),
            name: suite.name.clone(),
        };

        let scenarios = cases
            .iter()
            .filter(|c| store.case_suites(c.id).contains(&suite.id))
            .inspect(|c| {
                linked.insert(c.id);
            })
            .map(|c| scenario(store, c, &names))
            .collect();
        let document = FeatureDocument {
            title: suite.name.clone(),
            description: suite.description.clone(),
            tags: tag_names(store, &store.suite_tags(suite.id)),
            scenarios,
        };

        let (path, content) = match on_disk.get(&key) {
            Some((path, source)) => (path.clone(), merge(source, &document, identifier_key)),
            None => (default_path(root, &key), render(&document)),
        };
        write_file(&path, &content, &mut result);
        exported.insert(key);
    }

    for case in cases.iter().filter(|c| !linked.contains(&c.id)) {
        result.warn(format!("'{}' is not linked to any suite, not exported", case.title));
    }
    let mut stale: Vec<&NormalizedPath> = on_disk
        .iter()
        .filter(|(key, _)| !exported.contains(*key))
        .map(|(_, (path, _))| path)
        .collect();
    stale.sort();
    for path in stale {
        result.skip(path.to_string(), "suite is not stored, file left in place");
    }
    result.log_summary();
    Ok(result)
}
