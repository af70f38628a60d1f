use std::collections::{HashMap, HashSet};
use std::fmt;

use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, Id, TestSuite};

use super::{module_id, same_set, scan_feature_files};
use crate::Result;
use crate::hierarchy::{find_by_path, paths_by_id};
use crate::reconcile::{ArtifactKind, ReconcileResult};
use crate::tags::{ensure_tags, tag_names};

/// A suite is identified by its module path and its name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SuiteKey {
    pub module_path: String,
    pub name: String,
}

impl fmt::Display for SuiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module_path.trim_end_matches('/'), self.name)
    }
}

impl SuiteKey {
    /// Id of the stored suite with this key.
    pub fn find(&self, store: &dyn Datastore) -> Option<Id> {
        let module = find_by_path(store, &self.module_path)?;
        store
            .suites()
            .into_iter()
            .find(|s| s.module_id == module && s.name == self.name)
            .map(|s| s.id)
    }

    /// Id of the suite with this key, created (with its modules) when absent.
    pub fn find_or_create(&self, store: &mut dyn Datastore) -> Result<Id> {
        if let Some(id) = self.find(store) {
            return Ok(id);
        }
        let module = module_id(store, &self.module_path)?;
        Ok(store.create_suite(&self.name, "", module)?)
    }
}

pub struct DesiredSuite {
    key: SuiteKey,
    description: String,
    tags: Vec<String>,
}

/// One suite per feature file: the `Feature:` title within the file's directory module
pub struct Suites {
    root: NormalizedPath,
    module_paths: HashMap<Id, String>,
    unparsed_modules: HashSet<String>,
}

impl Suites {
    pub fn new(root: NormalizedPath) -> Self {
        Self {
            root,
            module_paths: HashMap::new(),
            unparsed_modules: HashSet::new(),
        }
    }

    fn apply_tags(store: &mut dyn Datastore, suite: Id, tags: &[String]) -> Result<()> {
        let ids = ensure_tags(store, tags.iter().map(String::as_str))?;
        store.set_suite_tags(suite, &ids)?;
        Ok(())
    }
}

impl ArtifactKind for Suites {
    type Key = SuiteKey;
    type Desired = DesiredSuite;
    type Record = TestSuite;

    const LABEL: &'static str = "suites";

    fn scan(
        &mut self,
        store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<DesiredSuite>> {
        self.module_paths = paths_by_id(store);
        let scan = scan_feature_files(&self.root, true, result)?;
        self.unparsed_modules = scan.unparsed_modules;
        Ok(scan
            .files
            .into_iter()
            .map(|(module_path, file)| DesiredSuite {
                key: SuiteKey {
                    module_path,
                    name: file.document.title,
                },
                description: file.document.description,
                tags: file.document.tags,
            })
            .collect())
    }

    fn key(&self, desired: &DesiredSuite) -> SuiteKey {
        desired.key.clone()
    }

    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<SuiteKey>, TestSuite)> {
        let paths = paths_by_id(store);
        store
            .suites()
            .into_iter()
            .map(|s| {
                let key = paths.get(&s.module_id).map(|module_path| SuiteKey {
                    module_path: module_path.clone(),
                    name: s.name.clone(),
                });
                (key, s)
            })
            .collect()
    }

    fn record_label(&self, _store: &dyn Datastore, record: &TestSuite) -> String {
        match self.module_paths.get(&record.module_id) {
            Some(path) => format!("{path}/{}", record.name),
            None => record.name.clone(),
        }
    }

    fn diff(
        &self,
        store: &dyn Datastore,
        desired: &DesiredSuite,
        record: &TestSuite,
    ) -> Vec<&'static str> {
        let mut changes = Vec::new();
        if desired.description != record.description {
            changes.push("description");
        }
        if !same_set(&desired.tags, &tag_names(store, &store.suite_tags(record.id))) {
            changes.push("tags");
        }
        changes
    }

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredSuite,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        let module = module_id(store, &desired.key.module_path)?;
        let id = store.create_suite(&desired.key.name, &desired.description, module)?;
        Self::apply_tags(store, id, &desired.tags)
    }

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredSuite,
        record: &TestSuite,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        store.update_suite(&TestSuite {
            description: desired.description.clone(),
            ..record.clone()
        })?;
        Self::apply_tags(store, record.id, &desired.tags)
    }

    fn delete_guard(&self, _store: &dyn Datastore, record: &TestSuite) -> Option<String> {
        self.module_paths
            .get(&record.module_id)
            .filter(|path| self.unparsed_modules.contains(*path))
            .map(|_| "a feature file in its module failed to parse".to_string())
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &TestSuite) -> Result<()> {
        Ok(store.delete_suite(record.id)?)
    }
}
