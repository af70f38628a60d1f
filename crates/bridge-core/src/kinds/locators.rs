use std::collections::{HashMap, HashSet};
use std::fmt;

use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, Id, Locator};

use super::{module_id, scan_locator_files};
use crate::Result;
use crate::conflict::detect_conflicts;
use crate::reconcile::{ArtifactKind, ReconcileResult};

/// A locator is identified by its group name and its own name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocatorKey {
    pub group: String,
    pub name: String,
}

impl fmt::Display for LocatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.group, self.name)
    }
}

pub struct DesiredLocator {
    module_path: String,
    group: String,
    name: String,
    value: String,
}

/// Locator entries of every group file
pub struct Locators {
    root: NormalizedPath,
    map_path: Option<NormalizedPath>,
    /// Groups whose file failed to parse; their stored locators are kept.
    unparsed: HashSet<String>,
}

impl Locators {
    pub fn new(root: NormalizedPath, map_path: Option<NormalizedPath>) -> Self {
        Self {
            root,
            map_path,
            unparsed: HashSet::new(),
        }
    }

    fn group_name(store: &dyn Datastore, record: &Locator) -> Option<String> {
        store
            .locator_groups()
            .into_iter()
            .find(|g| g.id == record.group_id)
            .map(|g| g.name)
    }

    /// Group id for `desired`, creating the group (and its modules) when absent.
    fn group_id(store: &mut dyn Datastore, desired: &DesiredLocator) -> Result<Id> {
        if let Some(group) = store.locator_group_by_name(&desired.group) {
            return Ok(group.id);
        }
        let module = module_id(store, &desired.module_path)?;
        Ok(store.create_locator_group(&desired.group, module)?)
    }

    fn report_conflicts(
        store: &mut dyn Datastore,
        locator: Id,
        desired: &DesiredLocator,
        group: Id,
        result: &mut ReconcileResult,
    ) -> Result<()> {
        let found = detect_conflicts(store, locator, &desired.name, &desired.value, group)?;
        if found > 0 {
            result.warn(format!(
                "{}/{}: {} new conflict records",
                desired.group, desired.name, found
            ));
        }
        Ok(())
    }
}

impl ArtifactKind for Locators {
    type Key = LocatorKey;
    type Desired = DesiredLocator;
    type Record = Locator;

    const LABEL: &'static str = "locators";

    fn scan(
        &mut self,
        _store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<DesiredLocator>> {
        self.unparsed.clear();
        let mut desired = Vec::new();
        for file in scan_locator_files(&self.root, self.map_path.as_ref(), true, result)? {
            let Some(entries) = file.entries else {
                self.unparsed.insert(file.key.group);
                continue;
            };
            desired.extend(entries.into_iter().map(|(name, value)| DesiredLocator {
                module_path: file.key.module_path.clone(),
                group: file.key.group.clone(),
                name,
                value,
            }));
        }
        Ok(desired)
    }

    fn key(&self, desired: &DesiredLocator) -> LocatorKey {
        LocatorKey {
            group: desired.group.clone(),
            name: desired.name.clone(),
        }
    }

    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<LocatorKey>, Locator)> {
        let groups: HashMap<Id, String> = store
            .locator_groups()
            .into_iter()
            .map(|g| (g.id, g.name))
            .collect();
        store
            .locators()
            .into_iter()
            .map(|l| {
                let key = groups.get(&l.group_id).map(|group| LocatorKey {
                    group: group.clone(),
                    name: l.name.clone(),
                });
                (key, l)
            })
            .collect()
    }

    fn record_label(&self, store: &dyn Datastore, record: &Locator) -> String {
        match Self::group_name(store, record) {
            Some(group) => format!("{}/{}", group, record.name),
            None => record.name.clone(),
        }
    }

    fn diff(
        &self,
        _store: &dyn Datastore,
        desired: &DesiredLocator,
        record: &Locator,
    ) -> Vec<&'static str> {
        if desired.value == record.value {
            Vec::new()
        } else {
            vec!["value"]
        }
    }

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredLocator,
        result: &mut ReconcileResult,
    ) -> Result<()> {
        let group = Self::group_id(store, desired)?;
        let id = store.create_locator(group, &desired.name, &desired.value)?;
        Self::report_conflicts(store, id, desired, group, result)
    }

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredLocator,
        record: &Locator,
        result: &mut ReconcileResult,
    ) -> Result<()> {
        store.update_locator(&Locator {
            value: desired.value.clone(),
            ..record.clone()
        })?;
        Self::report_conflicts(store, record.id, desired, record.group_id, result)
    }

    fn delete_guard(&self, store: &dyn Datastore, record: &Locator) -> Option<String> {
        Self::group_name(store, record)
            .filter(|group| self.unparsed.contains(group))
            .map(|_| "source file failed to parse".to_string())
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &Locator) -> Result<()> {
        Ok(store.delete_locator(record.id)?)
    }
}
