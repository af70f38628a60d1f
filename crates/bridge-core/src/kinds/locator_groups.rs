use std::collections::HashMap;

use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, Id, LocatorGroup};

use super::{module_id, scan_locator_files};
use crate::Result;
use crate::hierarchy::{normalize, paths_by_id};
use crate::reconcile::{ArtifactKind, ReconcileResult};

pub struct DesiredGroup {
    name: String,
    module_path: String,
}

/// One group per locator file; the module is the file's directory
pub struct LocatorGroups {
    root: NormalizedPath,
    map_path: Option<NormalizedPath>,
    module_paths: HashMap<Id, String>,
}

impl LocatorGroups {
    pub fn new(root: NormalizedPath, map_path: Option<NormalizedPath>) -> Self {
        Self {
            root,
            map_path,
            module_paths: HashMap::new(),
        }
    }
}

impl ArtifactKind for LocatorGroups {
    type Key = String;
    type Desired = DesiredGroup;
    type Record = LocatorGroup;

    const LABEL: &'static str = "locator groups";

    fn scan(
        &mut self,
        store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<DesiredGroup>> {
        self.module_paths = paths_by_id(store);
        let files = scan_locator_files(&self.root, self.map_path.as_ref(), false, result)?;
        Ok(files
            .into_iter()
            .map(|file| DesiredGroup {
                name: file.key.group,
                module_path: normalize(&file.key.module_path),
            })
            .collect())
    }

    fn key(&self, desired: &DesiredGroup) -> String {
        desired.name.clone()
    }

    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<String>, LocatorGroup)> {
        store
            .locator_groups()
            .into_iter()
            .map(|g| (Some(g.name.clone()), g))
            .collect()
    }

    fn record_label(&self, _store: &dyn Datastore, record: &LocatorGroup) -> String {
        record.name.clone()
    }

    fn diff(
        &self,
        _store: &dyn Datastore,
        desired: &DesiredGroup,
        record: &LocatorGroup,
    ) -> Vec<&'static str> {
        if self.module_paths.get(&record.module_id) == Some(&desired.module_path) {
            Vec::new()
        } else {
            vec!["module"]
        }
    }

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredGroup,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        let module = module_id(store, &desired.module_path)?;
        store.create_locator_group(&desired.name, module)?;
        Ok(())
    }

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredGroup,
        record: &LocatorGroup,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        let module = module_id(store, &desired.module_path)?;
        store.update_locator_group(&LocatorGroup {
            module_id: module,
            ..record.clone()
        })?;
        Ok(())
    }

    fn delete_guard(&self, store: &dyn Datastore, record: &LocatorGroup) -> Option<String> {
        let count = store
            .locators()
            .iter()
            .filter(|l| l.group_id == record.id)
            .count();
        (count > 0).then(|| format!("still has {count} locators"))
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &LocatorGroup) -> Result<()> {
        Ok(store.delete_locator_group(record.id)?)
    }
}
