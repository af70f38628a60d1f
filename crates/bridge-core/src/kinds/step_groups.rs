use bridge_content::GroupMeta;
use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, TemplateStepGroup};

use super::scan_step_files;
use crate::Result;
use crate::reconcile::{ArtifactKind, ReconcileResult};

/// Leading group blocks of every step-definition file
pub struct StepGroups {
    root: NormalizedPath,
}

impl StepGroups {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }
}

impl ArtifactKind for StepGroups {
    type Key = String;
    type Desired = GroupMeta;
    type Record = TemplateStepGroup;

    const LABEL: &'static str = "step groups";

    fn scan(
        &mut self,
        _store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<GroupMeta>> {
        Ok(scan_step_files(&self.root, result)?
            .into_iter()
            .map(|file| file.group)
            .collect())
    }

    fn key(&self, desired: &GroupMeta) -> String {
        desired.name.clone()
    }

    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<String>, TemplateStepGroup)> {
        store
            .step_groups()
            .into_iter()
            .map(|g| (Some(g.name.clone()), g))
            .collect()
    }

    fn record_label(&self, _store: &dyn Datastore, record: &TemplateStepGroup) -> String {
        record.name.clone()
    }

    fn diff(
        &self,
        _store: &dyn Datastore,
        desired: &GroupMeta,
        record: &TemplateStepGroup,
    ) -> Vec<&'static str> {
        let mut changes = Vec::new();
        if desired.description != record.description {
            changes.push("description");
        }
        if desired.kind != record.kind {
            changes.push("kind");
        }
        changes
    }

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &GroupMeta,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        store.create_step_group(&desired.name, &desired.description, desired.kind)?;
        Ok(())
    }

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &GroupMeta,
        record: &TemplateStepGroup,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        store.update_step_group(&TemplateStepGroup {
            description: desired.description.clone(),
            kind: desired.kind,
            ..record.clone()
        })?;
        Ok(())
    }

    fn delete_guard(&self, store: &dyn Datastore, record: &TemplateStepGroup) -> Option<String> {
        let count = store
            .templates()
            .iter()
            .filter(|t| t.group_id == record.id)
            .count();
        (count > 0).then(|| format!("still has {count} templates"))
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &TemplateStepGroup) -> Result<()> {
        Ok(store.delete_step_group(record.id)?)
    }
}
