use bridge_content::{GroupMeta, HarvestedTemplate, ParamSpec, harvest};
use bridge_fs::NormalizedPath;
use bridge_store::{Datastore, Id, NewTemplate, TemplateStep};

use super::scan_step_files;
use crate::Result;
use crate::reconcile::{ArtifactKind, ReconcileResult};

pub struct DesiredTemplate {
    group: GroupMeta,
    template: HarvestedTemplate,
}

/// Documented `When`/`Then` calls of every step-definition file
pub struct StepTemplates {
    root: NormalizedPath,
}

impl StepTemplates {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    /// Step group id for `group`, created when absent.
    fn group_id(store: &mut dyn Datastore, group: &GroupMeta) -> Result<Id> {
        if let Some(existing) = store.step_group_by_name(&group.name) {
            return Ok(existing.id);
        }
        Ok(store.create_step_group(&group.name, &group.description, group.kind)?)
    }
}

fn params_differ(stored: &[bridge_store::TemplateStepParameter], desired: &[ParamSpec]) -> bool {
    stored.len() != desired.len()
        || stored.iter().zip(desired).any(|(s, d)| {
            s.name != d.name || s.param_type != d.param_type || s.order != d.order
        })
}

impl ArtifactKind for StepTemplates {
    type Key = String;
    type Desired = DesiredTemplate;
    type Record = TemplateStep;

    const LABEL: &'static str = "step templates";

    fn scan(
        &mut self,
        _store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<DesiredTemplate>> {
        let mut desired = Vec::new();
        for file in scan_step_files(&self.root, result)? {
            let harvested = match harvest(&file.source) {
                Ok(harvested) => harvested,
                Err(e) => {
                    result.error(format!("{}: {e}", file.path));
                    continue;
                }
            };
            for warning in harvested.warnings {
                result.warn(format!("{}: {warning}", file.path));
            }
            for error in harvested.errors {
                result.error(format!("{}: {error}", file.path));
            }
            for template in harvested.templates {
                if template.kind != file.group.kind {
                    result.warn(format!(
                        "{}: '{}' is registered with {} in a {} group",
                        file.path,
                        template.signature,
                        template.kind.marker(),
                        file.group.kind
                    ));
                }
                desired.push(DesiredTemplate {
                    group: file.group.clone(),
                    template,
                });
            }
        }
        Ok(desired)
    }

    fn key(&self, desired: &DesiredTemplate) -> String {
        desired.template.signature.clone()
    }

    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<String>, TemplateStep)> {
        store
            .templates()
            .into_iter()
            .map(|t| (Some(t.signature.clone()), t))
            .collect()
    }

    fn record_label(&self, _store: &dyn Datastore, record: &TemplateStep) -> String {
        record.signature.clone()
    }

    fn diff(
        &self,
        store: &dyn Datastore,
        desired: &DesiredTemplate,
        record: &TemplateStep,
    ) -> Vec<&'static str> {
        let t = &desired.template;
        let mut changes = Vec::new();
        if t.meta.name != record.name {
            changes.push("name");
        }
        if t.meta.description != record.description {
            changes.push("description");
        }
        if t.meta.icon != record.icon {
            changes.push("icon");
        }
        if t.kind != record.kind {
            changes.push("kind");
        }
        if t.definition != record.definition {
            changes.push("definition");
        }
        let group_name = store
            .step_groups()
            .into_iter()
            .find(|g| g.id == record.group_id)
            .map(|g| g.name);
        if group_name.as_deref() != Some(desired.group.name.as_str()) {
            changes.push("group");
        }
        if params_differ(&store.template_params(record.id), &t.params) {
            changes.push("parameters");
        }
        changes
    }

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredTemplate,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        let t = &desired.template;
        let group_id = Self::group_id(store, &desired.group)?;
        let id = store.create_template(&NewTemplate {
            group_id,
            name: t.meta.name.clone(),
            description: t.meta.description.clone(),
            icon: t.meta.icon,
            signature: t.signature.clone(),
            definition: t.definition.clone(),
            kind: t.kind,
        })?;
        store.set_template_params(id, &t.params)?;
        Ok(())
    }

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredTemplate,
        record: &TemplateStep,
        _result: &mut ReconcileResult,
    ) -> Result<()> {
        let t = &desired.template;
        let group_id = Self::group_id(store, &desired.group)?;
        store.update_template(&TemplateStep {
            group_id,
            name: t.meta.name.clone(),
            description: t.meta.description.clone(),
            icon: t.meta.icon,
            definition: t.definition.clone(),
            kind: t.kind,
            ..record.clone()
        })?;
        if params_differ(&store.template_params(record.id), &t.params) {
            store.set_template_params(record.id, &t.params)?;
        }
        Ok(())
    }

    fn delete_guard(&self, store: &dyn Datastore, record: &TemplateStep) -> Option<String> {
        let usage = store.template_usage(record.id);
        (usage > 0).then(|| format!("used by {usage} test case steps"))
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &TemplateStep) -> Result<()> {
        Ok(store.delete_template(record.id)?)
    }
}
