//! In-process relational store with JSON snapshot persistence

use std::fs::File;
use std::io::Read;
use std::path::Path;

use bridge_content::{ParamSpec, StepKind};
use bridge_fs::NormalizedPath;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::*;
use crate::store::Datastore;

const SNAPSHOT_VERSION: &str = "1";

fn default_version() -> String {
    SNAPSHOT_VERSION.to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct Tables {
    #[serde(default = "default_version")]
    version: String,
    next_id: Id,
    modules: Vec<Module>,
    locator_groups: Vec<LocatorGroup>,
    locators: Vec<Locator>,
    conflicts: Vec<ConflictResolution>,
    tags: Vec<Tag>,
    suites: Vec<TestSuite>,
    /// (suite, tag)
    suite_tags: Vec<(Id, Id)>,
    test_cases: Vec<TestCase>,
    /// (case, tag)
    case_tags: Vec<(Id, Id)>,
    /// (case, suite)
    case_suites: Vec<(Id, Id)>,
    case_steps: Vec<TestCaseStep>,
    step_parameters: Vec<StepParameter>,
    step_groups: Vec<TemplateStepGroup>,
    templates: Vec<TemplateStep>,
    template_params: Vec<TemplateStepParameter>,
    run_results: Vec<TestRunResult>,
    reviews: Vec<TestCaseReview>,
    tickets: Vec<LinkedTicket>,
}

impl Tables {
    fn next_id(&mut self) -> Id {
        self.next_id += 1;
        self.next_id
    }
}

/// A [`Datastore`] kept in memory and persisted as a JSON snapshot.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    tables: Tables,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Tables {
                version: default_version(),
                ..Tables::default()
            },
        }
    }

    /// Load a snapshot with a shared lock. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Corrupt`] when the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No datastore snapshot at {}, starting empty", path.display());
            return Ok(Self::new());
        }

        let file = File::open(path)?;
        file.lock_shared()?;
        let mut content = String::new();
        (&file).read_to_string(&mut content)?;

        let tables: Tables = serde_json::from_str(&content).map_err(|e| Error::Corrupt {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if tables.version != SNAPSHOT_VERSION {
            return Err(Error::Corrupt {
                path: path.to_path_buf(),
                message: format!("unsupported snapshot version {}", tables.version),
            });
        }
        Ok(Self { tables })
    }

    /// Save the snapshot atomically (locked temp file, then rename).
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(&self.tables)?;
        bridge_fs::io::write_atomic(&NormalizedPath::new(path), content.as_bytes())?;
        tracing::debug!("Saved datastore snapshot to {}", path.display());
        Ok(())
    }

    /// Run `f` against a copy of the tables and commit only on success.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut Tables) -> Result<T>) -> Result<T> {
        let mut staged = self.tables.clone();
        let out = f(&mut staged)?;
        self.tables = staged;
        Ok(out)
    }
}

fn restrict(entity: &'static str, id: Id, dependents: &'static str, count: usize) -> Result<()> {
    if count > 0 {
        return Err(Error::RestrictViolation {
            entity,
            id,
            dependents,
            count,
        });
    }
    Ok(())
}

fn position<T>(rows: &[T], id: Id, entity: &'static str, get: impl Fn(&T) -> Id) -> Result<usize> {
    rows.iter()
        .position(|r| get(r) == id)
        .ok_or_else(|| Error::not_found(entity, id))
}

fn cascade_case(t: &mut Tables, id: Id) -> Result<()> {
    position(&t.test_cases, id, "test case", |c| c.id)?;
    t.run_results.retain(|r| r.case_id != id);
    t.reviews.retain(|r| r.case_id != id);
    t.tickets.retain(|r| r.case_id != id);
    let step_ids: Vec<Id> = t
        .case_steps
        .iter()
        .filter(|s| s.case_id == id)
        .map(|s| s.id)
        .collect();
    t.step_parameters.retain(|p| !step_ids.contains(&p.step_id));
    t.case_steps.retain(|s| s.case_id != id);
    t.case_tags.retain(|(c, _)| *c != id);
    t.case_suites.retain(|(c, _)| *c != id);
    t.test_cases.retain(|c| c.id != id);
    Ok(())
}

fn insert_steps(t: &mut Tables, case_id: Id, steps: &[NewCaseStep]) -> Result<()> {
    let mut orders = std::collections::HashSet::new();
    for step in steps {
        if !orders.insert(step.order) {
            return Err(Error::unique("case step", format!("{case_id}#{}", step.order)));
        }
        position(&t.templates, step.template_id, "template", |s| s.id)?;
        let step_id = t.next_id();
        t.case_steps.push(TestCaseStep {
            id: step_id,
            case_id,
            order: step.order,
            text: step.text.clone(),
            template_id: step.template_id,
            icon: step.icon,
        });
        for param in &step.params {
            let id = t.next_id();
            t.step_parameters.push(StepParameter {
                id,
                step_id,
                name: param.name.clone(),
                value: param.value.clone(),
                param_type: param.param_type,
                order: param.order,
            });
        }
    }
    Ok(())
}

impl Datastore for MemoryStore {
    fn modules(&self) -> Vec<Module> {
        self.tables.modules.clone()
    }

    fn find_module(&self, name: &str, parent_id: Option<Id>) -> Option<Module> {
        self.tables
            .modules
            .iter()
            .find(|m| m.name == name && m.parent_id == parent_id)
            .cloned()
    }

    fn create_module(&mut self, name: &str, parent_id: Option<Id>) -> Result<Id> {
        if self.find_module(name, parent_id).is_some() {
            return Err(Error::unique("module", name));
        }
        if let Some(parent) = parent_id {
            position(&self.tables.modules, parent, "module", |m| m.id)?;
        }
        let id = self.tables.next_id();
        self.tables.modules.push(Module {
            id,
            name: name.to_string(),
            parent_id,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn delete_module(&mut self, id: Id) -> Result<()> {
        let t = &self.tables;
        let idx = position(&t.modules, id, "module", |m| m.id)?;
        let children = t.modules.iter().filter(|m| m.parent_id == Some(id)).count();
        restrict("module", id, "child modules", children)?;
        let groups = t.locator_groups.iter().filter(|g| g.module_id == id).count();
        restrict("module", id, "locator groups", groups)?;
        let suites = t.suites.iter().filter(|s| s.module_id == id).count();
        restrict("module", id, "suites", suites)?;
        self.tables.modules.remove(idx);
        Ok(())
    }

    fn locator_groups(&self) -> Vec<LocatorGroup> {
        self.tables.locator_groups.clone()
    }

    fn locator_group_by_name(&self, name: &str) -> Option<LocatorGroup> {
        self.tables
            .locator_groups
            .iter()
            .find(|g| g.name == name)
            .cloned()
    }

    fn create_locator_group(&mut self, name: &str, module_id: Id) -> Result<Id> {
        if self.locator_group_by_name(name).is_some() {
            return Err(Error::unique("locator group", name));
        }
        position(&self.tables.modules, module_id, "module", |m| m.id)?;
        let id = self.tables.next_id();
        self.tables.locator_groups.push(LocatorGroup {
            id,
            name: name.to_string(),
            route: None,
            module_id,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_locator_group(&mut self, group: &LocatorGroup) -> Result<()> {
        if self
            .tables
            .locator_groups
            .iter()
            .any(|g| g.name == group.name && g.id != group.id)
        {
            return Err(Error::unique("locator group", &group.name));
        }
        position(&self.tables.modules, group.module_id, "module", |m| m.id)?;
        let idx = position(&self.tables.locator_groups, group.id, "locator group", |g| g.id)?;
        self.tables.locator_groups[idx] = LocatorGroup {
            updated_at: Utc::now(),
            ..group.clone()
        };
        Ok(())
    }

    fn delete_locator_group(&mut self, id: Id) -> Result<()> {
        let idx = position(&self.tables.locator_groups, id, "locator group", |g| g.id)?;
        let count = self.tables.locators.iter().filter(|l| l.group_id == id).count();
        restrict("locator group", id, "locators", count)?;
        self.tables.locator_groups.remove(idx);
        Ok(())
    }

    fn locators(&self) -> Vec<Locator> {
        self.tables.locators.clone()
    }

    fn create_locator(&mut self, group_id: Id, name: &str, value: &str) -> Result<Id> {
        position(&self.tables.locator_groups, group_id, "locator group", |g| g.id)?;
        if self
            .tables
            .locators
            .iter()
            .any(|l| l.group_id == group_id && l.name == name)
        {
            return Err(Error::unique("locator", format!("{name} in group {group_id}")));
        }
        let id = self.tables.next_id();
        self.tables.locators.push(Locator {
            id,
            name: name.to_string(),
            value: value.to_string(),
            group_id,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_locator(&mut self, locator: &Locator) -> Result<()> {
        if self
            .tables
            .locators
            .iter()
            .any(|l| l.group_id == locator.group_id && l.name == locator.name && l.id != locator.id)
        {
            return Err(Error::unique("locator", &locator.name));
        }
        let idx = position(&self.tables.locators, locator.id, "locator", |l| l.id)?;
        self.tables.locators[idx] = Locator {
            updated_at: Utc::now(),
            ..locator.clone()
        };
        Ok(())
    }

    fn delete_locator(&mut self, id: Id) -> Result<()> {
        self.atomically(|t| {
            position(&t.locators, id, "locator", |l| l.id)?;
            t.conflicts.retain(|c| {
                !(c.entity_kind == "locator" && (c.entity_id == id || c.counterpart_id == id))
            });
            t.locators.retain(|l| l.id != id);
            Ok(())
        })
    }

    fn conflicts(&self) -> Vec<ConflictResolution> {
        self.tables.conflicts.clone()
    }

    fn create_conflict(
        &mut self,
        entity_kind: &str,
        entity_id: Id,
        conflict_kind: ConflictKind,
        counterpart_id: Id,
    ) -> Result<Id> {
        let id = self.tables.next_id();
        self.tables.conflicts.push(ConflictResolution {
            id,
            entity_kind: entity_kind.to_string(),
            entity_id,
            conflict_kind,
            counterpart_id,
            resolved: false,
        });
        Ok(id)
    }

    fn tags(&self) -> Vec<Tag> {
        self.tables.tags.clone()
    }

    fn tag_by_name(&self, name: &str) -> Option<Tag> {
        self.tables.tags.iter().find(|t| t.name == name).cloned()
    }

    fn create_tag(&mut self, name: &str, kind: TagKind) -> Result<Id> {
        if self.tag_by_name(name).is_some() {
            return Err(Error::unique("tag", name));
        }
        let id = self.tables.next_id();
        self.tables.tags.push(Tag {
            id,
            name: name.to_string(),
            kind,
        });
        Ok(id)
    }

    fn update_tag(&mut self, tag: &Tag) -> Result<()> {
        let idx = position(&self.tables.tags, tag.id, "tag", |t| t.id)?;
        self.tables.tags[idx] = tag.clone();
        Ok(())
    }

    fn suites(&self) -> Vec<TestSuite> {
        self.tables.suites.clone()
    }

    fn create_suite(&mut self, name: &str, description: &str, module_id: Id) -> Result<Id> {
        position(&self.tables.modules, module_id, "module", |m| m.id)?;
        if self
            .tables
            .suites
            .iter()
            .any(|s| s.name == name && s.module_id == module_id)
        {
            return Err(Error::unique("suite", name));
        }
        let id = self.tables.next_id();
        self.tables.suites.push(TestSuite {
            id,
            name: name.to_string(),
            description: description.to_string(),
            module_id,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_suite(&mut self, suite: &TestSuite) -> Result<()> {
        let idx = position(&self.tables.suites, suite.id, "suite", |s| s.id)?;
        self.tables.suites[idx] = TestSuite {
            updated_at: Utc::now(),
            ..suite.clone()
        };
        Ok(())
    }

    fn delete_suite(&mut self, id: Id) -> Result<()> {
        self.atomically(|t| {
            position(&t.suites, id, "suite", |s| s.id)?;
            t.suite_tags.retain(|(s, _)| *s != id);
            t.case_suites.retain(|(_, s)| *s != id);
            t.suites.retain(|s| s.id != id);
            Ok(())
        })
    }

    fn suite_tags(&self, suite_id: Id) -> Vec<Id> {
        self.tables
            .suite_tags
            .iter()
            .filter(|(s, _)| *s == suite_id)
            .map(|(_, t)| *t)
            .collect()
    }

    fn set_suite_tags(&mut self, suite_id: Id, tag_ids: &[Id]) -> Result<()> {
        position(&self.tables.suites, suite_id, "suite", |s| s.id)?;
        self.tables.suite_tags.retain(|(s, _)| *s != suite_id);
        for tag in tag_ids {
            if !self.tables.suite_tags.contains(&(suite_id, *tag)) {
                self.tables.suite_tags.push((suite_id, *tag));
            }
        }
        Ok(())
    }

    fn test_cases(&self) -> Vec<TestCase> {
        self.tables.test_cases.clone()
    }

    fn create_test_case(&mut self, title: &str, description: &str) -> Result<Id> {
        let id = self.tables.next_id();
        self.tables.test_cases.push(TestCase {
            id,
            title: title.to_string(),
            description: description.to_string(),
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_test_case(&mut self, case: &TestCase) -> Result<()> {
        let idx = position(&self.tables.test_cases, case.id, "test case", |c| c.id)?;
        self.tables.test_cases[idx] = TestCase {
            updated_at: Utc::now(),
            ..case.clone()
        };
        Ok(())
    }

    fn delete_test_case(&mut self, id: Id) -> Result<()> {
        self.atomically(|t| cascade_case(t, id))
    }

    fn case_tags(&self, case_id: Id) -> Vec<Id> {
        self.tables
            .case_tags
            .iter()
            .filter(|(c, _)| *c == case_id)
            .map(|(_, t)| *t)
            .collect()
    }

    fn set_case_tags(&mut self, case_id: Id, tag_ids: &[Id]) -> Result<()> {
        position(&self.tables.test_cases, case_id, "test case", |c| c.id)?;
        self.tables.case_tags.retain(|(c, _)| *c != case_id);
        for tag in tag_ids {
            if !self.tables.case_tags.contains(&(case_id, *tag)) {
                self.tables.case_tags.push((case_id, *tag));
            }
        }
        Ok(())
    }

    fn case_suites(&self, case_id: Id) -> Vec<Id> {
        self.tables
            .case_suites
            .iter()
            .filter(|(c, _)| *c == case_id)
            .map(|(_, s)| *s)
            .collect()
    }

    fn set_case_suites(&mut self, case_id: Id, suite_ids: &[Id]) -> Result<()> {
        position(&self.tables.test_cases, case_id, "test case", |c| c.id)?;
        self.tables.case_suites.retain(|(c, _)| *c != case_id);
        for suite in suite_ids {
            if !self.tables.case_suites.contains(&(case_id, *suite)) {
                self.tables.case_suites.push((case_id, *suite));
            }
        }
        Ok(())
    }

    fn case_steps(&self, case_id: Id) -> Vec<TestCaseStep> {
        let mut steps: Vec<TestCaseStep> = self
            .tables
            .case_steps
            .iter()
            .filter(|s| s.case_id == case_id)
            .cloned()
            .collect();
        steps.sort_by_key(|s| s.order);
        steps
    }

    fn step_parameters(&self, step_id: Id) -> Vec<StepParameter> {
        let mut params: Vec<StepParameter> = self
            .tables
            .step_parameters
            .iter()
            .filter(|p| p.step_id == step_id)
            .cloned()
            .collect();
        params.sort_by_key(|p| p.order);
        params
    }

    fn replace_case_steps(&mut self, case_id: Id, steps: &[NewCaseStep]) -> Result<()> {
        self.atomically(|t| {
            position(&t.test_cases, case_id, "test case", |c| c.id)?;
            let old: Vec<Id> = t
                .case_steps
                .iter()
                .filter(|s| s.case_id == case_id)
                .map(|s| s.id)
                .collect();
            t.step_parameters.retain(|p| !old.contains(&p.step_id));
            t.case_steps.retain(|s| s.case_id != case_id);
            insert_steps(t, case_id, steps)
        })
    }

    fn record_run(&mut self, case_id: Id, status: &str) -> Result<Id> {
        position(&self.tables.test_cases, case_id, "test case", |c| c.id)?;
        let id = self.tables.next_id();
        self.tables.run_results.push(TestRunResult {
            id,
            case_id,
            status: status.to_string(),
            ran_at: Utc::now(),
        });
        Ok(id)
    }

    fn add_review(&mut self, case_id: Id, reviewer: &str, comment: &str) -> Result<Id> {
        position(&self.tables.test_cases, case_id, "test case", |c| c.id)?;
        let id = self.tables.next_id();
        self.tables.reviews.push(TestCaseReview {
            id,
            case_id,
            reviewer: reviewer.to_string(),
            comment: comment.to_string(),
        });
        Ok(id)
    }

    fn link_ticket(&mut self, case_id: Id, key: &str) -> Result<Id> {
        position(&self.tables.test_cases, case_id, "test case", |c| c.id)?;
        let id = self.tables.next_id();
        self.tables.tickets.push(LinkedTicket {
            id,
            case_id,
            key: key.to_string(),
        });
        Ok(id)
    }

    fn run_results(&self, case_id: Id) -> Vec<TestRunResult> {
        self.tables
            .run_results
            .iter()
            .filter(|r| r.case_id == case_id)
            .cloned()
            .collect()
    }

    fn reviews(&self, case_id: Id) -> Vec<TestCaseReview> {
        self.tables
            .reviews
            .iter()
            .filter(|r| r.case_id == case_id)
            .cloned()
            .collect()
    }

    fn tickets(&self, case_id: Id) -> Vec<LinkedTicket> {
        self.tables
            .tickets
            .iter()
            .filter(|r| r.case_id == case_id)
            .cloned()
            .collect()
    }

    fn step_groups(&self) -> Vec<TemplateStepGroup> {
        self.tables.step_groups.clone()
    }

    fn step_group_by_name(&self, name: &str) -> Option<TemplateStepGroup> {
        self.tables
            .step_groups
            .iter()
            .find(|g| g.name == name)
            .cloned()
    }

    fn create_step_group(&mut self, name: &str, description: &str, kind: StepKind) -> Result<Id> {
        if self.step_group_by_name(name).is_some() {
            return Err(Error::unique("step group", name));
        }
        let id = self.tables.next_id();
        self.tables.step_groups.push(TemplateStepGroup {
            id,
            name: name.to_string(),
            description: description.to_string(),
            kind,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_step_group(&mut self, group: &TemplateStepGroup) -> Result<()> {
        let idx = position(&self.tables.step_groups, group.id, "step group", |g| g.id)?;
        self.tables.step_groups[idx] = TemplateStepGroup {
            updated_at: Utc::now(),
            ..group.clone()
        };
        Ok(())
    }

    fn delete_step_group(&mut self, id: Id) -> Result<()> {
        let idx = position(&self.tables.step_groups, id, "step group", |g| g.id)?;
        let count = self.tables.templates.iter().filter(|s| s.group_id == id).count();
        restrict("step group", id, "templates", count)?;
        self.tables.step_groups.remove(idx);
        Ok(())
    }

    fn templates(&self) -> Vec<TemplateStep> {
        self.tables.templates.clone()
    }

    fn create_template(&mut self, template: &NewTemplate) -> Result<Id> {
        position(&self.tables.step_groups, template.group_id, "step group", |g| g.id)?;
        if self
            .tables
            .templates
            .iter()
            .any(|s| s.signature == template.signature)
        {
            return Err(Error::unique("template", &template.signature));
        }
        let id = self.tables.next_id();
        self.tables.templates.push(TemplateStep {
            id,
            group_id: template.group_id,
            name: template.name.clone(),
            description: template.description.clone(),
            icon: template.icon,
            signature: template.signature.clone(),
            definition: template.definition.clone(),
            kind: template.kind,
            updated_at: Utc::now(),
        });
        Ok(id)
    }

    fn update_template(&mut self, template: &TemplateStep) -> Result<()> {
        if self
            .tables
            .templates
            .iter()
            .any(|s| s.signature == template.signature && s.id != template.id)
        {
            return Err(Error::unique("template", &template.signature));
        }
        position(&self.tables.step_groups, template.group_id, "step group", |g| g.id)?;
        let idx = position(&self.tables.templates, template.id, "template", |s| s.id)?;
        self.tables.templates[idx] = TemplateStep {
            updated_at: Utc::now(),
            ..template.clone()
        };
        Ok(())
    }

    fn delete_template(&mut self, id: Id) -> Result<()> {
        let usage = self.template_usage(id);
        self.atomically(|t| {
            position(&t.templates, id, "template", |s| s.id)?;
            restrict("template", id, "case steps", usage)?;
            t.template_params.retain(|p| p.template_id != id);
            t.templates.retain(|s| s.id != id);
            Ok(())
        })
    }

    fn template_params(&self, template_id: Id) -> Vec<TemplateStepParameter> {
        let mut params: Vec<TemplateStepParameter> = self
            .tables
            .template_params
            .iter()
            .filter(|p| p.template_id == template_id)
            .cloned()
            .collect();
        params.sort_by_key(|p| p.order);
        params
    }

    fn set_template_params(&mut self, template_id: Id, params: &[ParamSpec]) -> Result<()> {
        self.atomically(|t| {
            position(&t.templates, template_id, "template", |s| s.id)?;
            t.template_params.retain(|p| p.template_id != template_id);
            for param in params {
                let id = t.next_id();
                t.template_params.push(TemplateStepParameter {
                    id,
                    template_id,
                    name: param.name.clone(),
                    param_type: param.param_type,
                    order: param.order,
                });
            }
            Ok(())
        })
    }

    fn template_usage(&self, template_id: Id) -> usize {
        self.tables
            .case_steps
            .iter()
            .filter(|s| s.template_id == template_id)
            .count()
    }
}
