use std::collections::{HashMap, HashSet};

use bridge_content::feature::{FeatureStep, insert_scenario_tag};
use bridge_content::signature::{compile, match_against_all};
use bridge_content::{CompiledSignature, ParamSpec, StepIcon};
use bridge_fs::{NormalizedPath, io};
use bridge_store::{Datastore, Id, NewCaseStep, NewStepParameter, TestCase};

use super::{SuiteKey, same_set, scan_feature_files};
use crate::Result;
use crate::hierarchy::paths_by_id;
use crate::reconcile::{ArtifactKind, ReconcileOptions, ReconcileResult};
use crate::tags::{IdentifierTag, ensure_tags};

pub struct DesiredCase {
    identifier: IdentifierTag,
    title: String,
    description: String,
    /// Filter tags, identifier excluded
    tags: Vec<String>,
    steps: Vec<FeatureStep>,
    suite: SuiteKey,
}

struct CompiledTemplate {
    id: Id,
    icon: StepIcon,
    compiled: CompiledSignature,
    params: Vec<ParamSpec>,
}

/// Scenarios of every feature file, identified by their `@tc_` tag
pub struct Cases {
    root: NormalizedPath,
    options: ReconcileOptions,
    templates: Vec<CompiledTemplate>,
    /// Suites in a module holding an unparsable feature file
    unparsed_suites: HashSet<Id>,
}

impl Cases {
    pub fn new(root: NormalizedPath, options: ReconcileOptions) -> Self {
        Self {
            root,
            options,
            templates: Vec::new(),
            unparsed_suites: HashSet::new(),
        }
    }

    fn compile_templates(&mut self, store: &dyn Datastore, result: &mut ReconcileResult) {
        self.templates.clear();
        for template in store.templates() {
            match compile(&template.signature) {
                Ok(compiled) => {
                    let params = store
                        .template_params(template.id)
                        .into_iter()
                        .map(|p| ParamSpec {
                            name: p.name,
                            param_type: p.param_type,
                            order: p.order,
                        })
                        .collect();
                    self.templates.push(CompiledTemplate {
                        id: template.id,
                        icon: template.icon,
                        compiled,
                        params,
                    });
                }
                Err(e) => {
                    result.warn(format!(
                        "template '{}' cannot be matched: {e}",
                        template.signature
                    ));
                }
            }
        }
    }

    /// Steps bound to their templates, plus the text of unmatched steps.
    fn bind_steps(&self, steps: &[FeatureStep]) -> (Vec<NewCaseStep>, Vec<String>) {
        let mut bound = Vec::new();
        let mut unmatched = Vec::new();
        for step in steps {
            let text = step.full_text();
            let candidates = self
                .templates
                .iter()
                .map(|t| (t, &t.compiled, t.params.as_slice()));
            match match_against_all(&text, candidates) {
                Some((template, params)) => bound.push(NewCaseStep {
                    order: step.order,
                    text,
                    template_id: template.id,
                    icon: template.icon,
                    params: params
                        .into_iter()
                        .map(|p| NewStepParameter {
                            name: p.name,
                            value: p.value,
                            param_type: p.param_type,
                            order: p.order,
                        })
                        .collect(),
                }),
                None => unmatched.push(text),
            }
        }
        (bound, unmatched)
    }

    /// Tags, suite link and steps of a stored case.
    fn apply(
        &self,
        store: &mut dyn Datastore,
        case: Id,
        desired: &DesiredCase,
        result: &mut ReconcileResult,
    ) -> Result<()> {
        let names = std::iter::once(desired.identifier.as_str())
            .chain(desired.tags.iter().map(String::as_str));
        let tag_ids = ensure_tags(store, names)?;
        store.set_case_tags(case, &tag_ids)?;

        let suite = desired.suite.find_or_create(store)?;
        store.set_case_suites(case, &[suite])?;

        let (steps, unmatched) = self.bind_steps(&desired.steps);
        for text in unmatched {
            result.warn(format!(
                "{}: no template matches '{text}', step skipped",
                desired.identifier
            ));
        }
        store.replace_case_steps(case, &steps)?;
        Ok(())
    }

    fn identifier_of(
        store: &dyn Datastore,
        tag_names: &HashMap<Id, String>,
        case: Id,
    ) -> Option<IdentifierTag> {
        let names: Vec<&String> = store
            .case_tags(case)
            .iter()
            .filter_map(|id| tag_names.get(id))
            .collect();
        IdentifierTag::find_in(names)
    }

    fn tag_name_map(store: &dyn Datastore) -> HashMap<Id, String> {
        store.tags().into_iter().map(|t| (t.id, t.name)).collect()
    }
}

impl ArtifactKind for Cases {
    type Key = IdentifierTag;
    type Desired = DesiredCase;
    type Record = TestCase;

    const LABEL: &'static str = "test cases";

    fn scan(
        &mut self,
        store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<DesiredCase>> {
        self.compile_templates(store, result);

        let scan = scan_feature_files(&self.root, true, result)?;
        let paths = paths_by_id(store);
        self.unparsed_suites = store
            .suites()
            .into_iter()
            .filter(|s| {
                paths
                    .get(&s.module_id)
                    .is_some_and(|path| scan.unparsed_modules.contains(path))
            })
            .map(|s| s.id)
            .collect();

        let mut desired = Vec::new();
        for (module_path, file) in scan.files {
            let suite = SuiteKey {
                module_path,
                name: file.document.title.clone(),
            };
            let mut source = file.source.clone();
            let mut found = Vec::new();
            let mut minted = Vec::new();

            // Bottom-up, so inserting a tag line keeps earlier line numbers valid
            for scenario in file.document.scenarios.iter().rev() {
                let label = format!("{}:{} '{}'", file.path, scenario.line, scenario.title);
                let identifiers: Vec<IdentifierTag> = scenario
                    .tags
                    .iter()
                    .filter_map(|t| IdentifierTag::parse(t).ok())
                    .collect();

                let identifier = match identifiers.as_slice() {
                    [single] => single.clone(),
                    [] if !self.options.mint_identifiers => {
                        result.skip(label, "no identifier tag");
                        continue;
                    }
                    [] if self.options.dry_run => {
                        result.skip(label, "an identifier tag would be minted");
                        continue;
                    }
                    [] => {
                        let tag = IdentifierTag::mint();
                        source = insert_scenario_tag(&source, scenario, tag.as_str());
                        tracing::info!("Minted {} for {}", tag, label);
                        minted.push(tag.clone());
                        tag
                    }
                    _ => {
                        result.error(format!("{label}: more than one identifier tag"));
                        continue;
                    }
                };

                found.push(DesiredCase {
                    tags: scenario
                        .tags
                        .iter()
                        .filter(|t| IdentifierTag::parse(t).is_err())
                        .cloned()
                        .collect(),
                    identifier,
                    title: scenario.title.clone(),
                    description: scenario.description.clone(),
                    steps: scenario.steps.clone(),
                    suite: suite.clone(),
                });
            }

            if !minted.is_empty()
                && let Err(e) = io::write_text(&file.path, &source)
            {
                result.error(format!("{}: identifier write-back failed: {e}", file.path));
                found.retain(|c| !minted.contains(&c.identifier));
            }
            found.reverse();
            desired.extend(found);
        }
        Ok(desired)
    }

    fn key(&self, desired: &DesiredCase) -> IdentifierTag {
        desired.identifier.clone()
    }

    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<IdentifierTag>, TestCase)> {
        let names = Self::tag_name_map(store);
        store
            .test_cases()
            .into_iter()
            .map(|c| (Self::identifier_of(store, &names, c.id), c))
            .collect()
    }

    fn record_label(&self, store: &dyn Datastore, record: &TestCase) -> String {
        match Self::identifier_of(store, &Self::tag_name_map(store), record.id) {
            Some(identifier) => format!("{identifier} '{}'", record.title),
            None => format!("'{}' (no identifier)", record.title),
        }
    }

    fn diff(
        &self,
        store: &dyn Datastore,
        desired: &DesiredCase,
        record: &TestCase,
    ) -> Vec<&'static str> {
        let mut changes = Vec::new();
        if desired.title != record.title {
            changes.push("title");
        }
        if desired.description != record.description {
            changes.push("description");
        }

        let names = Self::tag_name_map(store);
        let stored_tags: Vec<String> = store
            .case_tags(record.id)
            .iter()
            .filter_map(|id| names.get(id))
            .filter(|name| IdentifierTag::parse(name).is_err())
            .cloned()
            .collect();
        if !same_set(&desired.tags, &stored_tags) {
            changes.push("tags");
        }

        let suite = desired.suite.find(store);
        let linked = store.case_suites(record.id);
        if suite.is_none() || linked != suite.into_iter().collect::<Vec<_>>() {
            changes.push("suite");
        }

        let (bound, _) = self.bind_steps(&desired.steps);
        let stored: Vec<(usize, String, Id)> = store
            .case_steps(record.id)
            .into_iter()
            .map(|s| (s.order, s.text, s.template_id))
            .collect();
        let wanted: Vec<(usize, String, Id)> = bound
            .into_iter()
            .map(|s| (s.order, s.text, s.template_id))
            .collect();
        if stored != wanted {
            changes.push("steps");
        }
        changes
    }

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredCase,
        result: &mut ReconcileResult,
    ) -> Result<()> {
        let id = store.create_test_case(&desired.title, &desired.description)?;
        self.apply(store, id, desired, result)
    }

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &DesiredCase,
        record: &TestCase,
        result: &mut ReconcileResult,
    ) -> Result<()> {
        store.update_test_case(&TestCase {
            title: desired.title.clone(),
            description: desired.description.clone(),
            ..record.clone()
        })?;
        self.apply(store, record.id, desired, result)
    }

    fn delete_guard(&self, store: &dyn Datastore, record: &TestCase) -> Option<String> {
        store
            .case_suites(record.id)
            .iter()
            .any(|suite| self.unparsed_suites.contains(suite))
            .then(|| "its feature file failed to parse".to_string())
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &TestCase) -> Result<()> {
        Ok(store.delete_test_case(record.id)?)
    }
}
