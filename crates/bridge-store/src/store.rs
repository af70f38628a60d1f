//! The datastore seam
//!
//! Reconciliation talks to storage only through [`Datastore`], injected as a
//! trait object. Implementations enforce the relational rules:
//!
//! - unique: module (name, parent), locator group name, locator (name, group),
//!   suite (name, module), tag name, step group name, template signature,
//!   case step order within a case
//! - restrict: a module with child modules, groups or suites; a locator group
//!   with locators; a step group with templates; a template referenced by
//!   case steps
//! - cascade (atomic): test case, template, suite, locator deletion

use bridge_content::{ParamSpec, StepKind};

use crate::error::Result;
use crate::model::*;

pub trait Datastore {
    // Modules
    fn modules(&self) -> Vec<Module>;
    fn find_module(&self, name: &str, parent_id: Option<Id>) -> Option<Module>;
    fn create_module(&mut self, name: &str, parent_id: Option<Id>) -> Result<Id>;
    fn delete_module(&mut self, id: Id) -> Result<()>;

    // Locator groups
    fn locator_groups(&self) -> Vec<LocatorGroup>;
    fn locator_group_by_name(&self, name: &str) -> Option<LocatorGroup>;
    fn create_locator_group(&mut self, name: &str, module_id: Id) -> Result<Id>;
    fn update_locator_group(&mut self, group: &LocatorGroup) -> Result<()>;
    fn delete_locator_group(&mut self, id: Id) -> Result<()>;

    // Locators
    fn locators(&self) -> Vec<Locator>;
    fn create_locator(&mut self, group_id: Id, name: &str, value: &str) -> Result<Id>;
    fn update_locator(&mut self, locator: &Locator) -> Result<()>;
    /// Also removes conflict records that reference the locator.
    fn delete_locator(&mut self, id: Id) -> Result<()>;

    // Conflicts
    fn conflicts(&self) -> Vec<ConflictResolution>;
    fn create_conflict(
        &mut self,
        entity_kind: &str,
        entity_id: Id,
        conflict_kind: ConflictKind,
        counterpart_id: Id,
    ) -> Result<Id>;

    // Tags
    fn tags(&self) -> Vec<Tag>;
    fn tag_by_name(&self, name: &str) -> Option<Tag>;
    fn create_tag(&mut self, name: &str, kind: TagKind) -> Result<Id>;
    fn update_tag(&mut self, tag: &Tag) -> Result<()>;

    // Suites
    fn suites(&self) -> Vec<TestSuite>;
    fn create_suite(&mut self, name: &str, description: &str, module_id: Id) -> Result<Id>;
    fn update_suite(&mut self, suite: &TestSuite) -> Result<()>;
    /// Also removes the suite's case and tag links.
    fn delete_suite(&mut self, id: Id) -> Result<()>;
    fn suite_tags(&self, suite_id: Id) -> Vec<Id>;
    fn set_suite_tags(&mut self, suite_id: Id, tag_ids: &[Id]) -> Result<()>;

    // Test cases
    fn test_cases(&self) -> Vec<TestCase>;
    fn create_test_case(&mut self, title: &str, description: &str) -> Result<Id>;
    fn update_test_case(&mut self, case: &TestCase) -> Result<()>;
    /// Atomic cascade: run results, reviews, tickets, step parameters, steps,
    /// tag and suite links, then the case.
    fn delete_test_case(&mut self, id: Id) -> Result<()>;
    fn case_tags(&self, case_id: Id) -> Vec<Id>;
    fn set_case_tags(&mut self, case_id: Id, tag_ids: &[Id]) -> Result<()>;
    fn case_suites(&self, case_id: Id) -> Vec<Id>;
    fn set_case_suites(&mut self, case_id: Id, suite_ids: &[Id]) -> Result<()>;
    fn case_steps(&self, case_id: Id) -> Vec<TestCaseStep>;
    fn step_parameters(&self, step_id: Id) -> Vec<StepParameter>;
    /// Atomically swap all steps (and their parameters) of a case.
    fn replace_case_steps(&mut self, case_id: Id, steps: &[NewCaseStep]) -> Result<()>;

    // Case satellites
    fn record_run(&mut self, case_id: Id, status: &str) -> Result<Id>;
    fn add_review(&mut self, case_id: Id, reviewer: &str, comment: &str) -> Result<Id>;
    fn link_ticket(&mut self, case_id: Id, key: &str) -> Result<Id>;
    fn run_results(&self, case_id: Id) -> Vec<TestRunResult>;
    fn reviews(&self, case_id: Id) -> Vec<TestCaseReview>;
    fn tickets(&self, case_id: Id) -> Vec<LinkedTicket>;

    // Step template groups
    fn step_groups(&self) -> Vec<TemplateStepGroup>;
    fn step_group_by_name(&self, name: &str) -> Option<TemplateStepGroup>;
    fn create_step_group(&mut self, name: &str, description: &str, kind: StepKind) -> Result<Id>;
    fn update_step_group(&mut self, group: &TemplateStepGroup) -> Result<()>;
    fn delete_step_group(&mut self, id: Id) -> Result<()>;

    // Step templates
    fn templates(&self) -> Vec<TemplateStep>;
    fn create_template(&mut self, template: &NewTemplate) -> Result<Id>;
    fn update_template(&mut self, template: &TemplateStep) -> Result<()>;
    /// Atomic: parameters, then the template. Restricted while case steps use it.
    fn delete_template(&mut self, id: Id) -> Result<()>;
    fn template_params(&self, template_id: Id) -> Vec<TemplateStepParameter>;
    fn set_template_params(&mut self, template_id: Id, params: &[ParamSpec]) -> Result<()>;
    /// Number of case steps bound to the template.
    fn template_usage(&self, template_id: Id) -> usize;
}
