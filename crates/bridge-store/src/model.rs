//! Stored entities
//!
//! Records mirror the platform's relational tables. Ids are assigned by the
//! store; `updated_at` is refreshed on every create and update.

use bridge_content::{ParamType, StepIcon, StepKind};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Row identifier.
pub type Id = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: Id,
    pub name: String,
    pub parent_id: Option<Id>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorGroup {
    pub id: Id,
    /// Globally unique.
    pub name: String,
    /// Page route the group applies to. Only edited through the UI.
    pub route: Option<String>,
    pub module_id: Id,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub id: Id,
    pub name: String,
    pub value: String,
    pub group_id: Id,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictKind {
    DuplicateName,
    DuplicateValue,
}

/// One side of a symmetric conflict pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
    pub id: Id,
    pub entity_kind: String,
    pub entity_id: Id,
    pub conflict_kind: ConflictKind,
    pub counterpart_id: Id,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestSuite {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub module_id: Id,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TagKind {
    /// The immutable identity tag of a test case (`@tc_...`).
    Identifier,
    /// Any other tag, used for filtering runs.
    Filter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Id,
    /// Name without the leading `@`.
    pub name: String,
    pub kind: TagKind,
}

impl Tag {
    /// The tag as written in feature files.
    pub fn expression(&self) -> String {
        format!("@{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: Id,
    pub title: String,
    pub description: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseStep {
    pub id: Id,
    pub case_id: Id,
    /// Unique within the case.
    pub order: usize,
    /// Step text as written, keyword included.
    pub text: String,
    pub template_id: Id,
    pub icon: StepIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepParameter {
    pub id: Id,
    pub step_id: Id,
    pub name: String,
    pub value: String,
    pub param_type: ParamType,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStepGroup {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub kind: StepKind,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStep {
    pub id: Id,
    pub group_id: Id,
    pub name: String,
    pub description: String,
    pub icon: StepIcon,
    /// Globally unique.
    pub signature: String,
    /// Verbatim call-expression source.
    pub definition: String,
    pub kind: StepKind,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateStepParameter {
    pub id: Id,
    pub template_id: Id,
    pub name: String,
    pub param_type: ParamType,
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRunResult {
    pub id: Id,
    pub case_id: Id,
    pub status: String,
    pub ran_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCaseReview {
    pub id: Id,
    pub case_id: Id,
    pub reviewer: String,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedTicket {
    pub id: Id,
    pub case_id: Id,
    pub key: String,
}

/// Fields of a template to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTemplate {
    pub group_id: Id,
    pub name: String,
    pub description: String,
    pub icon: StepIcon,
    pub signature: String,
    pub definition: String,
    pub kind: StepKind,
}

/// A parameter value of a new test case step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStepParameter {
    pub name: String,
    pub value: String,
    pub param_type: ParamType,
    pub order: usize,
}

/// A test case step to insert, with its parameter values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCaseStep {
    pub order: usize,
    pub text: String,
    pub template_id: Id,
    pub icon: StepIcon,
    pub params: Vec<NewStepParameter>,
}
