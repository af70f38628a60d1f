//! Parsing, matching and editing of testbridge's filesystem artifacts
//!
//! - [`feature`]: Gherkin-like feature documents (parse, render, tag write-back)
//! - [`signature`]: step signatures compiled to regexes, typed parameter extraction
//! - [`metadata`]: step kinds, icons and validated metadata blocks
//! - [`imports`], [`editor`], [`ast`]: surgical editing of step-definition files
//! - [`generate`]: step-definition file rendering and incremental update
//! - [`locator`]: locator group files and the locator map index
//! - [`format`]: the external formatter hook

pub mod ast;
pub mod edit;
pub mod editor;
pub mod error;
pub mod feature;
pub mod format;
pub mod generate;
pub mod imports;
pub mod locator;
pub mod metadata;
pub mod signature;

pub use ast::{Harvest, HarvestedTemplate, harvest};
pub use edit::{Edit, EditKind};
pub use editor::{CallSpan, StepBlock, find_step_block, remove_step_block, upsert_step_block};
pub use error::{Error, Result};
pub use feature::{FeatureDocument, FeatureFile, FeatureScan, Keyword, Scenario, discover_features};
pub use format::{CommandFormatter, Formatter, NoopFormatter, format_or_original};
pub use generate::{GeneratedStep, render_step_file, step_file_path, update_step_file};
pub use locator::{LocatorFileKey, LocatorMap, LocatorMapEntry};
pub use metadata::{GroupMeta, StepIcon, StepKind, TemplateMeta};
pub use signature::{CompiledSignature, ExtractedParameter, ParamSpec, ParamType};
