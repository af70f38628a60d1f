//! Sync driver
//!
//! [`Bridge`] ties a repository root, its configuration and a datastore
//! together and runs passes in dependency order, in either direction.

use std::fmt;
use std::str::FromStr;

use bridge_content::Formatter;
use bridge_fs::NormalizedPath;
use bridge_store::Datastore;
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::config::Config;
use crate::export::{export_features, export_locators, export_steps};
use crate::hierarchy::prune_empty;
use crate::kinds::{Cases, LocatorGroups, Locators, StepGroups, StepTemplates, Suites};
use crate::reconcile::{ReconcileOptions, ReconcileResult, reconcile, upsert};

/// One filesystem-to-datastore pass, listed in full-sync order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
    Locators,
    LocatorGroups,
    StepTemplates,
    StepGroups,
    Suites,
    Cases,
    Modules,
}

/// Which side is the source of truth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    #[default]
    FsToDb,
    DbToFs,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FsToDb => f.write_str("fs-to-db"),
            Self::DbToFs => f.write_str("db-to-fs"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "fs-to-db" => Ok(Self::FsToDb),
            "db-to-fs" => Ok(Self::DbToFs),
            other => Err(format!("unknown direction '{other}', expected fs-to-db or db-to-fs")),
        }
    }
}

/// Results of a full sync, one per pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    pub direction: Direction,
    pub dry_run: bool,
    pub passes: Vec<ReconcileResult>,
}

impl SyncReport {
    pub fn has_errors(&self) -> bool {
        self.passes.iter().any(ReconcileResult::has_errors)
    }

    pub fn has_changes(&self) -> bool {
        self.passes.iter().any(ReconcileResult::has_changes)
    }

    pub fn error_count(&self) -> usize {
        self.passes.iter().map(|p| p.errors.len()).sum()
    }
}

/// A repository bound to a datastore
pub struct Bridge<'a> {
    root: NormalizedPath,
    config: Config,
    store: &'a mut dyn Datastore,
    formatter: Box<dyn Formatter>,
}

impl<'a> Bridge<'a> {
    /// Bind `root` to `store`, using the formatter named by `config`.
    pub fn new(root: NormalizedPath, config: Config, store: &'a mut dyn Datastore) -> Self {
        let formatter = config.formatter();
        Self {
            root,
            config,
            store,
            formatter,
        }
    }

    /// Replace the formatter used for generated step files.
    pub fn with_formatter(mut self, formatter: Box<dyn Formatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a single filesystem-to-datastore pass.
    pub fn run(&mut self, pass: Pass, options: &ReconcileOptions) -> Result<ReconcileResult> {
        let root = &self.root;
        let config = &self.config;
        let store = &mut *self.store;
        match pass {
            Pass::Locators => reconcile(
                &mut Locators::new(config.locators_root(root), config.locator_map_path(root)),
                store,
                options,
            ),
            Pass::LocatorGroups => reconcile(
                &mut LocatorGroups::new(config.locators_root(root), config.locator_map_path(root)),
                store,
                options,
            ),
            Pass::StepTemplates => {
                reconcile(&mut StepTemplates::new(config.steps_root(root)), store, options)
            }
            Pass::StepGroups => {
                reconcile(&mut StepGroups::new(config.steps_root(root)), store, options)
            }
            Pass::Suites => reconcile(&mut Suites::new(config.features_root(root)), store, options),
            Pass::Cases => reconcile(
                &mut Cases::new(config.features_root(root), options.clone()),
                store,
                options,
            ),
            Pass::Modules => prune_empty(store, options.dry_run),
        }
    }

    /// Every pass, filesystem to datastore, reported in [`Pass`] order.
    ///
    /// Templates and step groups are upserted before cases so new signatures
    /// can be matched, and swept after them so a template the cases just
    /// stopped using is removed in the same run.
    pub fn sync_to_store(&mut self, options: &ReconcileOptions) -> Result<SyncReport> {
        let locators = self.run(Pass::Locators, options)?;
        let locator_groups = self.run(Pass::LocatorGroups, options)?;

        let steps_root = self.config.steps_root(&self.root);
        let mut templates = StepTemplates::new(steps_root.clone());
        let mut step_groups = StepGroups::new(steps_root);
        let pending_templates = upsert(&mut templates, &mut *self.store, options)?;
        let pending_groups = upsert(&mut step_groups, &mut *self.store, options)?;

        let suites = self.run(Pass::Suites, options)?;
        let cases = self.run(Pass::Cases, options)?;

        let templates = pending_templates.sweep(&mut templates, &mut *self.store, options);
        let step_groups = pending_groups.sweep(&mut step_groups, &mut *self.store, options);
        let modules = self.run(Pass::Modules, options)?;

        Ok(SyncReport {
            direction: Direction::FsToDb,
            dry_run: options.dry_run,
            passes: vec![
                locators,
                locator_groups,
                templates,
                step_groups,
                suites,
                cases,
                modules,
            ],
        })
    }

    /// Render the datastore back into step, locator and feature files.
    pub fn sync_to_files(&mut self, dry_run: bool) -> Result<SyncReport> {
        let root = &self.root;
        let config = &self.config;
        let store = &*self.store;
        let passes = vec![
            export_steps(
                store,
                &config.steps_root(root),
                &config.steps.required_imports,
                self.formatter.as_ref(),
                dry_run,
            )?,
            export_locators(
                store,
                &config.locators_root(root),
                config.locator_map_path(root).as_ref(),
                dry_run,
            )?,
            export_features(store, &config.features_root(root), dry_run)?,
        ];
        Ok(SyncReport {
            direction: Direction::DbToFs,
            dry_run,
            passes,
        })
    }

    /// Sync in `direction`. Identifier minting only applies to `FsToDb`.
    pub fn sync(&mut self, direction: Direction, options: &ReconcileOptions) -> Result<SyncReport> {
        match direction {
            Direction::FsToDb => self.sync_to_store(options),
            Direction::DbToFs => self.sync_to_files(options.dry_run),
        }
    }
}
