//! The generic filesystem-to-datastore reconciliation algorithm
//!
//! Every artifact kind goes through the same steps:
//!
//! 1. scan the filesystem into desired items
//! 2. key each item canonically, rejecting duplicate keys
//! 3. create absent records, update changed ones, leave the rest
//! 4. sweep stored records whose key was not seen, honoring usage guards
//!
//! [`reconcile`] runs all four. [`upsert`] stops after the third and hands
//! back a [`PendingSweep`] for the caller to finish later.
//!
//! Failures are scoped to the item: they land in [`ReconcileResult::errors`]
//! and the pass continues. Only a failing scan (for example a missing scan
//! root) aborts the pass.

use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use std::hash::Hash;

use bridge_store::Datastore;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Options shared by every pass
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Report intended changes without writing anything
    pub dry_run: bool,
    /// Mint identifier tags for scenarios that lack one
    pub mint_identifiers: bool,
}

/// Outcome of one pass, itemized by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileResult {
    /// What was reconciled, e.g. `locators`
    pub kind: String,
    pub dry_run: bool,
    /// Desired items found on the filesystem
    pub scanned: usize,
    /// Records found in the datastore
    pub existing: usize,
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub deleted: Vec<String>,
    pub skipped: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ReconcileResult {
    pub fn new(kind: &str, dry_run: bool) -> Self {
        Self {
            kind: kind.to_string(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Whether the pass changed (or would change) anything.
    pub fn has_changes(&self) -> bool {
        !(self.created.is_empty() && self.updated.is_empty() && self.deleted.is_empty())
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{}: {}", self.kind, message);
        self.warnings.push(message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{}: {}", self.kind, message);
        self.errors.push(message);
    }

    pub(crate) fn log_summary(&self) {
        tracing::info!(
            "{}: {} scanned, {} created, {} updated, {} deleted, {} errors",
            self.kind,
            self.scanned,
            self.created.len(),
            self.updated.len(),
            self.deleted.len(),
            self.errors.len()
        );
    }

    /// Record a skipped item together with the warning explaining it.
    pub fn skip(&mut self, label: impl Into<String>, reason: impl Display) {
        let label = label.into();
        self.warn(format!("{label}: {reason}"));
        self.skipped.push(label);
    }
}

/// One artifact kind as seen by [`reconcile`]
///
/// `scan` reads the filesystem; every other method works on datastore state.
/// Item-level diagnostics go into the result passed along.
pub trait ArtifactKind {
    /// Canonical identity shared by the file and datastore sides
    type Key: Clone + Eq + Hash + Display;
    /// An item as found on the filesystem
    type Desired;
    /// A stored record
    type Record;

    /// Name used in reports, plural
    const LABEL: &'static str;

    fn scan(
        &mut self,
        store: &dyn Datastore,
        result: &mut ReconcileResult,
    ) -> Result<Vec<Self::Desired>>;

    fn key(&self, desired: &Self::Desired) -> Self::Key;

    /// Stored records with their key. A record without a key is always an orphan.
    fn existing(&self, store: &dyn Datastore) -> Vec<(Option<Self::Key>, Self::Record)>;

    /// Label of a stored record, for reports.
    fn record_label(&self, store: &dyn Datastore, record: &Self::Record) -> String;

    /// Names of the fields that differ; empty when up to date.
    fn diff(
        &self,
        store: &dyn Datastore,
        desired: &Self::Desired,
        record: &Self::Record,
    ) -> Vec<&'static str>;

    fn create(
        &mut self,
        store: &mut dyn Datastore,
        desired: &Self::Desired,
        result: &mut ReconcileResult,
    ) -> Result<()>;

    fn update(
        &mut self,
        store: &mut dyn Datastore,
        desired: &Self::Desired,
        record: &Self::Record,
        result: &mut ReconcileResult,
    ) -> Result<()>;

    /// Reason the record must not be deleted, if any.
    fn delete_guard(&self, _store: &dyn Datastore, _record: &Self::Record) -> Option<String> {
        None
    }

    fn delete(&mut self, store: &mut dyn Datastore, record: &Self::Record) -> Result<()>;
}

/// Reconcile one artifact kind from the filesystem into the datastore.
pub fn reconcile<K: ArtifactKind>(
    kind: &mut K,
    store: &mut dyn Datastore,
    options: &ReconcileOptions,
) -> Result<ReconcileResult> {
    Ok(upsert(kind, store, options)?.sweep(kind, store, options))
}

/// A pass whose records are created and updated but not yet swept.
///
/// Holding the sweep back lets a later pass release records first, the way
/// test cases release the templates they no longer use.
pub struct PendingSweep<K: ArtifactKind> {
    seen: HashSet<K::Key>,
    result: ReconcileResult,
}

/// Scan, create and update, leaving orphans in place.
pub fn upsert<K: ArtifactKind>(
    kind: &mut K,
    store: &mut dyn Datastore,
    options: &ReconcileOptions,
) -> Result<PendingSweep<K>> {
    let mut result = ReconcileResult::new(K::LABEL, options.dry_run);
    tracing::info!("Reconciling {}{}", K::LABEL, dry_run_suffix(options.dry_run));

    let desired = kind.scan(store, &mut result)?;
    result.scanned = desired.len();

    let existing = kind.existing(store);
    result.existing = existing.len();
    let index = first_by_key(&existing);

    let mut seen: HashSet<K::Key> = HashSet::new();
    for item in &desired {
        let key = kind.key(item);
        if !seen.insert(key.clone()) {
            result.error(format!("{key}: duplicate {} key in scan, ignored", K::LABEL));
            continue;
        }

        match index.get(&key).map(|idx| &existing[*idx].1) {
            None => {
                if !options.dry_run
                    && let Err(e) = kind.create(store, item, &mut result)
                {
                    result.error(format!("{key}: create failed: {e}"));
                    continue;
                }
                tracing::debug!("Created {} {}", K::LABEL, key);
                result.created.push(key.to_string());
            }
            Some(record) => {
                let changes = kind.diff(store, item, record);
                if changes.is_empty() {
                    result.unchanged.push(key.to_string());
                    continue;
                }
                if !options.dry_run
                    && let Err(e) = kind.update(store, item, record, &mut result)
                {
                    result.error(format!("{key}: update failed: {e}"));
                    continue;
                }
                tracing::debug!("Updated {} {} ({})", K::LABEL, key, changes.join(", "));
                result.updated.push(format!("{key} ({})", changes.join(", ")));
            }
        }
    }

    Ok(PendingSweep { seen, result })
}

impl<K: ArtifactKind> PendingSweep<K> {
    /// Delete stored records whose key was not seen, in storage order.
    pub fn sweep(
        self,
        kind: &mut K,
        store: &mut dyn Datastore,
        options: &ReconcileOptions,
    ) -> ReconcileResult {
        let Self { seen, mut result } = self;

        // Records created by the upsert are claimed like any other seen key
        let existing = kind.existing(store);
        let index = first_by_key(&existing);
        let claimed: HashSet<usize> = seen.iter().filter_map(|k| index.get(k).copied()).collect();
        for (idx, (_, record)) in existing.iter().enumerate() {
            if claimed.contains(&idx) {
                continue;
            }
            let label = kind.record_label(store, record);
            if let Some(reason) = kind.delete_guard(store, record) {
                result.skip(label, reason);
                continue;
            }
            if !options.dry_run
                && let Err(e) = kind.delete(store, record)
            {
                if e.is_restrict() {
                    result.skip(label, e);
                } else {
                    result.error(format!("{label}: delete failed: {e}"));
                }
                continue;
            }
            tracing::debug!("Deleted {} {}", K::LABEL, label);
            result.deleted.push(label);
        }

        result.log_summary();
        result
    }
}

/// Position of the first record holding each key.
fn first_by_key<Key: Eq + Hash + Clone, R>(existing: &[(Option<Key>, R)]) -> HashMap<Key, usize> {
    let mut index = HashMap::new();
    for (idx, (key, _)) in existing.iter().enumerate() {
        if let Some(key) = key {
            index.entry(key.clone()).or_insert(idx);
        }
    }
    index
}

pub(crate) fn dry_run_suffix(dry_run: bool) -> &'static str {
    if dry_run { " (dry run)" } else { "" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_store::{MemoryStore, TagKind};

    /// Tags named by a fixed list; enough to drive the engine.
    struct FixedTags {
        names: Vec<&'static str>,
        fail_create: Option<&'static str>,
    }

    impl ArtifactKind for FixedTags {
        type Key = String;
        type Desired = &'static str;
        type Record = bridge_store::Tag;

        const LABEL: &'static str = "tags";

        fn scan(
            &mut self,
            _store: &dyn Datastore,
            _result: &mut ReconcileResult,
        ) -> Result<Vec<&'static str>> {
            Ok(self.names.clone())
        }

        fn key(&self, desired: &&'static str) -> String {
            desired.to_string()
        }

        fn existing(&self, store: &dyn Datastore) -> Vec<(Option<String>, bridge_store::Tag)> {
            store.tags().into_iter().map(|t| (Some(t.name.clone()), t)).collect()
        }

        fn record_label(&self, _store: &dyn Datastore, record: &bridge_store::Tag) -> String {
            record.name.clone()
        }

        fn diff(
            &self,
            _store: &dyn Datastore,
            _desired: &&'static str,
            _record: &bridge_store::Tag,
        ) -> Vec<&'static str> {
            Vec::new()
        }

        fn create(
            &mut self,
            store: &mut dyn Datastore,
            desired: &&'static str,
            _result: &mut ReconcileResult,
        ) -> Result<()> {
            if self.fail_create == Some(*desired) {
                return Err(crate::Error::InvalidIdentifier {
                    value: desired.to_string(),
                });
            }
            store.create_tag(desired, TagKind::Filter)?;
            Ok(())
        }

        fn update(
            &mut self,
            _store: &mut dyn Datastore,
            _desired: &&'static str,
            _record: &bridge_store::Tag,
            _result: &mut ReconcileResult,
        ) -> Result<()> {
            Ok(())
        }

        fn delete_guard(
            &self,
            _store: &dyn Datastore,
            record: &bridge_store::Tag,
        ) -> Option<String> {
            (record.name == "pinned").then(|| "pinned".to_string())
        }

        fn delete(
            &mut self,
            _store: &mut dyn Datastore,
            _record: &bridge_store::Tag,
        ) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn duplicate_keys_are_item_errors() {
        let mut store = MemoryStore::new();
        let mut kind = FixedTags {
            names: vec!["a", "a", "b"],
            fail_create: None,
        };
        let result = reconcile(&mut kind, &mut store, &ReconcileOptions::default()).unwrap();
        assert_eq!(result.created, vec!["a", "b"]);
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn failed_item_does_not_stop_the_pass() {
        let mut store = MemoryStore::new();
        let mut kind = FixedTags {
            names: vec!["a", "bad", "c"],
            fail_create: Some("bad"),
        };
        let result = reconcile(&mut kind, &mut store, &ReconcileOptions::default()).unwrap();
        assert_eq!(result.created, vec!["a", "c"]);
        assert!(result.has_errors());
    }

    #[test]
    fn guarded_orphans_are_skipped() {
        let mut store = MemoryStore::new();
        store.create_tag("pinned", TagKind::Filter).unwrap();
        store.create_tag("gone", TagKind::Filter).unwrap();
        let mut kind = FixedTags {
            names: vec![],
            fail_create: None,
        };
        let result = reconcile(&mut kind, &mut store, &ReconcileOptions::default()).unwrap();
        assert_eq!(result.deleted, vec!["gone"]);
        assert_eq!(result.skipped, vec!["pinned"]);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn dry_run_writes_nothing() {
        let mut store = MemoryStore::new();
        let mut kind = FixedTags {
            names: vec!["a"],
            fail_create: None,
        };
        let options = ReconcileOptions {
            dry_run: true,
            ..Default::default()
        };
        let result = reconcile(&mut kind, &mut store, &options).unwrap();
        assert_eq!(result.created, vec!["a"]);
        assert!(store.tags().is_empty());
    }
}
