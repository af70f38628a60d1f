//! Duplicate detection among the locators of one group
//!
//! Conflicts are informational. Each pair is recorded twice, once from each
//! participant's side, and never recorded again while an unresolved record
//! for the same pair and kind exists.

use bridge_store::{ConflictKind, Datastore, Id};

use crate::Result;

const LOCATOR: &str = "locator";

fn same_name(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn record_pair(store: &mut dyn Datastore, a: Id, b: Id, kind: ConflictKind) -> Result<usize> {
    let existing = store.conflicts();
    let mut created = 0;
    for (entity, counterpart) in [(a, b), (b, a)] {
        let known = existing.iter().any(|c| {
            !c.resolved
                && c.entity_kind == LOCATOR
                && c.entity_id == entity
                && c.counterpart_id == counterpart
                && c.conflict_kind == kind
        });
        if !known {
            store.create_conflict(LOCATOR, entity, kind, counterpart)?;
            created += 1;
        }
    }
    Ok(created)
}

/// Compare locator `locator_id` against every other locator in `group_id`.
///
/// Names are compared trimmed and case-insensitively, since exact duplicates
/// cannot be stored. A name clash takes precedence over a value clash for the
/// same pair. Returns the number of conflict records created.
pub fn detect_conflicts(
    store: &mut dyn Datastore,
    locator_id: Id,
    name: &str,
    value: &str,
    group_id: Id,
) -> Result<usize> {
    let others: Vec<_> = store
        .locators()
        .into_iter()
        .filter(|l| l.group_id == group_id && l.id != locator_id)
        .collect();

    let mut created = 0;
    for other in others {
        let kind = if same_name(&other.name, name) {
            ConflictKind::DuplicateName
        } else if other.value == value {
            ConflictKind::DuplicateValue
        } else {
            continue;
        };
        created += record_pair(store, locator_id, other.id, kind)?;
        tracing::debug!(
            "Locator '{}' conflicts with '{}' ({:?})",
            name,
            other.name,
            kind
        );
    }
    Ok(created)
}
