//! Tag kinds and identifier tags
//!
//! A tag's kind is derived from its name: `tc_` followed by lowercase base36
//! marks the identifier of a test case, everything else is a filter tag.

use std::fmt;
use std::sync::LazyLock;

use bridge_store::{Datastore, Id, Tag, TagKind};
use regex::Regex;

use crate::{Error, Result};

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@?tc_[a-z0-9]+$").expect("Invalid identifier regex"));

/// Kind implied by a tag name (with or without the leading `@`).
pub fn infer_kind(name: &str) -> TagKind {
    if IDENTIFIER_REGEX.is_match(name.trim()) {
        TagKind::Identifier
    } else {
        TagKind::Filter
    }
}

/// The immutable identity of a test case, e.g. `tc_k3j9x0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdentifierTag(String);

impl IdentifierTag {
    /// Accepts `tc_x` or `@tc_x`.
    pub fn parse(value: &str) -> Result<Self> {
        let value = value.trim();
        if !IDENTIFIER_REGEX.is_match(value) {
            return Err(Error::InvalidIdentifier {
                value: value.to_string(),
            });
        }
        Ok(Self(value.trim_start_matches('@').to_string()))
    }

    /// A fresh identifier derived from a random UUID.
    pub fn mint() -> Self {
        let mut n = uuid::Uuid::new_v4().as_u128();
        let mut digits = Vec::with_capacity(25);
        while n > 0 {
            let d = (n % 36) as u32;
            digits.push(std::char::from_digit(d, 36).unwrap_or('0'));
            n /= 36;
        }
        if digits.is_empty() {
            digits.push('0');
        }
        // Twelve base36 digits, about 62 bits
        let id: String = digits.into_iter().rev().take(12).collect();
        Self(format!("tc_{id}"))
    }

    /// First identifier among `tags`, if any.
    pub fn find_in<'a>(tags: impl IntoIterator<Item = &'a String>) -> Option<Self> {
        tags.into_iter().find_map(|t| Self::parse(t).ok())
    }

    /// Name without `@`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `@tc_...`
    pub fn expression(&self) -> String {
        format!("@{}", self.0)
    }
}

impl fmt::Display for IdentifierTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Find or create the tag `name`, correcting its stored kind when it drifted.
pub fn ensure_tag(store: &mut dyn Datastore, name: &str) -> Result<Id> {
    let name = name.trim().trim_start_matches('@');
    let kind = infer_kind(name);
    match store.tag_by_name(name) {
        Some(tag) if tag.kind == kind => Ok(tag.id),
        Some(tag) => {
            tracing::debug!("Correcting kind of tag '{}' to {:?}", name, kind);
            store.update_tag(&Tag { kind, ..tag.clone() })?;
            Ok(tag.id)
        }
        None => Ok(store.create_tag(name, kind)?),
    }
}

/// Ensure every tag in `names` and return their ids in order, without duplicates.
pub fn ensure_tags<'a>(
    store: &mut dyn Datastore,
    names: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<Id>> {
    let mut ids = Vec::new();
    for name in names {
        let id = ensure_tag(store, name)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Names of the given tag ids, sorted.
pub fn tag_names(store: &dyn Datastore, ids: &[Id]) -> Vec<String> {
    let mut names: Vec<String> = store
        .tags()
        .into_iter()
        .filter(|t| ids.contains(&t.id))
        .map(|t| t.name)
        .collect();
    names.sort();
    names
}
