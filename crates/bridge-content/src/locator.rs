//! Locator group files and the locator map index
//!
//! A group lives in `<locators root>/<module path>/<group>.json` as a flat
//! object of locator name to selector value. The optional map index is a JSON
//! array of `{ "name", "path" }` entries, one per group.

use std::fmt;

use bridge_fs::NormalizedPath;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Entries of a locator file, in file order, duplicates kept.
struct RawEntries(Vec<(String, String)>);

impl<'de> Deserialize<'de> for RawEntries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct EntriesVisitor;

        impl<'de> Visitor<'de> for EntriesVisitor {
            type Value = RawEntries;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping locator names to selector strings")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<RawEntries, A::Error> {
                let mut entries = Vec::new();
                while let Some((name, value)) = map.next_entry::<String, String>()? {
                    entries.push((name, value));
                }
                Ok(RawEntries(entries))
            }
        }

        deserializer.deserialize_map(EntriesVisitor)
    }
}

/// Parse a locator file. Duplicate names are an error.
pub fn parse_locator_file(text: &str, path: &str) -> Result<Vec<(String, String)>> {
    let RawEntries(entries) = serde_json::from_str(text)
        .map_err(|e| Error::parse("locator JSON", format!("{path}: {e}")))?;

    let mut seen = std::collections::HashSet::new();
    for (name, _) in &entries {
        if !seen.insert(name.as_str()) {
            return Err(Error::DuplicateKey {
                path: path.to_string(),
                key: name.clone(),
            });
        }
    }
    Ok(entries)
}

/// Render locators as a pretty JSON object sorted by name.
pub fn render_locator_file(entries: &[(String, String)]) -> Result<String> {
    let map: serde_json::Map<String, serde_json::Value> = entries
        .iter()
        .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
        .collect();
    let mut text = serde_json::to_string_pretty(&map)?;
    text.push('\n');
    Ok(text)
}

/// Identity of a locator file derived from its location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorFileKey {
    /// Module path with a leading slash, e.g. `/users/admins`.
    pub module_path: String,
    /// File stem, used as the group name.
    pub group: String,
}

impl LocatorFileKey {
    /// Derive the key of `file` under `root`.
    ///
    /// Files directly in the root have no module and are rejected.
    pub fn from_path(root: &NormalizedPath, file: &NormalizedPath) -> Result<Self> {
        let relative = file
            .strip_prefix(root)
            .ok_or_else(|| Error::parse("locator path", format!("{file} is outside {root}")))?;
        let group = relative
            .file_stem()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::parse("locator path", format!("{file} has no file name")))?
            .to_string();
        let dirs: Vec<&str> = relative.components().collect();
        let modules = &dirs[..dirs.len().saturating_sub(1)];
        if modules.is_empty() {
            return Err(Error::parse(
                "locator path",
                format!("{file} must live inside a module directory"),
            ));
        }
        Ok(Self {
            module_path: format!("/{}", modules.join("/")),
            group,
        })
    }
}

/// Path of a group file: `<root>/<module path>/<group>.json`.
pub fn locator_file_path(root: &NormalizedPath, module_path: &str, group: &str) -> NormalizedPath {
    let mut path = root.clone();
    for segment in module_path.split('/').filter(|s| !s.trim().is_empty()) {
        path = path.join(segment.trim());
    }
    path.join(&format!("{group}.json"))
}

/// One entry of the locator map index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorMapEntry {
    pub name: String,
    pub path: String,
}

/// The locator map index. Names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocatorMap {
    entries: Vec<LocatorMapEntry>,
}

impl LocatorMap {
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: Vec<LocatorMapEntry> = serde_json::from_str(text)?;
        let mut map = Self::default();
        for entry in raw {
            map.add(&entry.name, &entry.path);
        }
        Ok(map)
    }

    pub fn render(&self) -> Result<String> {
        let mut text = serde_json::to_string_pretty(&self.entries)?;
        text.push('\n');
        Ok(text)
    }

    pub fn entries(&self) -> &[LocatorMapEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&LocatorMapEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Add a group, or move it when the name exists with another path.
    ///
    /// Returns `true` when the map changed.
    pub fn add(&mut self, name: &str, path: &str) -> bool {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(entry) if entry.path == path => false,
            Some(entry) => {
                entry.path = path.to_string();
                true
            }
            None => {
                self.entries.push(LocatorMapEntry {
                    name: name.to_string(),
                    path: path.to_string(),
                });
                true
            }
        }
    }

    /// Rename and/or move a group. Falls back to [`LocatorMap::add`] when
    /// `old_name` is absent. An existing entry named `new_name` is replaced.
    pub fn rename(&mut self, old_name: &str, new_name: &str, new_path: &str) -> bool {
        if old_name == new_name || !self.entries.iter().any(|e| e.name == old_name) {
            return self.add(new_name, new_path);
        }
        self.entries.retain(|e| e.name != new_name);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.name == old_name) {
            entry.name = new_name.to_string();
            entry.path = new_path.to_string();
        }
        true
    }

    /// Drop entries whose name is not in `keep`. Returns `true` when any were dropped.
    pub fn retain_names(&mut self, keep: &[&str]) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| keep.contains(&e.name.as_str()));
        before != self.entries.len()
    }
}
