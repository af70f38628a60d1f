//! The parsed `config.toml`

use bridge_content::{CommandFormatter, Formatter, NoopFormatter};
use bridge_fs::NormalizedPath;
use serde::{Deserialize, Serialize};

fn default_features() -> String {
    "features".to_string()
}

fn default_locators() -> String {
    "locators".to_string()
}

fn default_steps() -> String {
    "steps".to_string()
}

fn default_locator_map() -> Option<String> {
    Some("locators/locator-map.json".to_string())
}

fn default_store() -> String {
    ".testbridge/store.json".to_string()
}

fn default_imports() -> Vec<String> {
    vec![
        "import { expect } from '@playwright/test';".to_string(),
        "import { When, Then } from './fixtures';".to_string(),
    ]
}

fn default_true() -> bool {
    true
}

/// Artifact locations, relative to the repository root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathsSection {
    #[serde(default = "default_features")]
    pub features: String,

    #[serde(default = "default_locators")]
    pub locators: String,

    #[serde(default = "default_steps")]
    pub steps: String,

    /// Locator map index; an empty string disables it
    #[serde(default = "default_locator_map")]
    pub locator_map: Option<String>,

    /// Datastore snapshot
    #[serde(default = "default_store")]
    pub store: String,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            features: default_features(),
            locators: default_locators(),
            steps: default_steps(),
            locator_map: default_locator_map(),
            store: default_store(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepsSection {
    /// Import lines every generated step file must contain
    #[serde(default = "default_imports")]
    pub required_imports: Vec<String>,
}

impl Default for StepsSection {
    fn default() -> Self {
        Self {
            required_imports: default_imports(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    /// Mint identifier tags for untagged scenarios during the cases pass
    #[serde(default = "default_true")]
    pub mint_identifiers: bool,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            mint_identifiers: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSection {
    /// Formatter argv; `{file}` is replaced by the target path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub steps: StepsSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub format: FormatSection,
}

impl Config {
    pub fn features_root(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.paths.features)
    }

    pub fn locators_root(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.paths.locators)
    }

    pub fn steps_root(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.paths.steps)
    }

    pub fn locator_map_path(&self, root: &NormalizedPath) -> Option<NormalizedPath> {
        self.paths
            .locator_map
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| root.join(p))
    }

    pub fn store_path(&self, root: &NormalizedPath) -> NormalizedPath {
        root.join(&self.paths.store)
    }

    /// The configured formatter, or a no-op one.
    pub fn formatter(&self) -> Box<dyn Formatter> {
        match self
            .format
            .command
            .as_deref()
            .and_then(CommandFormatter::from_argv)
        {
            Some(formatter) => Box::new(formatter),
            None => Box::new(NoopFormatter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.paths.features, "features");
        assert_eq!(config.paths.store, ".testbridge/store.json");
        assert!(config.sync.mint_identifiers);
        assert_eq!(config.steps.required_imports.len(), 2);
        assert_eq!(config.paths.locator_map.as_deref(), Some("locators/locator-map.json"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: Config = toml::from_str("[paths]\nfeatures = \"specs\"\n").unwrap();
        assert_eq!(config.paths.features, "specs");
        assert_eq!(config.paths.locators, "locators");
        assert!(config.paths.locator_map.is_some());
    }

    #[test]
    fn empty_locator_map_disables_the_index() {
        let config: Config = toml::from_str("[paths]\nlocator_map = \"\"\n").unwrap();
        assert!(config.locator_map_path(&NormalizedPath::new("/repo")).is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<Config>("[paths]\nfeaturez = \"x\"\n").is_err());
    }

    #[test]
    fn paths_join_the_root() {
        let config = Config::default();
        let root = NormalizedPath::new("/repo");
        assert_eq!(config.steps_root(&root).as_str(), "/repo/steps");
        assert_eq!(
            config.locator_map_path(&root).unwrap().as_str(),
            "/repo/locators/locator-map.json"
        );
    }
}
