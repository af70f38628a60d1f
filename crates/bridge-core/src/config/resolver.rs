//! Config file discovery, local-override merge and `init`

use bridge_fs::{NormalizedPath, io};
use toml::Value;

use super::manifest::Config;
use crate::{Error, Result};

/// Directory holding testbridge's own files
pub const CONFIG_DIR: &str = ".testbridge";

/// Resolves the effective [`Config`] for a repository root
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    root: NormalizedPath,
}

impl ConfigResolver {
    pub fn new(root: NormalizedPath) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    /// `.testbridge/config.toml`
    pub fn config_path(&self) -> NormalizedPath {
        self.root.join(CONFIG_DIR).join("config.toml")
    }

    /// `.testbridge/config.local.toml`
    pub fn local_path(&self) -> NormalizedPath {
        self.root.join(CONFIG_DIR).join("config.local.toml")
    }

    /// Load config.toml, merge local overrides on top and apply defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when either file is not valid TOML or
    /// holds unknown keys.
    pub fn resolve(&self) -> Result<Config> {
        let mut merged = Value::Table(Default::default());

        for path in [self.config_path(), self.local_path()] {
            let Some(content) = io::read_text_opt(&path)? else {
                continue;
            };
            let layer: Value = toml::from_str(&content).map_err(|e| Error::InvalidConfig {
                path: path.to_native(),
                message: e.to_string(),
            })?;
            tracing::debug!("Loaded config layer {}", path);
            deep_merge(&mut merged, layer);
        }

        merged.try_into().map_err(|e: toml::de::Error| Error::InvalidConfig {
            path: self.config_path().to_native(),
            message: e.to_string(),
        })
    }

    /// Write a default config.toml and create the scan roots.
    ///
    /// Refuses to overwrite an existing configuration.
    pub fn init(&self) -> Result<NormalizedPath> {
        let path = self.config_path();
        if path.exists() {
            return Err(Error::ConfigExists {
                path: path.to_native(),
            });
        }
        let config = Config::default();
        let content = toml::to_string_pretty(&config)?;
        io::write_text(&path, &content)?;
        for dir in [
            config.features_root(&self.root),
            config.locators_root(&self.root),
            config.steps_root(&self.root),
        ] {
            io::ensure_dir(&dir)?;
        }
        tracing::info!("Wrote default configuration to {}", path);
        Ok(path)
    }
}

/// Merge `other` into `base`; tables merge recursively, anything else is replaced.
fn deep_merge(base: &mut Value, other: Value) {
    match (base, other) {
        (Value::Table(base_table), Value::Table(other_table)) => {
            for (key, other_value) in other_table {
                match base_table.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, other_value),
                    None => {
                        base_table.insert(key, other_value);
                    }
                }
            }
        }
        (base, other) => *base = other,
    }
}
