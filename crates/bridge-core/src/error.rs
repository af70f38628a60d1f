//! Error types for bridge-core

use std::path::PathBuf;

/// Result type for bridge-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bridge-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A module path normalized to nothing
    #[error("Module path '{path}' has no segments")]
    EmptyPath { path: String },

    /// The configuration file exists but is not valid
    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    /// `init` refused to overwrite an existing configuration
    #[error("Configuration already exists at {path}")]
    ConfigExists { path: PathBuf },

    /// A value that is not a valid identifier tag
    #[error("Invalid identifier tag: {value}")]
    InvalidIdentifier { value: String },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from bridge-fs
    #[error(transparent)]
    Fs(#[from] bridge_fs::Error),

    /// Metadata block error from bridge-blocks
    #[error(transparent)]
    Blocks(#[from] bridge_blocks::Error),

    /// Artifact parsing or editing error from bridge-content
    #[error(transparent)]
    Content(#[from] bridge_content::Error),

    /// Datastore error from bridge-store
    #[error(transparent)]
    Store(#[from] bridge_store::Error),

    /// TOML serialization error
    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),
}

impl Error {
    /// Whether a datastore restrict rule rejected the operation.
    pub fn is_restrict(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_restrict())
    }
}
