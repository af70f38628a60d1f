//! Error types for bridge-store

use std::path::PathBuf;

use crate::model::Id;

/// Result type for bridge-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in datastore operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No record with this id
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Id },

    /// A unique constraint would be violated
    #[error("{entity} '{key}' already exists")]
    UniqueViolation { entity: &'static str, key: String },

    /// A restrict rule blocks deletion while dependents exist
    #[error("{entity} {id} still has {count} {dependents}")]
    RestrictViolation {
        entity: &'static str,
        id: Id,
        dependents: &'static str,
        count: usize,
    },

    /// The snapshot file exists but cannot be used
    #[error("Datastore snapshot {path} is unreadable: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error(transparent)]
    Fs(#[from] bridge_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(entity: &'static str, id: Id) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn unique(entity: &'static str, key: impl Into<String>) -> Self {
        Self::UniqueViolation {
            entity,
            key: key.into(),
        }
    }

    /// Whether this error is a restrict (usage guard) violation.
    pub fn is_restrict(&self) -> bool {
        matches!(self, Self::RestrictViolation { .. })
    }
}
