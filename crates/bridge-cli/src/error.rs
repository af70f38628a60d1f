//! Error types for bridge-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that abort a command
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from bridge-core
    #[error(transparent)]
    Core(#[from] bridge_core::Error),

    /// The datastore snapshot could not be loaded or saved
    #[error(transparent)]
    Store(#[from] bridge_store::Error),

    /// Error from bridge-fs
    #[error(transparent)]
    Fs(#[from] bridge_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Report serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
