//! Error types for bridge-content

/// Result type for bridge-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in bridge-content operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to parse {format} content: {message}")]
    ParseError { format: String, message: String },

    #[error("Invalid step signature '{signature}': {message}")]
    InvalidSignature { signature: String, message: String },

    #[error("Invalid @{tag} value '{value}'")]
    InvalidTagValue { tag: String, value: String },

    #[error("Duplicate key '{key}' in {path}")]
    DuplicateKey { path: String, key: String },

    #[error("No block for signature '{signature}'")]
    BlockNotFound { signature: String },

    #[error("Formatter '{command}' failed: {message}")]
    FormatFailed { command: String, message: String },

    #[error(transparent)]
    Metadata(#[from] bridge_blocks::Error),

    #[error(transparent)]
    Fs(#[from] bridge_fs::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn parse(format: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            format: format.into(),
            message: message.into(),
        }
    }
}
