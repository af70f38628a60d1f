//! Error types for bridge-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Metadata block is missing required @{tag}")]
    MissingTag { tag: String },

    #[error("Metadata block has an empty @{tag}")]
    EmptyTag { tag: String },
}
