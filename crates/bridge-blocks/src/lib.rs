//! Structured metadata comment blocks.
//!
//! Generated step-definition files carry their metadata in JSDoc-style
//! comment blocks:
//!
//! ```text
//! /**
//!  * @name Navigation
//!  * @description Steps that move between pages
//!  * @type ACTION
//!  */
//! ```
//!
//! The [`parser`] module reads these blocks (with byte spans and line
//! numbers) and the [`writer`] module renders them and splices a leading
//! block into existing source without touching anything after it. Tag
//! semantics (allowed values, required tags) belong to the callers.

pub mod error;
pub mod parser;
pub mod writer;

pub use error::{Error, Result};
pub use parser::{
    CommentBlock, MetadataBlock, MetadataTag, block_preceding, find_comment_blocks,
    find_leading_block, parse_metadata,
};
pub use writer::{render, upsert_leading_block};
