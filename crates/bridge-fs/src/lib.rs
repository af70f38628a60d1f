//! Filesystem primitives for testbridge
//!
//! Provides normalized path handling, atomic locked writes and recursive
//! discovery of artifact files by extension.

pub mod error;
pub mod io;
pub mod path;
pub mod walk;

pub use error::{Error, Result};
pub use path::NormalizedPath;
pub use walk::discover_files;
