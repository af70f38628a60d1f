//! Configuration loading
//!
//! Settings live in `.testbridge/config.toml`, with optional uncommitted
//! overrides in `.testbridge/config.local.toml` merged on top. Every key has a
//! default, so a repository without any configuration works out of the box.
//!
//! # Example
//!
//! ```ignore
//! use bridge_core::config::ConfigResolver;
//! use bridge_fs::NormalizedPath;
//!
//! let resolver = ConfigResolver::new(NormalizedPath::new("/path/to/repo"));
//! let config = resolver.resolve()?;
//! let features = config.features_root(resolver.root());
//! ```

mod manifest;
mod resolver;

pub use manifest::{Config, FormatSection, PathsSection, StepsSection, SyncSection};
pub use resolver::{CONFIG_DIR, ConfigResolver};
