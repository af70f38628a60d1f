//! Reconciliation engine for testbridge
//!
//! This crate keeps the filesystem representation of test artifacts and the
//! datastore in step:
//!
//! - **Hierarchy**: slash-delimited module paths resolved to module chains
//! - **Reconciliation**: one generic scan/diff/apply/sweep algorithm driven
//!   per artifact kind (locators, groups, suites, cases, steps)
//! - **Exporters**: datastore state rendered back to feature, locator and
//!   step-definition files
//! - **Driver**: configuration, pass ordering and reporting
//!
//! # Architecture
//!
//! ```text
//!                    bridge-cli
//!                        |
//!                   bridge-core
//!                        |
//!     +-----------+------+--------+--------------+
//!     |           |               |              |
//! bridge-fs  bridge-blocks  bridge-content  bridge-store
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bridge_core::{Bridge, ConfigResolver, Pass, ReconcileOptions};
//! use bridge_store::MemoryStore;
//!
//! let resolver = ConfigResolver::new(root.clone());
//! let config = resolver.resolve()?;
//! let mut store = MemoryStore::load(config.store_path(&root).as_ref())?;
//! let mut bridge = Bridge::new(root, config, &mut store);
//! let result = bridge.run(Pass::Locators, &ReconcileOptions::default())?;
//! ```

pub mod config;
pub mod conflict;
pub mod driver;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod kinds;
pub mod reconcile;
pub mod tags;

pub use config::{Config, ConfigResolver};
pub use driver::{Bridge, Direction, Pass, SyncReport};
pub use error::{Error, Result};
pub use reconcile::{
    ArtifactKind, PendingSweep, ReconcileOptions, ReconcileResult, reconcile, upsert,
};
pub use tags::IdentifierTag;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn invalid_config_displays_path() {
        let error = Error::InvalidConfig {
            path: PathBuf::from("/repo/.testbridge/config.toml"),
            message: "unknown field `feature`".into(),
        };
        let display = error.to_string();
        assert!(display.contains("/repo/.testbridge/config.toml"), "got: {display}");
        assert!(display.contains("unknown field"), "got: {display}");
    }

    #[test]
    fn store_errors_convert_transparently() {
        let inner = bridge_store::Error::NotFound {
            entity: "module",
            id: 7,
        };
        let message = inner.to_string();
        let error: Error = inner.into();
        assert_eq!(error.to_string(), message);
        assert!(!error.is_restrict());
    }
}
