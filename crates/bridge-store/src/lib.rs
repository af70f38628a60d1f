//! Entity model and datastore abstraction for testbridge
//!
//! Reconciliation depends only on the [`Datastore`] trait. [`MemoryStore`] is
//! the bundled implementation, persisted as a JSON snapshot under the
//! repository's `.testbridge/` directory.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use model::*;
pub use store::Datastore;
