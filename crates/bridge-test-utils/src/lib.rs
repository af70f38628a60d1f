//! Shared test fixtures for the testbridge workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`]: canonical feature, locator and step-definition texts
//! - [`workspace`]: [`TestWorkspace`] builder for a repository on disk

pub mod fixtures;
pub mod workspace;

pub use workspace::TestWorkspace;
