//! Command implementations for bridge-cli
//!
//! Each command returns whether it finished without item errors; `main`
//! turns `false` into a non-zero exit.

pub mod init;
pub mod report;
pub mod sync;

pub use init::run_init;
pub use sync::{run_pass, run_sync};
