//! Init command implementation

use std::path::Path;

use bridge_core::ConfigResolver;
use bridge_fs::NormalizedPath;
use colored::Colorize;

use crate::error::Result;

/// Write the default configuration under `path` and create the scan roots.
pub fn run_init(path: &Path) -> Result<bool> {
    let resolver = ConfigResolver::new(NormalizedPath::new(path));
    let written = resolver.init()?;
    println!("{} Wrote {}", "OK".green().bold(), written.as_str().cyan());
    println!("Run {} to import existing artifacts.", "testbridge sync".cyan());
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn init_twice_fails() {
        let temp = TempDir::new().unwrap();
        assert!(run_init(temp.path()).unwrap());
        assert!(temp.path().join(".testbridge/config.toml").exists());
        assert!(temp.path().join("features").is_dir());

        let err = run_init(temp.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"), "{err}");
    }
}
