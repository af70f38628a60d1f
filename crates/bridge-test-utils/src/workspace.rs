//! [`TestWorkspace`] builder for testbridge scenarios.

use std::fs;
use std::path::Path;

use bridge_fs::NormalizedPath;
use tempfile::TempDir;
use walkdir::WalkDir;

use crate::fixtures;

/// A temporary repository with the default scan roots (`features/`,
/// `locators/`, `steps/`) already created.
///
/// # Example
///
/// ```rust,no_run
/// use bridge_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new().with_sample_project();
/// ws.assert_file_contains("features/users/login.feature", "Feature: Login");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["features", "locators", "steps"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// The root as the path type the library works with.
    pub fn path(&self) -> NormalizedPath {
        NormalizedPath::new(self.root())
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write(&self, path: &str, content: &str) -> &Self {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        self
    }

    pub fn write_feature(&self, path: &str, content: &str) -> &Self {
        self.write(&format!("features/{path}"), content)
    }

    pub fn write_locators(&self, path: &str, content: &str) -> &Self {
        self.write(&format!("locators/{path}"), content)
    }

    pub fn write_steps(&self, path: &str, content: &str) -> &Self {
        self.write(&format!("steps/{path}"), content)
    }

    /// Populate the workspace with the canonical sample artifacts from
    /// [`fixtures`].
    pub fn with_sample_project(self) -> Self {
        self.write_steps("actions/navigation.ts", fixtures::NAVIGATION_STEPS)
            .write_steps("validations/assertions.ts", fixtures::ASSERTION_STEPS)
            .write_locators("users/login.json", fixtures::LOGIN_LOCATORS)
            .write_feature("users/login.feature", fixtures::LOGIN_FEATURE);
        self
    }

    /// Copy every file under `source` into the workspace, keeping the layout.
    pub fn copy_tree(self, source: &Path) -> Self {
        for entry in WalkDir::new(source).into_iter().map(Result::unwrap) {
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(source).unwrap();
            let target = self.root().join(relative);
            fs::create_dir_all(target.parent().unwrap()).unwrap();
            fs::copy(entry.path(), &target).unwrap();
        }
        self
    }

    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    pub fn remove(&self, path: &str) {
        fs::remove_file(self.root().join(path)).unwrap();
    }

    pub fn exists(&self, path: &str) -> bool {
        self.root().join(path).exists()
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            path,
            content,
            file_content
        );
    }
}
