use bridge_fs::{Error, NormalizedPath, discover_files};
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_discover_files_recurses_and_sorts() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("users/admins")).unwrap();
    fs::write(root.join("users/admins/b.feature"), "").unwrap();
    fs::write(root.join("users/a.feature"), "").unwrap();
    fs::write(root.join("users/notes.txt"), "").unwrap();

    let base = NormalizedPath::new(root);
    let found: Vec<String> = discover_files(&base, "feature")
        .unwrap()
        .iter()
        .map(|p| p.strip_prefix(&base).unwrap().to_string())
        .collect();

    assert_eq!(found, vec!["users/a.feature", "users/admins/b.feature"]);
}

#[test]
fn test_discover_files_skips_hidden_directories() {
    let temp = TempDir::new().unwrap();
    fs::create_dir_all(temp.path().join(".cache")).unwrap();
    fs::write(temp.path().join(".cache/x.json"), "{}").unwrap();
    fs::write(temp.path().join("y.json"), "{}").unwrap();

    let found = discover_files(&NormalizedPath::new(temp.path()), "json").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].file_name(), Some("y.json"));
}

#[test]
fn test_discover_files_missing_root_is_fatal() {
    let temp = TempDir::new().unwrap();
    let missing = NormalizedPath::new(temp.path().join("nope"));
    let err = discover_files(&missing, "json").unwrap_err();
    assert!(matches!(err, Error::ScanRootMissing { .. }));
}
