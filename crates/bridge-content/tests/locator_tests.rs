//! Integration tests for locator files and the locator map.

use bridge_content::locator::{locator_file_path, parse_locator_file, render_locator_file};
use bridge_content::{LocatorFileKey, LocatorMap};
use bridge_fs::NormalizedPath;
use pretty_assertions::assert_eq;

#[test]
fn test_parse_keeps_file_order() {
    let entries = parse_locator_file(
        r##"{ "submit": "#submit", "email": "input[name=email]" }"##,
        "login.json",
    )
    .unwrap();
    assert_eq!(
        entries,
        vec![
            ("submit".to_string(), "#submit".to_string()),
            ("email".to_string(), "input[name=email]".to_string()),
        ]
    );
}

#[test]
fn test_render_sorts_and_parses_back() {
    let entries = vec![
        ("b".to_string(), "#b".to_string()),
        ("a".to_string(), "#a".to_string()),
    ];
    let text = render_locator_file(&entries).unwrap();
    assert_eq!(text, "{\n  \"a\": \"#a\",\n  \"b\": \"#b\"\n}\n");
    assert_eq!(parse_locator_file(&text, "x.json").unwrap().len(), 2);
}

#[test]
fn test_malformed_json_is_parse_error() {
    assert!(parse_locator_file("{ not json", "bad.json").is_err());
    assert!(parse_locator_file("[\"a\"]", "array.json").is_err());
}

#[test]
fn test_file_path_and_key_agree() {
    let root = NormalizedPath::new("locators");
    let path = locator_file_path(&root, "/users/admins", "login");
    assert_eq!(path.as_str(), "locators/users/admins/login.json");

    let key = LocatorFileKey::from_path(&root, &path).unwrap();
    assert_eq!(key.module_path, "/users/admins");
    assert_eq!(key.group, "login");
}

#[test]
fn test_map_parse_dedupes_names() {
    let map = LocatorMap::parse(
        r#"[{"name":"login","path":"a/login.json"},{"name":"login","path":"b/login.json"}]"#,
    )
    .unwrap();
    assert_eq!(map.entries().len(), 1);
    assert_eq!(map.get("login").unwrap().path, "b/login.json");
}

#[test]
fn test_map_add_move_and_retain() {
    let mut map = LocatorMap::default();
    assert!(map.add("login", "users/login.json"));
    assert!(!map.add("login", "users/login.json"));
    assert!(map.add("login", "accounts/login.json"));
    assert!(map.add("cart", "shop/cart.json"));

    assert!(map.retain_names(&["cart"]));
    assert_eq!(map.entries().len(), 1);

    let text = map.render().unwrap();
    assert_eq!(LocatorMap::parse(&text).unwrap(), map);
}

#[test]
fn test_empty_map_text_is_empty_map() {
    assert_eq!(LocatorMap::parse("  \n").unwrap(), LocatorMap::default());
}
