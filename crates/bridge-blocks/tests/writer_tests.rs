//! Integration tests for metadata block rendering and upsert.

use bridge_blocks::{
    MetadataBlock, find_comment_blocks, find_leading_block, render, upsert_leading_block,
};
use pretty_assertions::assert_eq;

fn group_block(description: &str) -> MetadataBlock {
    MetadataBlock::new()
        .with("name", "Navigation")
        .with("description", description)
        .with("type", "ACTION")
}

#[test]
fn test_render_layout() {
    assert_eq!(
        render(&group_block("Moves around")),
        "/**\n * @name Navigation\n * @description Moves around\n * @type ACTION\n */"
    );
}

#[test]
fn test_upsert_prepends_when_missing() {
    let source = "import { When } from '@cucumber/cucumber';\n";
    let out = upsert_leading_block(source, &group_block("Moves"), "type");
    assert!(out.starts_with("/**\n * @name Navigation"));
    assert!(out.ends_with("*/\n\nimport { When } from '@cucumber/cucumber';\n"));
}

#[test]
fn test_upsert_replaces_existing_and_keeps_body() {
    let source = "/**\n * @name Navigation\n * @description Old\n * @type ACTION\n */\nimport { When } from '@cucumber/cucumber';\n\nWhen('x', function () {});\n";
    let out = upsert_leading_block(source, &group_block("New"), "type");
    assert!(out.contains("@description New"));
    assert!(!out.contains("@description Old"));
    assert!(
        out.ends_with("*/\nimport { When } from '@cucumber/cucumber';\n\nWhen('x', function () {});\n")
    );
}

#[test]
fn test_upsert_is_idempotent() {
    let source = "import { Then } from '@cucumber/cucumber';\n";
    let once = upsert_leading_block(source, &group_block("Same"), "type");
    let twice = upsert_leading_block(&once, &group_block("Same"), "type");
    assert_eq!(once, twice);
}

#[test]
fn test_rendered_block_parses_back() {
    let block = group_block("A longer description with words");
    let source = upsert_leading_block("", &block, "type");
    let parsed = find_leading_block(&source, "type").unwrap();
    assert_eq!(parsed.metadata, block);
}

#[test]
fn test_upsert_does_not_treat_step_block_as_header() {
    let source = "/**\n * @name Open page\n */\nWhen('x', function () {});\n";
    let out = upsert_leading_block(source, &group_block("G"), "type");
    assert!(out.contains("@name Open page"));
    assert_eq!(find_comment_blocks(&out).len(), 2);
}
