//! Integration tests for metadata block parsing.

use bridge_blocks::{block_preceding, find_comment_blocks, find_leading_block, parse_metadata};
use pretty_assertions::assert_eq;
use rstest::rstest;

const STEP_FILE: &str = r#"/**
 * @name Navigation
 * @description Steps that move
 *   between pages
 * @type ACTION
 */
import { When } from '@cucumber/cucumber';

/**
 * @name Open page
 * @description Opens a page by its route
 * @icon NAVIGATION
 */
When('I open {string}', async function (page: string) {
  await this.open(page);
});
"#;

#[test]
fn test_no_blocks_returns_empty_vec() {
    assert!(find_comment_blocks("const x = 1;\n// not a doc comment\n").is_empty());
}

#[test]
fn test_plain_block_comment_is_not_metadata() {
    assert!(find_comment_blocks("/* plain */\nconst x = 1;").is_empty());
}

#[test]
fn test_blocks_found_in_order_with_lines() {
    let blocks = find_comment_blocks(STEP_FILE);
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].start_line, 1);
    assert_eq!(blocks[0].end_line, 6);
    assert_eq!(blocks[1].start_line, 9);
    assert_eq!(blocks[1].metadata.get("name"), Some("Open page"));
}

#[test]
fn test_leading_block_folds_multiline_description() {
    let leading = find_leading_block(STEP_FILE, "type").unwrap();
    assert_eq!(leading.metadata.get("name"), Some("Navigation"));
    assert_eq!(
        leading.metadata.get("description"),
        Some("Steps that move between pages")
    );
    assert_eq!(leading.span.start, 0);
}

#[test]
fn test_leading_block_without_group_tag_is_not_a_file_header() {
    let source = "/**\n * @name Open page\n */\nWhen('x', function () {});\n";
    assert!(find_leading_block(source, "type").is_none());
}

#[test]
fn test_block_preceding_step_call() {
    let offset = STEP_FILE.find("When('I open").unwrap();
    let block = block_preceding(STEP_FILE, offset, 15).unwrap();
    assert_eq!(block.metadata.get("icon"), Some("NAVIGATION"));
}

#[test]
fn test_block_preceding_skips_unrelated_earlier_block() {
    let source = "/**\n * @name Lonely\n */\nconst helper = 1;\n\nWhen('x', function () {});\n";
    let offset = source.find("When").unwrap();
    assert!(block_preceding(source, offset, 15).is_none());
}

#[test]
fn test_long_block_counts_from_its_closing_line() {
    let prose = " * More detail about the step.\n".repeat(20);
    let source = format!("/**\n * @name Long\n{prose} */\nWhen('x', function () {{}});\n");
    let offset = source.find("When").unwrap();
    let block = block_preceding(&source, offset, 15).unwrap();
    assert_eq!(block.metadata.get("name"), Some("Long"));
    assert_eq!(block.end_line, 23);
}

#[test]
fn test_block_too_far_above_call_is_ignored() {
    let gap = "\n".repeat(16);
    let source = format!("/**\n * @name Far\n */{gap}\nWhen('x', function () {{}});\n");
    let offset = source.find("When").unwrap();
    assert!(block_preceding(&source, offset, 15).is_none());
    assert!(block_preceding(&source, offset, 17).is_some());
}

#[rstest]
#[case("/** @name A */", "name", "A")]
#[case("/**\n * @name   Spaced out   \n */", "name", "Spaced out")]
#[case("/**\n *@type VALIDATION\n */", "type", "VALIDATION")]
#[case("/**\n * Some prose first\n * @icon LOCK\n */", "icon", "LOCK")]
fn test_tag_values(#[case] comment: &str, #[case] tag: &str, #[case] expected: &str) {
    assert_eq!(parse_metadata(comment).get(tag), Some(expected));
}

#[test]
fn test_tag_order_is_preserved() {
    let block = parse_metadata("/**\n * @type ACTION\n * @name N\n * @description D\n */");
    let names: Vec<_> = block.tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["type", "name", "description"]);
}
