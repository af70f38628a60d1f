//! Integration tests for feature document parsing, rendering and write-back.

use bridge_content::feature::{FeatureStep, insert_scenario_tag, merge, parse, render};
use bridge_content::{Keyword, Scenario, discover_features};
use bridge_fs::NormalizedPath;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CHECKOUT: &str = r#"@smoke @checkout
Feature: Checkout
  Customers pay for the items in their cart.
  Includes guest checkout.

  # happy path first
  @tc_a1b2c3 @critical
  Scenario: [Pay by card] Customer pays with a saved card
    Given I open "cart"
    When I click on the "Pay" button
    And I wait 2 seconds
    Then I see "Thank you"

  Scenario: Guest checkout
    Given I open "cart"
    But I am not logged in
"#;

#[test]
fn test_feature_header_and_tags() {
    let doc = parse(CHECKOUT).unwrap();
    assert_eq!(doc.title, "Checkout");
    assert_eq!(
        doc.description,
        "Customers pay for the items in their cart.\nIncludes guest checkout."
    );
    assert_eq!(doc.tags, vec!["smoke", "checkout"]);
    assert_eq!(doc.scenarios.len(), 2);
}

#[test]
fn test_bracket_title_becomes_title() {
    let doc = parse(CHECKOUT).unwrap();
    let first = &doc.scenarios[0];
    assert_eq!(first.title, "Pay by card");
    assert_eq!(first.description, "Customer pays with a saved card");
    assert_eq!(first.tags, vec!["tc_a1b2c3", "critical"]);
    assert_eq!(first.line, 8);
    assert_eq!(first.tag_line, Some(7));
}

#[test]
fn test_steps_numbered_from_one() {
    let doc = parse(CHECKOUT).unwrap();
    let steps = &doc.scenarios[0].steps;
    let orders: Vec<_> = steps.iter().map(|s| s.order).collect();
    assert_eq!(orders, vec![1, 2, 3, 4]);
    assert_eq!(steps[1].keyword, Keyword::When);
    assert_eq!(steps[1].text, "I click on the \"Pay\" button");
    assert_eq!(doc.scenarios[1].steps[1].keyword, Keyword::But);
}

#[test]
fn test_untagged_scenario_has_no_tag_line() {
    let doc = parse(CHECKOUT).unwrap();
    assert!(doc.scenarios[1].tags.is_empty());
    assert_eq!(doc.scenarios[1].tag_line, None);
    assert_eq!(doc.scenarios[1].title, "Guest checkout");
    assert_eq!(doc.scenarios[1].description, "");
}

#[test]
fn test_render_then_parse_preserves_document() {
    let doc = parse(CHECKOUT).unwrap();
    let reparsed = parse(&render(&doc)).unwrap();
    assert_eq!(reparsed.title, doc.title);
    assert_eq!(reparsed.description, doc.description);
    assert_eq!(reparsed.tags, doc.tags);
    for (a, b) in reparsed.scenarios.iter().zip(&doc.scenarios) {
        assert_eq!(a.title, b.title);
        assert_eq!(a.description, b.description);
        assert_eq!(a.tags, b.tags);
        let a_steps: Vec<_> = a.steps.iter().map(|s| s.full_text()).collect();
        let b_steps: Vec<_> = b.steps.iter().map(|s| s.full_text()).collect();
        assert_eq!(a_steps, b_steps);
    }
}

#[test]
fn test_insert_tag_on_new_line_keeps_rest_of_file() {
    let doc = parse(CHECKOUT).unwrap();
    let updated = insert_scenario_tag(CHECKOUT, &doc.scenarios[1], "tc_zz9");
    assert!(updated.contains("\n  @tc_zz9\n  Scenario: Guest checkout\n"));
    assert!(updated.contains("  # happy path first\n"));

    let reparsed = parse(&updated).unwrap();
    assert_eq!(reparsed.scenarios[1].tags, vec!["tc_zz9"]);
    assert_eq!(updated.len(), CHECKOUT.len() + "  @tc_zz9\n".len());
}

#[test]
fn test_insert_tag_appends_to_existing_tag_line() {
    let text = "Feature: F\n  @wip\n  Scenario: S\n    Given x\n";
    let doc = parse(text).unwrap();
    let updated = insert_scenario_tag(text, &doc.scenarios[0], "@tc_abc");
    assert_eq!(updated, "Feature: F\n  @wip @tc_abc\n  Scenario: S\n    Given x\n");
}

#[test]
fn test_discover_features_reports_untitled_files() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("features");
    std::fs::create_dir_all(root.join("shop")).unwrap();
    std::fs::write(root.join("shop/checkout.feature"), CHECKOUT).unwrap();
    std::fs::write(root.join("broken.feature"), "Scenario: no title\n").unwrap();
    std::fs::write(root.join("notes.txt"), "Feature: ignored").unwrap();

    let scan = discover_features(&NormalizedPath::new(&root)).unwrap();
    assert_eq!(scan.files.len(), 1);
    assert_eq!(scan.files[0].document.title, "Checkout");
    assert_eq!(scan.errors.len(), 1);
    assert!(scan.errors[0].0.as_str().ends_with("broken.feature"));
}

#[test]
fn test_discover_features_missing_root_is_fatal() {
    let dir = TempDir::new().unwrap();
    let missing = NormalizedPath::new(dir.path().join("nope"));
    assert!(discover_features(&missing).is_err());
}

// ============================================================================
// Merging a document into an existing file
// ============================================================================

const SEARCH: &str = r#"# Owned by the search team
@search
Feature: Search

  Background:
    Given I open "/home"

  @tc_s1
  Scenario Outline: Search by term
    When I search for "<term>"
    Then I see "<term>"

    Examples:
      | term  |
      | shoes |

  @tc_s2
  Scenario: Retired search
    When I search for "x"
"#;

fn identifier(scenario: &Scenario) -> Option<String> {
    scenario.tags.iter().find(|t| t.starts_with("tc_")).cloned()
}

#[test]
fn test_merge_of_unchanged_document_keeps_file() {
    let doc = parse(CHECKOUT).unwrap();
    assert_eq!(merge(CHECKOUT, &doc, identifier), CHECKOUT);

    let doc = parse(SEARCH).unwrap();
    assert_eq!(merge(SEARCH, &doc, identifier), SEARCH);
}

#[test]
fn test_merge_edits_only_owned_lines() {
    let mut doc = parse(SEARCH).unwrap();
    let outline = &mut doc.scenarios[0];
    outline.title = "Find by term".to_string();
    outline.tags.push("smoke".to_string());
    outline.steps[1].text = "I see results for \"<term>\"".to_string();
    doc.scenarios.remove(1);
    doc.scenarios.push(Scenario {
        title: "Empty search".to_string(),
        description: String::new(),
        outline: false,
        tags: vec!["tc_s3".to_string()],
        steps: vec![FeatureStep {
            keyword: Keyword::When,
            text: "I search for \"\"".to_string(),
            order: 1,
            line: 0,
        }],
        line: 0,
        tag_line: None,
    });

    let merged = merge(SEARCH, &doc, identifier);

    assert_eq!(
        merged,
        r#"# Owned by the search team
@search
Feature: Search

  Background:
    Given I open "/home"

  @tc_s1 @smoke
  Scenario Outline: Find by term
    When I search for "<term>"
    Then I see results for "<term>"

    Examples:
      | term  |
      | shoes |

  @tc_s3
  Scenario: Empty search
    When I search for ""
"#
    );
    assert_eq!(merge(&merged, &doc, identifier), merged);
}

#[test]
fn test_merge_appends_steps_to_empty_scenario() {
    let text = "Feature: F\n  # note\n  @tc_1\n  Scenario: S\n";
    let mut doc = parse(text).unwrap();
    doc.scenarios[0].steps.push(FeatureStep {
        keyword: Keyword::Given,
        text: "x".to_string(),
        order: 1,
        line: 0,
    });

    let merged = merge(text, &doc, identifier);
    assert_eq!(merged, "Feature: F\n  # note\n  @tc_1\n  Scenario: S\n    Given x\n");
}

#[test]
fn test_merge_into_untitled_text_renders() {
    let doc = parse(CHECKOUT).unwrap();
    assert_eq!(merge("just notes\n", &doc, identifier), render(&doc));
}
