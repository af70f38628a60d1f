//! Integration tests for step signature matching.

use bridge_content::signature::{compile, match_against_all, match_step, strip_keyword};
use bridge_content::{ParamSpec, ParamType};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn declared(name: &str, param_type: ParamType, order: usize) -> ParamSpec {
    ParamSpec {
        name: name.to_string(),
        param_type,
        order,
    }
}

#[test]
fn test_click_button_example() {
    let compiled = compile("I click on the {string} button").unwrap();
    let params = match_step(
        &compiled,
        &[declared("label", ParamType::String, 0)],
        "I click on the \"Submit\" button",
    )
    .unwrap();

    assert_eq!(params.len(), 1);
    assert_eq!(params[0].name, "label");
    assert_eq!(params[0].value, "Submit");
    assert_eq!(params[0].order, 0);
    assert_eq!(params[0].param_type, ParamType::String);
}

#[rstest]
#[case("Given I log in", "I log in")]
#[case("  When I log in  ", "I log in")]
#[case("And I log in", "I log in")]
#[case("I log in", "I log in")]
#[case("Whenever I log in", "Whenever I log in")]
fn test_strip_keyword(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(strip_keyword(input), expected);
}

#[rstest]
#[case("I wait {int} seconds", "I wait 15 seconds", true)]
#[case("I wait {int} seconds", "I wait 1.5 seconds", false)]
#[case("the price is {number}", "the price is 19.99", true)]
#[case("the price is {number}", "the price is .5", true)]
#[case("remember me is {boolean}", "remember me is false", true)]
#[case("remember me is {boolean}", "remember me is maybe", false)]
#[case("I CLICK {string}", "i click 'ok'", true)]
fn test_placeholder_matching(#[case] signature: &str, #[case] text: &str, #[case] matches: bool) {
    let compiled = compile(signature).unwrap();
    assert_eq!(match_step(&compiled, &[], text).is_some(), matches);
}

#[test]
fn test_extracts_mixed_types_in_order() {
    let compiled = compile("I add {int} of {string} at {number}").unwrap();
    let params = match_step(
        &compiled,
        &[
            declared("price", ParamType::Number, 2),
            declared("qty", ParamType::Integer, 0),
            declared("item", ParamType::String, 1),
        ],
        "When I add 3 of \"socks\" at 4.25",
    )
    .unwrap();

    let names: Vec<_> = params.iter().map(|p| p.name.as_str()).collect();
    let values: Vec<_> = params.iter().map(|p| p.value.as_str()).collect();
    assert_eq!(names, vec!["qty", "item", "price"]);
    assert_eq!(values, vec!["3", "socks", "4.25"]);
}

#[test]
fn test_unmatched_returns_none() {
    let a = compile("I open {string}").unwrap();
    let templates = vec![(7u64, &a, &[][..])];
    assert!(match_against_all("Then I close \"x\"", templates).is_none());
}
