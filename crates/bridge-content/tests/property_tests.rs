//! Property tests for parser and editor robustness.

use bridge_content::editor::{find_step_block, text_call_spans, upsert_step_block};
use bridge_content::feature::{parse, render, split_header};
use bridge_content::signature::{compile, match_step, strip_keyword};
use proptest::prelude::*;

proptest! {
    /// Text with no placeholders always matches itself.
    #[test]
    fn literal_signature_matches_itself(text in "[a-zA-Z0-9 .,?!()\\[\\]*+|^$]{1,40}") {
        let trimmed = text.trim();
        prop_assume!(!trimmed.is_empty() && strip_keyword(trimmed) == trimmed);
        let compiled = compile(trimmed).unwrap();
        prop_assert!(match_step(&compiled, &[], trimmed).is_some());
    }

    /// Any quoted value round-trips through a {string} placeholder.
    #[test]
    fn string_placeholder_extracts_value(value in "[a-zA-Z0-9 _-]{0,20}") {
        let compiled = compile("I type {string}").unwrap();
        let params = match_step(&compiled, &[], &format!("I type \"{value}\"")).unwrap();
        prop_assert_eq!(&params[0].value, &value);
    }

    /// The text scanner never panics, whatever the input.
    #[test]
    fn text_scanner_never_panics(source in "\\PC{0,200}") {
        let _ = text_call_spans(&source);
    }

    /// Unterminated literals ending in multi-byte text are not signatures.
    #[test]
    fn unterminated_signature_is_ignored(
        body in "[a-z]{0,5}[\u{e0}-\u{ff}\u{4e00}-\u{4e10}]{1,3}",
    ) {
        let source = format!("When('{body}\n);\nWhen('ok', () => {{}});\n");
        let spans = text_call_spans(&source);
        prop_assert_eq!(spans.len(), 1);
        prop_assert_eq!(spans[0].signature.as_str(), "ok");
    }

    /// The feature parser never panics and rendering keeps the title.
    #[test]
    fn feature_parse_never_panics(body in "\\PC{0,200}") {
        if let Some(doc) = parse(&format!("Feature: T\n{body}")) {
            let again = parse(&render(&doc));
            prop_assert!(again.is_some());
        }
    }

    /// Bracketed headers always split into the bracket text and the rest.
    #[test]
    fn bracket_header_split(title in "[a-zA-Z ]{1,12}", rest in "[a-zA-Z ]{0,20}") {
        let (t, d) = split_header(&format!("[{title}] {rest}"));
        prop_assert_eq!(t, title.trim());
        prop_assert_eq!(d, rest.trim());
    }

    /// Upserting the same block twice equals upserting it once.
    #[test]
    fn upsert_is_idempotent(
        prefix in "(const [a-z]{1,6} = [0-9]{1,3};\n){0,3}",
        sig in "[a-z ]{1,15}",
    ) {
        let block = format!("/**\n * @name S\n */\nWhen('{sig}', async () => {{}});");
        let (once, _) = upsert_step_block(&prefix, "When", &sig, &block);
        let (twice, _) = upsert_step_block(&once, "When", &sig, &block);
        prop_assert_eq!(&once, &twice);
        prop_assert!(find_step_block(&once, "When", &sig).is_some());
    }
}
