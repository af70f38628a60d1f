//! Integration tests for step-definition editing, harvesting and generation.

use bridge_content::editor::{
    find_step_block, remove_step_block, text_call_spans, upsert_step_block,
};
use bridge_content::generate::{render_step_block, render_step_file, update_step_file};
use bridge_content::imports::ensure_imports;
use bridge_content::{
    GeneratedStep, GroupMeta, ParamType, StepIcon, StepKind, TemplateMeta, harvest,
};
use pretty_assertions::assert_eq;

fn imports() -> Vec<String> {
    vec![
        "import { expect } from '@playwright/test';".to_string(),
        "import { When, Then } from './fixtures';".to_string(),
    ]
}

fn group() -> GroupMeta {
    GroupMeta {
        name: "Navigation".to_string(),
        description: "Moving between pages".to_string(),
        kind: StepKind::Action,
    }
}

fn open_page() -> GeneratedStep {
    GeneratedStep {
        kind: StepKind::Action,
        signature: "I open {string}".to_string(),
        meta: TemplateMeta {
            name: "Open page".to_string(),
            description: "Opens a page by route".to_string(),
            icon: StepIcon::Navigation,
        },
        definition: "When('I open {string}', async ({ page }, route: string) => {\n  await page.goto(route);\n})".to_string(),
    }
}

fn wait_seconds() -> GeneratedStep {
    GeneratedStep {
        kind: StepKind::Action,
        signature: "I wait {int} seconds".to_string(),
        meta: TemplateMeta {
            name: "Wait".to_string(),
            description: "Pauses the test".to_string(),
            icon: StepIcon::Clock,
        },
        definition: "When('I wait {int} seconds', async ({ page }, seconds: number) => {\n  await page.waitForTimeout(seconds * 1000);\n})".to_string(),
    }
}

#[test]
fn test_generated_file_harvests_back_to_same_templates() {
    let steps = vec![open_page(), wait_seconds()];
    let source = render_step_file(&group(), &imports(), &steps);

    let harvest = harvest(&source).unwrap();
    assert!(harvest.errors.is_empty(), "{:?}", harvest.errors);
    assert!(harvest.warnings.is_empty(), "{:?}", harvest.warnings);
    assert_eq!(harvest.templates.len(), 2);

    for (found, expected) in harvest.templates.iter().zip(&steps) {
        assert_eq!(found.signature, expected.signature);
        assert_eq!(found.meta, expected.meta);
        assert_eq!(found.definition, expected.definition);
        assert_eq!(found.kind, StepKind::Action);
    }
    assert_eq!(harvest.templates[0].params[0].name, "route");
    assert_eq!(harvest.templates[0].params[0].param_type, ParamType::String);
    assert_eq!(harvest.templates[1].params[0].param_type, ParamType::Integer);
}

#[test]
fn test_regenerating_from_harvest_is_byte_identical() {
    let source = render_step_file(&group(), &imports(), &[open_page(), wait_seconds()]);
    let harvested: Vec<GeneratedStep> = harvest(&source)
        .unwrap()
        .templates
        .into_iter()
        .map(|t| GeneratedStep {
            kind: t.kind,
            signature: t.signature,
            meta: t.meta,
            definition: t.definition,
        })
        .collect();
    assert_eq!(render_step_file(&group(), &imports(), &harvested), source);
}

#[test]
fn test_empty_group_renders_header_and_imports_only() {
    let source = render_step_file(&group(), &imports(), &[]);
    assert!(source.starts_with("/**\n * @name Navigation\n"));
    assert!(source.ends_with("import { When, Then } from './fixtures';\n"));
    assert!(harvest(&source).unwrap().templates.is_empty());
}

#[test]
fn test_call_without_metadata_is_skipped_with_warning() {
    let source = "import { When } from './fixtures';\n\nWhen('bare step', async () => {});\n";
    let harvest = harvest(source).unwrap();
    assert!(harvest.templates.is_empty());
    assert_eq!(harvest.warnings.len(), 1);
}

#[test]
fn test_invalid_icon_is_item_error() {
    let source = "/**\n * @name Odd\n * @icon SPARKLES\n */\nThen('odd', async () => {});\n";
    let harvest = harvest(source).unwrap();
    assert!(harvest.templates.is_empty());
    assert_eq!(harvest.errors.len(), 1);
}

#[test]
fn test_update_preserves_hand_written_code() {
    let original = render_step_file(&group(), &imports(), &[open_page()]);
    let with_helper = original.replace(
        "import { When, Then } from './fixtures';\n",
        "import { When, Then } from './fixtures';\n\nconst BASE = 'https://example.test';\n",
    );
    let updated =
        update_step_file(&with_helper, &group(), &imports(), &[open_page(), wait_seconds()]);

    assert!(updated.contains("const BASE = 'https://example.test';"));
    assert!(find_step_block(&updated, "When", "I wait {int} seconds").is_some());
    assert!(find_step_block(&updated, "When", "I open {string}").is_some());
}

#[test]
fn test_update_is_idempotent() {
    let original = "const keep = 1;\n";
    let once = update_step_file(original, &group(), &imports(), &[open_page(), wait_seconds()]);
    let twice = update_step_file(&once, &group(), &imports(), &[open_page(), wait_seconds()]);
    assert_eq!(once, twice);
    assert!(once.contains("const keep = 1;"));
}

#[test]
fn test_update_removes_only_documented_stale_blocks() {
    let mut source = render_step_file(&group(), &imports(), &[open_page(), wait_seconds()]);
    source.push_str("\nWhen('undocumented', async () => {});\n");

    let updated = update_step_file(&source, &group(), &imports(), &[open_page()]);
    assert!(find_step_block(&updated, "When", "I wait {int} seconds").is_none());
    assert!(updated.contains("When('undocumented', async () => {});"));
}

#[test]
fn test_upsert_and_remove_round_trip() {
    let base = render_step_file(&group(), &imports(), &[open_page()]);
    let block = render_step_block(&wait_seconds());
    let (added, _) = upsert_step_block(&base, "When", "I wait {int} seconds", &block);
    let (again, _) = upsert_step_block(&added, "When", "I wait {int} seconds", &block);
    assert_eq!(added, again);

    let (removed, _) = remove_step_block(&added, "When", "I wait {int} seconds").unwrap();
    assert_eq!(removed, base);
}

#[test]
fn test_remove_missing_block_is_error() {
    let base = render_step_file(&group(), &imports(), &[]);
    assert!(remove_step_block(&base, "When", "nope").is_err());
}

#[test]
fn test_text_fallback_on_broken_source() {
    let broken = "/**\n * @name A\n */\nWhen('a', async () => {\n  const = ;\n});\n";
    assert!(bridge_content::ast::call_spans(broken).is_none());

    let spans = text_call_spans(broken);
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].signature, "a");
    assert!(find_step_block(broken, "When", "a").is_some());
}

#[test]
fn test_unterminated_multibyte_signature_is_skipped() {
    let broken = "When('caf\u{e9}\n);\n";
    assert!(text_call_spans(broken).is_empty());

    let source = format!("{}\n{broken}", render_step_file(&group(), &imports(), &[]));
    let updated = update_step_file(&source, &group(), &imports(), &[open_page()]);
    assert!(updated.contains("When('caf\u{e9}\n);"));
    assert!(find_step_block(&updated, "When", "I open {string}").is_some());
}

#[test]
fn test_imports_inserted_after_leading_block() {
    let source = "/**\n * @name G\n * @type ACTION\n */\n\nWhen('x', () => {});\n";
    let out = ensure_imports(source, &imports());
    assert!(out.starts_with(
        "/**\n * @name G\n * @type ACTION\n */\nimport { expect } from '@playwright/test';\nimport { When, Then } from './fixtures';\n\nWhen"
    ));
    assert_eq!(ensure_imports(&out, &imports()), out);
}
