//! End-to-end library flow over the storefront fixture project
//!
//! Import, persist, reload, export and re-import, checking that each side
//! agrees with the other after every step.

use std::path::PathBuf;

use bridge_content::NoopFormatter;
use bridge_core::hierarchy::find_by_path;
use bridge_core::{Bridge, Config, ReconcileOptions, SyncReport};
use bridge_store::{ConflictKind, Datastore, MemoryStore};
use bridge_test_utils::TestWorkspace;
use pretty_assertions::assert_eq;

fn storefront() -> TestWorkspace {
    let source =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/projects/storefront");
    TestWorkspace::new().copy_tree(&source)
}

fn import(ws: &TestWorkspace, store: &mut MemoryStore) -> SyncReport {
    let options = ReconcileOptions {
        dry_run: false,
        mint_identifiers: true,
    };
    let report = Bridge::new(ws.path(), Config::default(), store)
        .with_formatter(Box::new(NoopFormatter))
        .sync_to_store(&options)
        .unwrap();
    assert!(!report.has_errors(), "{:#?}", report.passes);
    report
}

fn export(ws: &TestWorkspace, store: &mut MemoryStore) -> SyncReport {
    let report = Bridge::new(ws.path(), Config::default(), store)
        .with_formatter(Box::new(NoopFormatter))
        .sync_to_files(false)
        .unwrap();
    assert!(!report.has_errors(), "{:#?}", report.passes);
    report
}

#[test]
fn test_import_builds_the_whole_model() {
    let ws = storefront();
    let mut store = MemoryStore::new();
    import(&ws, &mut store);

    assert_eq!(store.modules().len(), 4);
    assert!(find_by_path(&store, "/users/admins/directors").is_some());
    assert_eq!(store.locator_groups().len(), 2);
    assert_eq!(store.locators().len(), 4);
    assert_eq!(store.step_groups().len(), 2);
    assert_eq!(store.templates().len(), 3);
    assert_eq!(store.suites().len(), 2);
    assert_eq!(store.test_cases().len(), 3);

    // addButton and cartCount share a selector
    let conflicts = store.conflicts();
    assert_eq!(conflicts.len(), 2);
    assert!(conflicts.iter().all(|c| c.conflict_kind == ConflictKind::DuplicateValue));
}

#[test]
fn test_step_parameters_come_from_the_matched_template() {
    let ws = storefront();
    let mut store = MemoryStore::new();
    import(&ws, &mut store);

    let case = store
        .test_cases()
        .into_iter()
        .find(|c| c.title == "Add item")
        .unwrap();
    assert_eq!(case.description, "Shopper adds an item to the cart");

    let steps = store.case_steps(case.id);
    let click = &steps[1];
    assert_eq!(click.text, "When I click on the \"Add to cart\" button");
    let template = store
        .templates()
        .into_iter()
        .find(|t| t.id == click.template_id)
        .unwrap();
    assert_eq!(template.signature, "I click on the {string} button");

    let params = store.step_parameters(click.id);
    assert_eq!(params.len(), 1);
    assert_eq!(params[0].value, "Add to cart");
}

#[test]
fn test_snapshot_reload_keeps_the_sync_idempotent() {
    let ws = storefront();
    let mut store = MemoryStore::new();
    import(&ws, &mut store);

    let snapshot = ws.root().join(".testbridge/store.json");
    store.save(&snapshot).unwrap();
    let mut reloaded = MemoryStore::load(&snapshot).unwrap();
    assert_eq!(reloaded.test_cases(), store.test_cases());

    let again = import(&ws, &mut reloaded);
    assert!(!again.has_changes(), "{:#?}", again.passes);
    assert_eq!(reloaded.modules().len(), 4);
}

#[test]
fn test_export_and_reimport_agree() {
    let source = storefront();
    let mut store = MemoryStore::new();
    import(&source, &mut store);

    let target = TestWorkspace::new();
    export(&target, &mut store);
    target.assert_file_contains("features/checkout/cart.feature", "@tc_cart0002");
    target.assert_file_contains(
        "features/users/admins/directors/reports.feature",
        "Feature: Reports",
    );
    target.assert_file_contains("locators/checkout/cart.json", r##""cartCount": "#add""##);
    target.assert_file_contains("locators/locator-map.json", "checkout/cart.json");

    let back = import(&target, &mut store);
    assert!(!back.has_changes(), "{:#?}", back.passes);
    assert_eq!(store.conflicts().len(), 2);
}

#[test]
fn test_removed_scenario_and_locator_file_are_swept() {
    let ws = storefront();
    let mut store = MemoryStore::new();
    import(&ws, &mut store);

    ws.write_feature(
        "checkout/cart.feature",
        "@checkout\nFeature: Cart\n  Managing items in the cart\n\n  @tc_cart0001\n  Scenario: [Add item] Shopper adds an item to the cart\n    Given I open \"/products/42\"\n",
    );
    ws.remove("locators/checkout/cart.json");
    let report = import(&ws, &mut store);

    assert_eq!(store.test_cases().len(), 2);
    assert!(store.locator_group_by_name("cart").is_none());
    assert_eq!(store.locators().len(), 1);
    assert!(store.conflicts().is_empty());
    assert!(report.passes.iter().any(|p| !p.deleted.is_empty()));
}

#[test]
fn test_used_templates_survive_a_removed_step_file() {
    let ws = storefront();
    let mut store = MemoryStore::new();
    import(&ws, &mut store);

    ws.remove("steps/validations/assertions.ts");
    let report = import(&ws, &mut store);

    assert!(store.templates().iter().any(|t| t.signature == "I should see {string}"));
    assert!(store.step_group_by_name("Assertions").is_some());
    let warnings: Vec<&String> = report.passes.iter().flat_map(|p| &p.warnings).collect();
    assert!(warnings.iter().any(|w| w.contains("used by")), "{warnings:#?}");
}
