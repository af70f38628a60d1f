//! Basic usage example for bridge-content

use bridge_content::feature::parse;
use bridge_content::signature::{compile, match_step};
use bridge_content::{GeneratedStep, GroupMeta, StepIcon, StepKind, TemplateMeta, render_step_file};

fn main() -> bridge_content::Result<()> {
    let feature = r#"Feature: Login
  @tc_k2x9
  Scenario: [Valid login] User signs in with a known account
    When I click on the "Sign in" button
"#;

    let Some(doc) = parse(feature) else {
        eprintln!("no feature title");
        return Ok(());
    };
    let scenario = &doc.scenarios[0];
    println!("Scenario '{}' tagged {:?}", scenario.title, scenario.tags);

    let compiled = compile("I click on the {string} button")?;
    for step in &scenario.steps {
        if let Some(params) = match_step(&compiled, &[], &step.full_text()) {
            println!("  {} -> {:?}", step.text, params);
        }
    }

    let group = GroupMeta {
        name: "Clicks".to_string(),
        description: "Pointer interactions".to_string(),
        kind: StepKind::Action,
    };
    let step = GeneratedStep {
        kind: StepKind::Action,
        signature: "I click on the {string} button".to_string(),
        meta: TemplateMeta {
            name: "Click button".to_string(),
            description: "Clicks a button by its label".to_string(),
            icon: StepIcon::Mouse,
        },
        definition: "When('I click on the {string} button', async ({ page }, label: string) => {\n  await page.getByRole('button', { name: label }).click();\n})".to_string(),
    };
    println!(
        "{}",
        render_step_file(&group, &["import { When } from './fixtures';".to_string()], &[step])
    );
    Ok(())
}
