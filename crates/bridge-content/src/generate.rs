//! Step-definition file generation
//!
//! Full renders produce one file per step group. Incremental updates go
//! through the editor so hand-written code between blocks survives.

use std::collections::HashSet;

use bridge_blocks::{render, upsert_leading_block};
use bridge_fs::NormalizedPath;

use crate::editor::{quote_signature, remove_step_block, step_blocks, upsert_step_block};
use crate::imports::ensure_imports;
use crate::metadata::{GroupMeta, StepKind, TemplateMeta};
use crate::signature::ParamSpec;

/// One template to write into a group file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedStep {
    pub kind: StepKind,
    pub signature: String,
    pub meta: TemplateMeta,
    /// Call-expression source; a trailing `;` is optional.
    pub definition: String,
}

/// File-name slug for a group name.
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "steps".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Default location of a group's file: `<root>/<actions|validations>/<slug>.ts`.
pub fn step_file_path(steps_root: &NormalizedPath, kind: StepKind, name: &str) -> NormalizedPath {
    steps_root
        .join(kind.directory())
        .join(&format!("{}.ts", slug(name)))
}

/// Definition for a template that has no stored source yet.
pub fn skeleton_definition(kind: StepKind, signature: &str, params: &[ParamSpec]) -> String {
    let mut args = vec!["_context".to_string()];
    let mut ordered: Vec<&ParamSpec> = params.iter().collect();
    ordered.sort_by_key(|p| p.order);
    for param in ordered {
        let ty = match param.param_type {
            crate::signature::ParamType::String => "string",
            crate::signature::ParamType::Boolean => "boolean",
            _ => "number",
        };
        args.push(format!("{}: {ty}", param.name));
    }
    format!(
        "{}({}, async ({}) => {{\n  throw new Error('Not implemented');\n}})",
        kind.marker(),
        quote_signature(signature),
        args.join(", ")
    )
}

fn statement(definition: &str) -> String {
    let trimmed = definition.trim().trim_end_matches(';').trim_end();
    format!("{trimmed};")
}

/// Metadata comment plus statement for one template.
pub fn render_step_block(step: &GeneratedStep) -> String {
    format!(
        "{}\n{}",
        render(&step.meta.to_block()),
        statement(&step.definition)
    )
}

/// Render a complete group file.
///
/// An empty group renders its metadata block and imports only.
pub fn render_step_file(group: &GroupMeta, imports: &[String], steps: &[GeneratedStep]) -> String {
    let mut out = render(&group.to_block());
    out.push('\n');
    for line in imports {
        out.push_str(line.trim());
        out.push('\n');
    }
    for step in steps {
        out.push('\n');
        out.push_str(&render_step_block(step));
        out.push('\n');
    }
    out
}

/// Bring an existing group file in line with `group` and `steps`.
///
/// The leading block is upserted, missing imports are added, each step block
/// is replaced in place or appended, and documented blocks whose signature is
/// no longer in `steps` are removed. Undocumented code is never touched.
pub fn update_step_file(
    existing: &str,
    group: &GroupMeta,
    imports: &[String],
    steps: &[GeneratedStep],
) -> String {
    let mut source = upsert_leading_block(existing, &group.to_block(), "type");
    source = ensure_imports(&source, imports);

    let wanted: HashSet<(&str, &str)> = steps
        .iter()
        .map(|s| (s.kind.marker(), s.signature.as_str()))
        .collect();

    let stale: Vec<(String, String)> = step_blocks(&source)
        .into_iter()
        .filter(|block| block.span.start < block.call.statement.start)
        .filter(|block| {
            !wanted.contains(&(block.call.marker.as_str(), block.call.signature.as_str()))
        })
        .map(|block| (block.call.marker, block.call.signature))
        .collect();
    for (marker, signature) in stale {
        if let Ok((updated, _)) = remove_step_block(&source, &marker, &signature) {
            tracing::debug!("Removed stale step block '{}'", signature);
            source = updated;
        }
    }

    for step in steps {
        let (updated, _) = upsert_step_block(
            &source,
            step.kind.marker(),
            &step.signature,
            &render_step_block(step),
        );
        source = updated;
    }
    source
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::ParamType;

    #[test]
    fn slug_collapses_separators() {
        assert_eq!(slug("  User / Login  Flow "), "user-login-flow");
        assert_eq!(slug("***"), "steps");
    }

    #[test]
    fn step_file_path_uses_kind_directory() {
        let path =
            step_file_path(&NormalizedPath::new("steps"), StepKind::Validation, "Cart Checks");
        assert_eq!(path.as_str(), "steps/validations/cart-checks.ts");
    }

    #[test]
    fn skeleton_lists_params_in_order() {
        let params = vec![
            ParamSpec { name: "count".into(), param_type: ParamType::Integer, order: 1 },
            ParamSpec { name: "label".into(), param_type: ParamType::String, order: 0 },
        ];
        let text = skeleton_definition(StepKind::Action, "I add {string} x {int}", &params);
        assert!(text.starts_with(
            "When('I add {string} x {int}', async (_context, label: string, count: number) => {"
        ));
    }

    #[test]
    fn statement_adds_single_semicolon() {
        assert_eq!(statement("When('x', () => {});;"), "When('x', () => {});");
    }
}
