//! Syntax-tree harvesting of step templates (tree-sitter TypeScript).

use tree_sitter::{Node, Parser, Tree};

use crate::editor::{CallSpan, MARKERS, step_metadata, unescape};
use crate::error::{Error, Result};
use crate::metadata::{StepKind, TemplateMeta};
use crate::signature::{ParamSpec, ParamType, placeholders};

/// A step template recovered from source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestedTemplate {
    pub kind: StepKind,
    pub signature: String,
    pub meta: TemplateMeta,
    /// Parameters after the context receiver, in order.
    pub params: Vec<ParamSpec>,
    /// Verbatim source of the call expression.
    pub definition: String,
    /// 1-based line of the call.
    pub line: usize,
}

/// Templates found in one file plus per-item diagnostics.
#[derive(Debug, Clone, Default)]
pub struct Harvest {
    pub templates: Vec<HarvestedTemplate>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

/// Parse TypeScript source into a syntax tree.
pub fn parse_tree(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())
        .map_err(|e| Error::parse("typescript", format!("failed to set language: {e}")))?;
    parser
        .parse(source, None)
        .ok_or_else(|| Error::parse("typescript", "parser produced no tree"))
}

fn node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    &source[node.byte_range()]
}

struct MarkerCall<'t> {
    node: Node<'t>,
    marker: &'static str,
    signature: String,
}

fn string_literal(node: &Node, source: &str) -> Option<String> {
    if !matches!(node.kind(), "string" | "template_string") {
        return None;
    }
    let text = node_text(node, source);
    (text.len() >= 2).then(|| unescape(&text[1..text.len() - 1]))
}

fn marker_calls<'t>(tree: &'t Tree, source: &str) -> Vec<MarkerCall<'t>> {
    let mut calls = Vec::new();
    let mut stack = vec![tree.root_node()];

    while let Some(node) = stack.pop() {
        if node.kind() == "call_expression"
            && let Some(function) = node.child_by_field_name("function")
            && function.kind() == "identifier"
            && let Some(marker) = MARKERS
                .into_iter()
                .find(|m| *m == node_text(&function, source))
            && let Some(arguments) = node.child_by_field_name("arguments")
            && let Some(first) = arguments.named_child(0)
            && let Some(signature) = string_literal(&first, source)
        {
            calls.push(MarkerCall {
                node,
                marker,
                signature,
            });
            continue;
        }
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            stack.push(child);
        }
    }

    calls.sort_by_key(|c| c.node.start_byte());
    calls
}

fn statement_range(node: &Node) -> std::ops::Range<usize> {
    match node.parent() {
        Some(parent) if parent.kind() == "expression_statement" => parent.byte_range(),
        _ => node.byte_range(),
    }
}

/// Marker call spans from the syntax tree, or `None` if the file has syntax errors.
pub fn call_spans(source: &str) -> Option<Vec<CallSpan>> {
    let tree = parse_tree(source).ok()?;
    if tree.root_node().has_error() {
        return None;
    }
    Some(
        marker_calls(&tree, source)
            .into_iter()
            .map(|call| CallSpan {
                marker: call.marker.to_string(),
                signature: call.signature,
                call: call.node.byte_range(),
                statement: statement_range(&call.node),
            })
            .collect(),
    )
}

/// Map a declared TypeScript type onto the parameter vocabulary.
///
/// `number` becomes INTEGER when the matching placeholder is `{int}`.
/// Unknown or missing types fall back to the placeholder type, then STRING.
fn map_type(declared: Option<&str>, placeholder: Option<ParamType>) -> (ParamType, bool) {
    match declared {
        Some("string") => (ParamType::String, true),
        Some("number") if placeholder == Some(ParamType::Integer) => (ParamType::Integer, true),
        Some("number") => (ParamType::Number, true),
        Some("boolean") => (ParamType::Boolean, true),
        Some(_) => (placeholder.unwrap_or(ParamType::String), false),
        None => (placeholder.unwrap_or(ParamType::String), true),
    }
}

fn callback_parameters(
    call: &Node,
    source: &str,
    signature: &str,
    harvest: &mut Harvest,
) -> Vec<ParamSpec> {
    let Some(callback) = call
        .child_by_field_name("arguments")
        .and_then(|args| args.named_child(1))
    else {
        return Vec::new();
    };
    let Some(formal) = callback.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let expected = placeholders(signature);
    let mut cursor = formal.walk();
    formal
        .named_children(&mut cursor)
        .filter(|p| matches!(p.kind(), "required_parameter" | "optional_parameter"))
        .skip(1)
        .enumerate()
        .map(|(order, param)| {
            let name = param
                .child_by_field_name("pattern")
                .map(|n| node_text(&n, source).to_string())
                .unwrap_or_else(|| format!("arg{order}"));
            let declared = param.child_by_field_name("type").map(|t| {
                node_text(&t, source)
                    .trim_start_matches(':')
                    .trim()
            });
            let (param_type, known) = map_type(declared, expected.get(order).copied());
            if !known {
                harvest.warnings.push(format!(
                    "'{signature}': parameter '{name}' has unsupported type '{}', using {}",
                    declared.unwrap_or_default(),
                    param_type.as_str()
                ));
            }
            ParamSpec {
                name,
                param_type,
                order,
            }
        })
        .collect()
}

/// Harvest every documented marker call in `source`.
///
/// A call without a preceding metadata block is skipped with a warning; one
/// whose metadata is invalid is an item error.
pub fn harvest(source: &str) -> Result<Harvest> {
    let tree = parse_tree(source)?;
    let mut harvest = Harvest::default();
    if tree.root_node().has_error() {
        harvest
            .warnings
            .push("source has syntax errors, results may be incomplete".to_string());
    }

    for call in marker_calls(&tree, source) {
        let line = call.node.start_position().row + 1;
        let Some(kind) = StepKind::from_marker(call.marker) else {
            continue;
        };
        let statement = statement_range(&call.node);
        let Some(block) = step_metadata(source, statement.start) else {
            tracing::warn!("Step '{}' at line {} has no metadata block", call.signature, line);
            harvest.warnings.push(format!(
                "line {line}: '{}' has no metadata block, skipped",
                call.signature
            ));
            continue;
        };
        let meta = match TemplateMeta::from_block(&block.metadata) {
            Ok(meta) => meta,
            Err(e) => {
                harvest
                    .errors
                    .push(format!("line {line}: '{}': {e}", call.signature));
                continue;
            }
        };

        let params = callback_parameters(&call.node, source, &call.signature, &mut harvest);
        harvest.templates.push(HarvestedTemplate {
            kind,
            signature: call.signature,
            meta,
            params,
            definition: node_text(&call.node, source).to_string(),
            line,
        });
    }

    Ok(harvest)
}
