//! Surgical editing of step-definition files
//!
//! A step block is a marker call (`When(...)` or `Then(...)`) together with
//! the metadata comment directly above it. Blocks are located through the
//! syntax tree when the file parses cleanly, and by paren/brace counting that
//! skips strings and comments otherwise. Everything outside the touched block
//! is left as written.

use std::ops::Range;

use bridge_blocks::{CommentBlock, block_preceding};

use crate::ast;
use crate::edit::{Edit, EditKind};
use crate::error::{Error, Result};

/// Lines above a call searched for its metadata block.
pub const METADATA_WINDOW: usize = 15;

/// Marker calls that register step templates.
pub const MARKERS: [&str; 2] = ["When", "Then"];

/// A marker call located in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSpan {
    pub marker: String,
    /// Unescaped first string argument.
    pub signature: String,
    /// The call expression, without a trailing `;`.
    pub call: Range<usize>,
    /// The whole statement, including a trailing `;` when present.
    pub statement: Range<usize>,
}

/// A step block: optional metadata comment plus its call statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepBlock {
    pub call: CallSpan,
    pub span: Range<usize>,
}

/// Byte index just past the string or comment starting at `i`, if one does.
fn skip_literal(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes[i] {
        quote @ (b'"' | b'\'' | b'`') => {
            let mut j = i + 1;
            while j < bytes.len() {
                match bytes[j] {
                    b'\\' => j += 2,
                    c if c == quote => return Some(j + 1),
                    b'\n' if quote != b'`' => return Some(j),
                    _ => j += 1,
                }
            }
            Some(bytes.len())
        }
        b'/' if bytes.get(i + 1) == Some(&b'/') => Some(
            bytes[i..]
                .iter()
                .position(|&b| b == b'\n')
                .map_or(bytes.len(), |p| i + p),
        ),
        b'/' if bytes.get(i + 1) == Some(&b'*') => Some(
            bytes[i + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(bytes.len(), |p| i + 2 + p + 2),
        ),
        _ => None,
    }
}

/// Index of the bracket closing the one at `open`.
fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = open;
    while i < bytes.len() {
        if let Some(next) = skip_literal(bytes, i) {
            i = next;
            continue;
        }
        match bytes[i] {
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.'
}

/// Unescape the body of a JS string literal.
pub(crate) fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Escape text for a single-quoted JS string literal.
pub fn quote_signature(signature: &str) -> String {
    let escaped = signature.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}'")
}

fn first_string_argument(source: &str, from: usize) -> Option<String> {
    let bytes = source.as_bytes();
    let start = from + bytes[from..].iter().position(|b| !b.is_ascii_whitespace())?;
    if !matches!(bytes[start], b'"' | b'\'' | b'`') {
        return None;
    }
    let end = skip_literal(bytes, start)?;
    // Unterminated literals stop at a newline or the end of input
    if end < start + 2 || bytes[end - 1] != bytes[start] {
        return None;
    }
    source.get(start + 1..end - 1).map(unescape)
}

/// Locate marker calls by counting brackets, skipping strings and comments.
pub fn text_call_spans(source: &str) -> Vec<CallSpan> {
    let bytes = source.as_bytes();
    let mut calls = Vec::new();
    let mut i = 0;

    'scan: while i < bytes.len() {
        if let Some(next) = skip_literal(bytes, i) {
            i = next;
            continue;
        }
        if i == 0 || !is_ident_byte(bytes[i - 1]) {
            for marker in MARKERS {
                if !bytes[i..].starts_with(marker.as_bytes()) {
                    continue;
                }
                let mut open = i + marker.len();
                while open < bytes.len() && bytes[open].is_ascii_whitespace() {
                    open += 1;
                }
                if bytes.get(open) != Some(&b'(') {
                    continue;
                }
                let Some(close) = matching_close(bytes, open) else {
                    continue;
                };
                let Some(signature) = first_string_argument(source, open + 1) else {
                    continue;
                };
                let statement_end = if bytes.get(close + 1) == Some(&b';') {
                    close + 2
                } else {
                    close + 1
                };
                calls.push(CallSpan {
                    marker: marker.to_string(),
                    signature,
                    call: i..close + 1,
                    statement: i..statement_end,
                });
                i = statement_end;
                continue 'scan;
            }
        }
        i += 1;
    }
    calls
}

/// Locate marker calls, preferring the syntax tree.
pub fn call_spans(source: &str) -> Vec<CallSpan> {
    match ast::call_spans(source) {
        Some(spans) => spans,
        None => {
            tracing::debug!("Source does not parse cleanly, locating calls by bracket counting");
            text_call_spans(source)
        }
    }
}

/// The metadata block of the statement starting at `offset`.
///
/// The file's own group block (the one carrying `@type`) never counts.
pub fn step_metadata(source: &str, offset: usize) -> Option<CommentBlock> {
    block_preceding(source, offset, METADATA_WINDOW).filter(|block| !block.metadata.has("type"))
}

fn with_metadata(source: &str, call: CallSpan) -> StepBlock {
    let start = step_metadata(source, call.statement.start)
        .map_or(call.statement.start, |block| block.span.start);
    StepBlock {
        span: start..call.statement.end,
        call,
    }
}

/// Every step block in the file, in source order.
pub fn step_blocks(source: &str) -> Vec<StepBlock> {
    call_spans(source)
        .into_iter()
        .map(|call| with_metadata(source, call))
        .collect()
}

/// Find the block registering `signature` with `marker`.
pub fn find_step_block(source: &str, marker: &str, signature: &str) -> Option<StepBlock> {
    call_spans(source)
        .into_iter()
        .find(|call| call.marker == marker && call.signature == signature)
        .map(|call| with_metadata(source, call))
}

/// Replace the block for `signature`, or append `block` when absent.
///
/// `block` is the full text (metadata comment and statement). Applying the
/// same block twice is a no-op.
pub fn upsert_step_block(
    source: &str,
    marker: &str,
    signature: &str,
    block: &str,
) -> (String, Edit) {
    let edit = match find_step_block(source, marker, signature) {
        Some(found) => Edit::replace(found.span, block),
        None => {
            let body_end = source.trim_end().len();
            let prefix = if body_end == 0 { "" } else { "\n\n" };
            Edit {
                kind: EditKind::Insert,
                span: body_end..source.len(),
                new_content: Some(format!("{prefix}{block}\n")),
            }
        }
    };
    (edit.apply(source), edit)
}

/// Remove the block for `signature`, including the blank line after it.
pub fn remove_step_block(source: &str, marker: &str, signature: &str) -> Result<(String, Edit)> {
    let found = find_step_block(source, marker, signature).ok_or_else(|| Error::BlockNotFound {
        signature: signature.to_string(),
    })?;

    let bytes = source.as_bytes();
    let mut end = found.span.end;
    while end < bytes.len() && bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    let mut start = found.span.start;
    if end == bytes.len() {
        // Last block: drop the separating whitespace before it instead
        while start > 0 && bytes[start - 1].is_ascii_whitespace() {
            start -= 1;
        }
        let edit = Edit::replace(start..end, if start == 0 { "" } else { "\n" });
        return Ok((edit.apply(source), edit));
    }

    let edit = Edit::delete(start..end);
    Ok((edit.apply(source), edit))
}
