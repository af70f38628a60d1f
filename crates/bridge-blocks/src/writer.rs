//! Metadata block rendering and in-place upsert

use crate::parser::{MetadataBlock, find_leading_block};

/// Render a block as a JSDoc comment, one tag per line.
///
/// Tags with empty values render as a bare `@tag`.
pub fn render(block: &MetadataBlock) -> String {
    let mut out = String::from("/**\n");
    for tag in &block.tags {
        if tag.value.is_empty() {
            out.push_str(&format!(" * @{}\n", tag.name));
        } else {
            out.push_str(&format!(" * @{} {}\n", tag.name, tag.value));
        }
    }
    out.push_str(" */");
    out
}

/// Insert or replace the file's leading block identified by `required_tag`.
///
/// An existing leading block is replaced in place. Otherwise the rendered
/// block is prepended, separated from the rest by a blank line. Applying the
/// same block twice leaves the source unchanged.
pub fn upsert_leading_block(source: &str, block: &MetadataBlock, required_tag: &str) -> String {
    let rendered = render(block);

    if let Some(existing) = find_leading_block(source, required_tag) {
        let mut result = String::with_capacity(source.len() + rendered.len());
        result.push_str(&source[..existing.span.start]);
        result.push_str(&rendered);
        result.push_str(&source[existing.span.end..]);
        return result;
    }

    if source.trim().is_empty() {
        return format!("{rendered}\n");
    }
    format!("{rendered}\n\n{source}")
}
