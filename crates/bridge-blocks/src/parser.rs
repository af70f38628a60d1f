//! Metadata block parsing.
//!
//! Parses JSDoc-style blocks of the form:
//! ```text
//! /**
//!  * @name Click button
//!  * @description Clicks a button by its
//!  *   accessible label
//!  * @icon MOUSE
//!  */
//! ```
//! Continuation lines are folded into the preceding tag's value.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::error::{Error, Result};

/// Regex for matching `/** ... */` comment blocks (non-greedy, multi-line).
static COMMENT_BLOCK_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*\*.*?\*/").expect("Invalid comment block regex"));

/// Regex for a tag line body: `@name value`.
static TAG_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z][\w-]*)\s*(.*)$").expect("Invalid tag line regex"));

/// A single `@tag value` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataTag {
    pub name: String,
    pub value: String,
}

/// Ordered tags of one metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBlock {
    pub tags: Vec<MetadataTag>,
}

impl MetadataBlock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, keeps insertion order.
    pub fn with(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Get the first value of a tag (tag names compare case-insensitively).
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .map(|t| t.value.as_str())
    }

    /// Get a tag that must be present and non-empty.
    pub fn require(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            None => Err(Error::MissingTag {
                tag: name.to_string(),
            }),
            Some(v) if v.trim().is_empty() => Err(Error::EmptyTag {
                tag: name.to_string(),
            }),
            Some(v) => Ok(v),
        }
    }

    /// Replace the value of an existing tag or append a new one.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .tags
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
        {
            Some(tag) => tag.value = value,
            None => self.tags.push(MetadataTag {
                name: name.to_string(),
                value,
            }),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// A metadata block located in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentBlock {
    pub metadata: MetadataBlock,
    /// Byte range of the whole comment, `/**` through `*/`.
    pub span: Range<usize>,
    /// 1-based line of the opening `/**`.
    pub start_line: usize,
    /// 1-based line of the closing `*/`.
    pub end_line: usize,
}

/// Parse the tags of a single comment (with or without the delimiters).
pub fn parse_metadata(comment: &str) -> MetadataBlock {
    let body = comment.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut block = MetadataBlock::new();
    for raw in body.lines() {
        let line = raw.trim_start();
        let line = line.strip_prefix('*').unwrap_or(line).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(caps) = TAG_LINE_REGEX.captures(line) {
            block.tags.push(MetadataTag {
                name: caps[1].to_string(),
                value: caps[2].trim().to_string(),
            });
        } else if let Some(last) = block.tags.last_mut() {
            if last.value.is_empty() {
                last.value = line.to_string();
            } else {
                last.value.push(' ');
                last.value.push_str(line);
            }
        }
        // Free text before the first tag is not metadata
    }
    block
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

/// Find every `/** ... */` block in order of appearance.
pub fn find_comment_blocks(source: &str) -> Vec<CommentBlock> {
    COMMENT_BLOCK_REGEX
        .find_iter(source)
        .map(|m| CommentBlock {
            metadata: parse_metadata(m.as_str()),
            span: m.start()..m.end(),
            start_line: line_of(source, m.start()),
            end_line: line_of(source, m.end()),
        })
        .collect()
}

/// Find the block that opens the file and carries `required_tag`.
///
/// Only whitespace may precede it. A block at the top of the file without
/// the tag belongs to whatever follows it (for example a step definition),
/// not to the file.
pub fn find_leading_block(source: &str, required_tag: &str) -> Option<CommentBlock> {
    let first = find_comment_blocks(source).into_iter().next()?;
    if !source[..first.span.start].trim().is_empty() {
        return None;
    }
    first.metadata.has(required_tag).then_some(first)
}

/// Find the block that ends directly before byte `offset`.
///
/// Only whitespace may separate the closing `*/` from `offset`, and the
/// block must end no more than `window_lines` lines above it.
pub fn block_preceding(source: &str, offset: usize, window_lines: usize) -> Option<CommentBlock> {
    let offset = offset.min(source.len());
    let candidate = find_comment_blocks(&source[..offset])
        .into_iter()
        .next_back()?;
    if !source[candidate.span.end..offset].trim().is_empty() {
        return None;
    }
    let target_line = line_of(source, offset);
    if target_line.saturating_sub(candidate.end_line) > window_lines {
        tracing::debug!(
            "Metadata block ending at line {} is outside the {}-line window above line {}",
            candidate.end_line,
            window_lines,
            target_line
        );
        return None;
    }
    Some(candidate)
}
