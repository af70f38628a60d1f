//! Edit records for source modification.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// The kind of edit operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditKind {
    /// New content was inserted.
    Insert,
    /// Existing content was replaced.
    Replace,
    /// Content was removed.
    Delete,
}

/// An edit applied to a source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edit {
    pub kind: EditKind,
    /// Byte range in the original source that the edit touched.
    pub span: Range<usize>,
    /// New content (for Insert and Replace).
    pub new_content: Option<String>,
}

impl Edit {
    pub fn insert(at: usize, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Insert,
            span: at..at,
            new_content: Some(content.into()),
        }
    }

    pub fn replace(span: Range<usize>, content: impl Into<String>) -> Self {
        Self {
            kind: EditKind::Replace,
            span,
            new_content: Some(content.into()),
        }
    }

    pub fn delete(span: Range<usize>) -> Self {
        Self {
            kind: EditKind::Delete,
            span,
            new_content: None,
        }
    }

    /// Apply this edit to the source it was computed against.
    pub fn apply(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        out.push_str(&source[..self.span.start]);
        if let Some(content) = &self.new_content {
            out.push_str(content);
        }
        out.push_str(&source[self.span.end..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_replace_and_delete() {
        let source = "abc def ghi";
        assert_eq!(Edit::replace(4..7, "XYZ").apply(source), "abc XYZ ghi");
        assert_eq!(Edit::delete(3..7).apply(source), "abc ghi");
        assert_eq!(Edit::insert(0, ">").apply(source), ">abc def ghi");
    }
}
