//! Import line handling for generated step files
//!
//! Only single-line ES imports are recognised. Named imports
//! (`import { a, b } from 'x';`) can be merged; any other form is matched
//! verbatim.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use crate::edit::Edit;

static IMPORT_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^import\b[^\n]*$").expect("Invalid import line regex"));

static NAMED_IMPORT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^import\s*(type\s+)?\{([^}]*)\}\s*from\s*(['"])([^'"]+)['"]\s*;?\s*$"#)
        .expect("Invalid named import regex")
});

/// One import statement found in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    pub text: String,
    /// Byte range of the line, without its newline.
    pub span: Range<usize>,
    pub named: Option<NamedImport>,
}

/// `import { a, b } from 'source';`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedImport {
    pub names: Vec<String>,
    pub source: String,
    pub quote: char,
    pub type_only: bool,
}

impl NamedImport {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = NAMED_IMPORT_REGEX.captures(line.trim())?;
        Some(Self {
            type_only: caps.get(1).is_some(),
            names: caps[2]
                .split(',')
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .collect(),
            quote: caps[3].chars().next().unwrap_or('\''),
            source: caps[4].to_string(),
        })
    }

    pub fn render(&self) -> String {
        format!(
            "import {}{{ {} }} from {q}{}{q};",
            if self.type_only { "type " } else { "" },
            self.names.join(", "),
            self.source,
            q = self.quote
        )
    }
}

/// All import lines in `source`, in order.
pub fn parse_imports(source: &str) -> Vec<ImportLine> {
    IMPORT_LINE_REGEX
        .find_iter(source)
        .map(|m| ImportLine {
            text: m.as_str().to_string(),
            span: m.start()..m.end(),
            named: NamedImport::parse(m.as_str()),
        })
        .collect()
}

/// Make sure `required` is satisfied by the imports of `source`.
///
/// Names missing from an existing import of the same source are merged into
/// it. Otherwise the line is inserted after the last import, or after the
/// leading metadata block when the file has no imports yet. Returns `None`
/// when nothing needs to change.
pub fn ensure_import(source: &str, required: &str) -> Option<Edit> {
    let required = required.trim();
    if required.is_empty() {
        return None;
    }
    let existing = parse_imports(source);

    if let Some(wanted) = NamedImport::parse(required) {
        let same_source = existing.iter().find(|line| {
            line.named
                .as_ref()
                .is_some_and(|n| n.source == wanted.source && n.type_only == wanted.type_only)
        });
        if let Some(line) = same_source
            && let Some(named) = &line.named
        {
            let missing: Vec<&String> = wanted
                .names
                .iter()
                .filter(|name| !named.names.contains(name))
                .collect();
            if missing.is_empty() {
                return None;
            }
            let mut merged = named.clone();
            merged.names.extend(missing.into_iter().cloned());
            return Some(Edit::replace(line.span.clone(), merged.render()));
        }
    } else if existing.iter().any(|line| line.text.trim() == required) {
        return None;
    }

    Some(insertion(source, &existing, required))
}

fn insertion(source: &str, existing: &[ImportLine], line: &str) -> Edit {
    if let Some(last) = existing.last() {
        return Edit::insert(last.span.end, format!("\n{line}"));
    }
    if let Some(block) = bridge_blocks::find_leading_block(source, "type") {
        return Edit::insert(block.span.end, format!("\n{line}"));
    }
    if source.trim().is_empty() {
        return Edit::insert(0, format!("{line}\n"));
    }
    let separator = if source.starts_with('\n') { "\n" } else { "\n\n" };
    Edit::insert(0, format!("{line}{separator}"))
}

/// Apply every required import in turn.
pub fn ensure_imports(source: &str, required: &[String]) -> String {
    let mut current = source.to_string();
    for line in required {
        if let Some(edit) = ensure_import(&current, line) {
            tracing::debug!("Adding import: {}", line.trim());
            current = edit.apply(&current);
        }
    }
    current
}
