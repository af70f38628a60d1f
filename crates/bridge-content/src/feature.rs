//! Gherkin-like feature documents
//!
//! Parsing is line based and pure. Line numbers are kept so the identifier
//! write-back ([`insert_scenario_tag`]) can edit a file without re-rendering it.

use std::collections::{HashMap, HashSet};
use std::fmt;

use bridge_fs::{NormalizedPath, discover_files, io};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Step keyword at the start of a step line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {
    Given,
    When,
    Then,
    And,
    But,
}

impl Keyword {
    pub const ALL: [Keyword; 5] = [
        Keyword::Given,
        Keyword::When,
        Keyword::Then,
        Keyword::And,
        Keyword::But,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Given => "Given",
            Self::When => "When",
            Self::Then => "Then",
            Self::And => "And",
            Self::But => "But",
        }
    }

    /// Split `line` into its keyword and the text after it.
    pub fn split(line: &str) -> Option<(Keyword, &str)> {
        Self::ALL.into_iter().find_map(|kw| {
            let rest = line.strip_prefix(kw.as_str())?;
            rest.starts_with(char::is_whitespace)
                .then_some((kw, rest.trim()))
        })
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureStep {
    pub keyword: Keyword,
    /// Text after the keyword.
    pub text: String,
    /// 1-based position within the scenario.
    pub order: usize,
    pub line: usize,
}

impl FeatureStep {
    /// The step as written, keyword included.
    pub fn full_text(&self) -> String {
        format!("{} {}", self.keyword, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub description: String,
    pub outline: bool,
    /// Tag names without the leading `@`.
    pub tags: Vec<String>,
    pub steps: Vec<FeatureStep>,
    /// Line of the `Scenario:` header.
    pub line: usize,
    /// Line of the last tag line directly above the header.
    pub tag_line: Option<usize>,
}

impl Scenario {
    /// Header text as written after `Scenario:`.
    pub fn header(&self) -> String {
        if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("[{}] {}", self.title, self.description)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureDocument {
    pub title: String,
    pub description: String,
    /// Tags above `Feature:`, applied to the suite.
    pub tags: Vec<String>,
    pub scenarios: Vec<Scenario>,
}

fn parse_tag_line(line: &str) -> Vec<String> {
    line.split_whitespace()
        .filter_map(|token| token.strip_prefix('@'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split a scenario header into title and description.
///
/// `[Short] Longer text` yields `("Short", "Longer text")`; without brackets
/// the whole header is the title.
pub fn split_header(header: &str) -> (String, String) {
    let header = header.trim();
    if let Some(rest) = header.strip_prefix('[')
        && let Some(close) = rest.find(']')
    {
        return (
            rest[..close].trim().to_string(),
            rest[close + 1..].trim().to_string(),
        );
    }
    (header.to_string(), String::new())
}

fn scenario_header(line: &str) -> Option<(bool, &str)> {
    if let Some(rest) = line.strip_prefix("Scenario Outline:") {
        return Some((true, rest));
    }
    if let Some(rest) = line.strip_prefix("Scenario Template:") {
        return Some((true, rest));
    }
    line.strip_prefix("Scenario:")
        .or_else(|| line.strip_prefix("Example:"))
        .map(|rest| (false, rest))
}

enum Section {
    Preamble,
    FeatureDescription,
    Scenario,
    Other,
}

/// Lines of a feature file that the document model owns.
#[derive(Debug, Default)]
struct Layout {
    /// Feature tag lines, the `Feature:` line and description lines
    header: Vec<usize>,
    /// One per scenario, in document order
    scenarios: Vec<ScenarioLines>,
}

#[derive(Debug)]
struct ScenarioLines {
    tags: Vec<usize>,
    /// First and last line of the block, examples and comments included
    start: usize,
    end: usize,
}

/// Parse feature text. Returns `None` when there is no `Feature:` title.
pub fn parse(text: &str) -> Option<FeatureDocument> {
    parse_layout(text).map(|(document, _)| document)
}

fn parse_layout(text: &str) -> Option<(FeatureDocument, Layout)> {
    let mut title: Option<String> = None;
    let mut description: Vec<&str> = Vec::new();
    let mut feature_tags = Vec::new();
    let mut scenarios: Vec<Scenario> = Vec::new();
    let mut pending_tags: Vec<String> = Vec::new();
    let mut pending_tag_lines: Vec<usize> = Vec::new();
    let mut section = Section::Preamble;
    let mut layout = Layout::default();
    let mut block_open = false;
    let mut last_line = 0;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('@') {
            pending_tags.extend(parse_tag_line(line));
            pending_tag_lines.push(line_no);
            continue;
        }

        if let Some(rest) = line.strip_prefix("Feature:") {
            title = Some(rest.trim().to_string());
            feature_tags = std::mem::take(&mut pending_tags);
            layout.header.append(&mut pending_tag_lines);
            layout.header.push(line_no);
            section = Section::FeatureDescription;
            continue;
        }

        if let Some((outline, rest)) = scenario_header(line) {
            let start = pending_tag_lines.first().copied().unwrap_or(line_no);
            if block_open && let Some(previous) = layout.scenarios.last_mut() {
                previous.end = start - 1;
            }
            let (scenario_title, scenario_description) = split_header(rest);
            scenarios.push(Scenario {
                title: scenario_title,
                description: scenario_description,
                outline,
                tags: std::mem::take(&mut pending_tags),
                steps: Vec::new(),
                line: line_no,
                tag_line: pending_tag_lines.last().copied(),
            });
            layout.scenarios.push(ScenarioLines {
                tags: std::mem::take(&mut pending_tag_lines),
                start,
                end: line_no,
            });
            block_open = true;
            section = Section::Scenario;
            continue;
        }

        let examples = line.starts_with("Examples:") || line.starts_with("Scenarios:");
        if examples || line.starts_with("Background:") || line.starts_with("Rule:") {
            // Examples belong to the scenario above; the others end its block
            if !examples && block_open {
                let start = pending_tag_lines.first().copied().unwrap_or(line_no);
                if let Some(previous) = layout.scenarios.last_mut() {
                    previous.end = start - 1;
                }
                block_open = false;
            }
            pending_tags.clear();
            pending_tag_lines.clear();
            section = Section::Other;
            continue;
        }

        match section {
            Section::Scenario => {
                if let Some((keyword, step_text)) = Keyword::split(line)
                    && let Some(scenario) = scenarios.last_mut()
                {
                    let order = scenario.steps.len() + 1;
                    scenario.steps.push(FeatureStep {
                        keyword,
                        text: step_text.to_string(),
                        order,
                        line: line_no,
                    });
                }
            }
            Section::FeatureDescription => {
                description.push(line);
                layout.header.push(line_no);
            }
            Section::Preamble | Section::Other => {}
        }
    }
    if block_open && let Some(last) = layout.scenarios.last_mut() {
        last.end = last_line;
    }

    match title {
        Some(title) if !title.is_empty() => Some((
            FeatureDocument {
                title,
                description: description.join("\n"),
                tags: feature_tags,
                scenarios,
            },
            layout,
        )),
        _ => {
            tracing::warn!("Feature text has no 'Feature:' title, skipping");
            None
        }
    }
}

fn tag_text(indent: &str, tags: &[String]) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let line: Vec<String> = tags.iter().map(|t| format!("@{t}")).collect();
    format!("{indent}{}\n", line.join(" "))
}

fn render_header(document: &FeatureDocument) -> String {
    let mut out = tag_text("", &document.tags);
    out.push_str(&format!("Feature: {}\n", document.title));
    for line in document.description.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out
}

fn render_scenario(out: &mut String, scenario: &Scenario) {
    out.push_str(&tag_text("  ", &scenario.tags));
    let keyword = if scenario.outline {
        "Scenario Outline"
    } else {
        "Scenario"
    };
    out.push_str(&format!("  {keyword}: {}\n", scenario.header()));
    for step in &scenario.steps {
        out.push_str(&format!("    {}\n", step.full_text()));
    }
}

/// Render a document as canonical feature text.
pub fn render(document: &FeatureDocument) -> String {
    let mut out = render_header(document);
    for scenario in &document.scenarios {
        out.push('\n');
        render_scenario(&mut out, scenario);
    }
    out
}

fn step_texts(scenario: &Scenario) -> Vec<String> {
    scenario.steps.iter().map(FeatureStep::full_text).collect()
}

fn indent_of(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

/// Emit `text` in place of the first of `lines` and drop the rest.
fn replace_lines(plan: &mut [Option<String>], lines: &[usize], text: String) {
    let mut text = Some(text);
    for line in lines {
        plan[line - 1] = text.take();
    }
}

fn patch_scenario(
    plan: &mut [Option<String>],
    source_lines: &[&str],
    current: &Scenario,
    lines: &ScenarioLines,
    desired: &Scenario,
) {
    let header_idx = current.line - 1;
    let header_raw = source_lines[header_idx];
    let indent = indent_of(header_raw);

    if desired.header() != current.header() {
        let keyword = header_raw
            .trim()
            .split_once(':')
            .map_or("Scenario", |(keyword, _)| keyword);
        plan[header_idx] = Some(format!("{indent}{keyword}: {}\n", desired.header()));
    }

    if step_texts(desired) != step_texts(current) {
        let step_indent = match current.steps.first() {
            Some(step) => indent_of(source_lines[step.line - 1]).to_string(),
            None => format!("{indent}  "),
        };
        let text: String = desired
            .steps
            .iter()
            .map(|s| format!("{step_indent}{}\n", s.full_text()))
            .collect();
        if current.steps.is_empty() {
            if let Some(header) = &mut plan[header_idx] {
                if !header.ends_with('\n') {
                    header.push('\n');
                }
                header.push_str(&text);
            }
        } else {
            let step_lines: Vec<usize> = current.steps.iter().map(|s| s.line).collect();
            replace_lines(plan, &step_lines, text);
        }
    }

    if desired.tags != current.tags {
        let tags = tag_text(indent, &desired.tags);
        if lines.tags.is_empty() {
            if let Some(header) = &mut plan[header_idx] {
                header.insert_str(0, &tags);
            }
        } else {
            replace_lines(plan, &lines.tags, tags);
        }
    }
}

/// Update `source` to hold `document`, editing only the lines the document owns.
///
/// Scenarios are matched by `key`. A matched scenario takes the document's
/// tags, header and steps; its keyword, examples and step arguments stay as
/// written. File scenarios whose key the document lacks are removed with
/// their whole block, scenarios without a key are left alone, and document
/// scenarios missing from the file are appended. Text without a `Feature:`
/// title is replaced by [`render`].
pub fn merge<F>(source: &str, document: &FeatureDocument, key: F) -> String
where
    F: Fn(&Scenario) -> Option<String>,
{
    let Some((current, layout)) = parse_layout(source) else {
        return render(document);
    };
    let source_lines: Vec<&str> = source.split_inclusive('\n').collect();
    let mut plan: Vec<Option<String>> =
        source_lines.iter().map(|l| Some(l.to_string())).collect();

    let header = render_header(document);
    if header != render_header(&current) {
        replace_lines(&mut plan, &layout.header, header);
    }

    let wanted: HashMap<String, &Scenario> = document
        .scenarios
        .iter()
        .filter_map(|s| Some((key(s)?, s)))
        .collect();
    let mut placed: HashSet<String> = HashSet::new();
    let mut removed = false;
    for (scenario, lines) in current.scenarios.iter().zip(&layout.scenarios) {
        let Some(k) = key(scenario) else {
            continue;
        };
        match wanted.get(&k) {
            Some(desired) => {
                if placed.insert(k) {
                    patch_scenario(&mut plan, &source_lines, scenario, lines, desired);
                }
            }
            None => {
                for line in lines.start..=lines.end {
                    plan[line - 1] = None;
                }
                removed = true;
            }
        }
    }

    let mut out: String = plan.into_iter().flatten().collect();
    if removed {
        while out.ends_with("\n\n") {
            out.pop();
        }
    }
    let missing = document.scenarios.iter().filter(|s| match key(s) {
        Some(k) => !placed.contains(&k),
        None => !current.scenarios.iter().any(|c| c.header() == s.header()),
    });
    for scenario in missing {
        if !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        render_scenario(&mut out, scenario);
    }
    out
}

/// Add `@tag` to a scenario in `text`, leaving every other line untouched.
///
/// The tag is appended to the scenario's tag line when it has one, otherwise
/// a new tag line is inserted above the header with the same indentation.
pub fn insert_scenario_tag(text: &str, scenario: &Scenario, tag: &str) -> String {
    let tag = tag.trim_start_matches('@');
    let mut out = String::with_capacity(text.len() + tag.len() + 8);

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        match scenario.tag_line {
            Some(tag_line) if tag_line == line_no => {
                let (body, ending) = split_line_ending(line);
                out.push_str(body.trim_end());
                out.push_str(&format!(" @{tag}"));
                out.push_str(ending);
            }
            None if scenario.line == line_no => {
                let indent: String = line
                    .chars()
                    .take_while(|c| *c == ' ' || *c == '\t')
                    .collect();
                let (_, ending) = split_line_ending(line);
                let ending = if ending.is_empty() { "\n" } else { ending };
                out.push_str(&format!("{indent}@{tag}{ending}"));
                out.push_str(line);
            }
            _ => out.push_str(line),
        }
    }
    out
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// A feature file found on disk.
#[derive(Debug, Clone)]
pub struct FeatureFile {
    pub path: NormalizedPath,
    pub source: String,
    pub document: FeatureDocument,
}

/// Outcome of scanning a features directory.
#[derive(Debug, Default)]
pub struct FeatureScan {
    pub files: Vec<FeatureFile>,
    /// Files that could not be read or had no title: (path, message).
    pub errors: Vec<(NormalizedPath, String)>,
}

/// Parse every `.feature` file under `root`.
///
/// A missing root is fatal. Unreadable or untitled files are reported in
/// [`FeatureScan::errors`] and the scan continues.
pub fn discover_features(root: &NormalizedPath) -> Result<FeatureScan> {
    let mut scan = FeatureScan::default();
    for path in discover_files(root, "feature")? {
        let source = match io::read_text(&path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!("Cannot read {}: {}", path, e);
                scan.errors.push((path, e.to_string()));
                continue;
            }
        };
        match parse(&source) {
            Some(document) => scan.files.push(FeatureFile {
                path,
                source,
                document,
            }),
            None => scan
                .errors
                .push((path, "missing 'Feature:' title".to_string())),
        }
    }
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracket_header_splits_title_and_description() {
        let (title, description) = split_header("[Login ok] User logs in with valid credentials");
        assert_eq!(title, "Login ok");
        assert_eq!(description, "User logs in with valid credentials");
    }

    #[test]
    fn plain_header_keeps_full_title() {
        let (title, description) = split_header("User logs in");
        assert_eq!(title, "User logs in");
        assert_eq!(description, "");
    }

    #[test]
    fn keyword_requires_following_space() {
        assert!(Keyword::split("Givenchy is a brand").is_none());
        assert_eq!(
            Keyword::split("And I wait"),
            Some((Keyword::And, "I wait"))
        );
    }

    #[test]
    fn missing_title_yields_none() {
        assert!(parse("Scenario: orphan\n  Given x\n").is_none());
        assert!(parse("Feature:   \n").is_none());
    }

    #[test]
    fn background_steps_are_not_attached_to_scenarios() {
        let doc = parse(
            "Feature: F\n  Background:\n    Given setup\n  Scenario: S\n    When act\n",
        )
        .unwrap();
        assert_eq!(doc.scenarios.len(), 1);
        assert_eq!(doc.scenarios[0].steps.len(), 1);
    }
}
