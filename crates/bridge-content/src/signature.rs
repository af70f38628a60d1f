//! Step signature compilation and matching
//!
//! A signature such as `I click on the {string} button` compiles into an
//! anchored, case-insensitive regex. Matching concrete step text yields the
//! placeholder values in order, typed by the template's declared parameters.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{(string|int|number|boolean)\}").expect("Invalid placeholder regex")
});

static KEYWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Given|When|Then|And|But)\s+").expect("Invalid step keyword regex")
});

/// Closed vocabulary of parameter types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "STRING",
            Self::Integer => "INTEGER",
            Self::Number => "NUMBER",
            Self::Boolean => "BOOLEAN",
        }
    }

    fn from_placeholder(name: &str) -> Self {
        match name {
            "int" => Self::Integer,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            _ => Self::String,
        }
    }

    fn capture_pattern(&self) -> &'static str {
        match self {
            Self::String => r#"("[^"]*"|'[^']*')"#,
            Self::Integer => r"([-+]?\d+)",
            Self::Number => r"([-+]?(?:\d+(?:\.\d*)?|\.\d+))",
            Self::Boolean => r"(true|false)",
        }
    }
}

/// A parameter declared by a step template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub param_type: ParamType,
    /// 0-based position among the template's parameters.
    pub order: usize,
}

/// A value pulled out of concrete step text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedParameter {
    pub name: String,
    pub value: String,
    pub order: usize,
    pub param_type: ParamType,
}

/// A signature compiled into its matching regex.
#[derive(Debug, Clone)]
pub struct CompiledSignature {
    signature: String,
    regex: Regex,
    placeholders: Vec<ParamType>,
}

impl CompiledSignature {
    pub fn signature(&self) -> &str {
        &self.signature
    }

    pub fn placeholders(&self) -> &[ParamType] {
        &self.placeholders
    }

    pub fn as_regex(&self) -> &Regex {
        &self.regex
    }
}

/// Placeholder types of a signature, in order.
pub fn placeholders(signature: &str) -> Vec<ParamType> {
    PLACEHOLDER_REGEX
        .captures_iter(signature)
        .map(|caps| ParamType::from_placeholder(&caps[1]))
        .collect()
}

/// Compile a signature into an anchored case-insensitive regex.
///
/// Everything except the four placeholders is matched literally.
pub fn compile(signature: &str) -> Result<CompiledSignature> {
    let mut pattern = String::from("(?i)^");
    let mut placeholders = Vec::new();
    let mut last = 0;

    for caps in PLACEHOLDER_REGEX.captures_iter(signature) {
        let Some(whole) = caps.get(0) else { continue };
        pattern.push_str(&regex::escape(&signature[last..whole.start()]));
        let ty = ParamType::from_placeholder(&caps[1]);
        pattern.push_str(ty.capture_pattern());
        placeholders.push(ty);
        last = whole.end();
    }
    pattern.push_str(&regex::escape(&signature[last..]));
    pattern.push('$');

    let regex = Regex::new(&pattern).map_err(|e| Error::InvalidSignature {
        signature: signature.to_string(),
        message: e.to_string(),
    })?;

    Ok(CompiledSignature {
        signature: signature.to_string(),
        regex,
        placeholders,
    })
}

/// Remove a leading `Given`/`When`/`Then`/`And`/`But` keyword.
pub fn strip_keyword(text: &str) -> &str {
    let text = text.trim();
    match KEYWORD_REGEX.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Match step text against one compiled signature.
///
/// Captures map positionally onto `params` (sorted by their order). A capture
/// with no declared parameter becomes `arg{i}` typed by its placeholder.
pub fn match_step(
    compiled: &CompiledSignature,
    params: &[ParamSpec],
    text: &str,
) -> Option<Vec<ExtractedParameter>> {
    let caps = compiled.regex.captures(strip_keyword(text))?;

    let mut declared: Vec<&ParamSpec> = params.iter().collect();
    declared.sort_by_key(|p| p.order);

    let extracted = compiled
        .placeholders
        .iter()
        .enumerate()
        .map(|(i, placeholder)| {
            let raw = caps.get(i + 1).map_or("", |m| m.as_str());
            let (name, param_type) = match declared.get(i) {
                Some(spec) => (spec.name.clone(), spec.param_type),
                None => (format!("arg{i}"), *placeholder),
            };
            let value = if *placeholder == ParamType::String {
                unquote(raw)
            } else {
                raw
            };
            ExtractedParameter {
                name,
                value: value.to_string(),
                order: i,
                param_type,
            }
        })
        .collect();

    Some(extracted)
}

/// Try every template in order and return the first match.
pub fn match_against_all<'a, Id, I>(
    text: &str,
    templates: I,
) -> Option<(Id, Vec<ExtractedParameter>)>
where
    I: IntoIterator<Item = (Id, &'a CompiledSignature, &'a [ParamSpec])>,
{
    templates
        .into_iter()
        .find_map(|(id, compiled, params)| match_step(compiled, params, text).map(|p| (id, p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(name: &str, ty: ParamType, order: usize) -> ParamSpec {
        ParamSpec {
            name: name.to_string(),
            param_type: ty,
            order,
        }
    }

    #[test]
    fn metacharacters_are_literal() {
        let compiled = compile("the total is (approx.) {number}?").unwrap();
        assert!(match_step(&compiled, &[], "the total is (approx.) 4.5?").is_some());
        assert!(match_step(&compiled, &[], "the total is Xapprox.Y 4.5?").is_none());
    }

    #[test]
    fn match_is_anchored() {
        let compiled = compile("I log in").unwrap();
        assert!(match_step(&compiled, &[], "Given I log in").is_some());
        assert!(match_step(&compiled, &[], "I log in twice").is_none());
    }

    #[test]
    fn int_accepts_sign_and_bool_is_strict() {
        let compiled = compile("wait {int} seconds then {boolean}").unwrap();
        let params = match_step(&compiled, &[], "wait -3 seconds then true").unwrap();
        assert_eq!(params[0].value, "-3");
        assert_eq!(params[0].param_type, ParamType::Integer);
        assert!(match_step(&compiled, &[], "wait 3 seconds then yes").is_none());
    }

    #[test]
    fn undeclared_captures_fall_back_to_arg_names() {
        let compiled = compile("{string} equals {string}").unwrap();
        let params = match_step(
            &compiled,
            &[spec("left", ParamType::String, 0)],
            "'a' equals \"b\"",
        )
        .unwrap();
        assert_eq!(params[0].name, "left");
        assert_eq!(params[0].value, "a");
        assert_eq!(params[1].name, "arg1");
        assert_eq!(params[1].value, "b");
    }

    #[test]
    fn first_matching_template_wins() {
        let a = compile("I see {string}").unwrap();
        let b = compile("I see \"x\"").unwrap();
        let hit = match_against_all("Then I see \"x\"", [(1, &a, &[][..]), (2, &b, &[][..])]);
        assert_eq!(hit.map(|(id, _)| id), Some(1));
    }
}
