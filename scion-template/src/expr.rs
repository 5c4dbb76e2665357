//! `_exclude` rule parsing and evaluation.
//!
//! Copier accepts arbitrary Jinja in `_exclude`. Only three shapes are
//! evaluated here:
//!
//! ```text
//! app/legacy.py                                          always excluded
//! {% if not use_database %}app/extensions.py{% endif %}  excluded when the flag is falsy
//! {% if use_docs %}docs/internal/{% endif %}             excluded when the flag is truthy
//! ```
//!
//! Anything else parses to an [`UnsupportedRule`] so callers can surface it
//! instead of silently classifying with an incomplete exclusion set.

use std::collections::BTreeSet;
use std::fmt;

use regex::Regex;
use serde::Serialize;

use scion_core::Answers;

use crate::error::TemplateError;

/// Boolean condition over template answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Truthiness of a single answer; absent answers are false.
    Flag(String),
    Not(Box<Condition>),
}

impl Condition {
    pub fn eval(&self, answers: &Answers) -> bool {
        match self {
            Condition::Flag(name) => answers.flag(name),
            Condition::Not(inner) => !inner.eval(answers),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Flag(name) => f.write_str(name),
            Condition::Not(inner) => write!(f, "not {inner}"),
        }
    }
}

/// A parsed `_exclude` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludeRule {
    Always { path: String },
    When { condition: Condition, path: String },
}

impl ExcludeRule {
    pub fn path(&self) -> &str {
        match self {
            ExcludeRule::Always { path } | ExcludeRule::When { path, .. } => path,
        }
    }

    /// Whether the rule excludes its path for these answers.
    pub fn applies(&self, answers: &Answers) -> bool {
        match self {
            ExcludeRule::Always { .. } => true,
            ExcludeRule::When { condition, .. } => condition.eval(answers),
        }
    }
}

/// An `_exclude` entry outside the evaluated subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedRule {
    pub raw: String,
    pub reason: &'static str,
}

/// Parser for `_exclude` entries.
#[derive(Debug, Clone)]
pub struct ExcludeParser {
    conditional: Regex,
}

impl ExcludeParser {
    pub fn new() -> Result<Self, TemplateError> {
        let conditional = Regex::new(
            r"^\{%-?\s*if\s+(not\s+)?([A-Za-z_]\w*)\s*-?%\}(.+?)\{%-?\s*endif\s*-?%\}$",
        )?;
        Ok(Self { conditional })
    }

    pub fn parse(&self, raw: &str) -> Result<ExcludeRule, UnsupportedRule> {
        let entry = raw.trim();
        let unsupported = |reason| UnsupportedRule {
            raw: raw.to_string(),
            reason,
        };

        if let Some(caps) = self.conditional.captures(entry) {
            let flag = Condition::Flag(caps[2].to_string());
            let condition = if caps.get(1).is_some() {
                Condition::Not(Box::new(flag))
            } else {
                flag
            };
            let path = normalize_path(&caps[3]);
            if has_template_syntax(&path) {
                return Err(unsupported("guarded path is itself templated"));
            }
            if has_glob(&path) {
                return Err(unsupported("glob patterns are not evaluated"));
            }
            if path.is_empty() {
                return Err(unsupported("guarded path is empty"));
            }
            return Ok(ExcludeRule::When { condition, path });
        }

        if has_template_syntax(entry) {
            return Err(unsupported(
                "only `{% if [not] <flag> %}<path>{% endif %}` conditions are evaluated",
            ));
        }
        if has_glob(entry) {
            return Err(unsupported("glob patterns are not evaluated"));
        }
        let path = normalize_path(entry);
        if path.is_empty() {
            return Err(unsupported("empty path"));
        }
        Ok(ExcludeRule::Always { path })
    }
}

/// Result of evaluating every `_exclude` entry against one app's answers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Exclusions {
    /// Paths excluded for these answers.
    pub paths: BTreeSet<String>,
    /// Entries that could not be evaluated.
    pub unsupported: Vec<UnsupportedRule>,
}

impl Exclusions {
    /// Whether `output_path` is excluded: an exact match or inside an excluded directory.
    pub fn excludes(&self, output_path: &str) -> bool {
        self.paths.iter().any(|excluded| {
            output_path == excluded
                || output_path
                    .strip_prefix(excluded.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

/// Evaluate `rules` (raw `_exclude` entries) against `answers`.
pub fn evaluate_excludes(rules: &[String], answers: &Answers) -> Result<Exclusions, TemplateError> {
    let parser = ExcludeParser::new()?;
    let mut exclusions = Exclusions::default();
    for raw in rules {
        match parser.parse(raw) {
            Ok(rule) => {
                if rule.applies(answers) {
                    exclusions.paths.insert(rule.path().to_string());
                }
            }
            Err(unsupported) => {
                tracing::warn!(
                    rule = %unsupported.raw,
                    reason = unsupported.reason,
                    "unsupported _exclude rule ignored"
                );
                exclusions.unsupported.push(unsupported);
            }
        }
    }
    Ok(exclusions)
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim();
    let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
    trimmed.trim_end_matches('/').to_string()
}

fn has_template_syntax(s: &str) -> bool {
    s.contains("{{") || s.contains("{%") || s.contains("{#")
}

fn has_glob(s: &str) -> bool {
    s.contains(['*', '?', '['])
}
