//! The Copier answers file recorded in every generated repository.
//!
//! Parsed as a whole YAML mapping; `_commit` (template version) and
//! `_src_path` (template location) are read from it, and every other key is
//! a template answer such as a feature flag.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{io_err, WorkspaceError};

/// Name of the answers file at the root of a generated repository.
pub const ANSWERS_FILE: &str = ".copier-answers.yml";

/// Prefix of the answers that toggle optional template features.
pub const FEATURE_FLAG_PREFIX: &str = "use_";

/// Parsed `.copier-answers.yml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Answers {
    values: BTreeMap<String, Value>,
}

impl Answers {
    /// Path of the answers file inside `repo`.
    pub fn path_in(repo: &Path) -> PathBuf {
        repo.join(ANSWERS_FILE)
    }

    /// Whether `repo` is Copier-managed.
    pub fn exists_in(repo: &Path) -> bool {
        Self::path_in(repo).is_file()
    }

    /// Load the answers file of `repo`.
    ///
    /// Returns [`WorkspaceError::AnswersNotFound`] when the file is absent.
    pub fn load(repo: &Path) -> Result<Self, WorkspaceError> {
        let path = Self::path_in(repo);
        if !path.is_file() {
            return Err(WorkspaceError::AnswersNotFound {
                dir: repo.to_path_buf(),
                file: ANSWERS_FILE,
            });
        }
        let text = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        Self::parse(&text, &path)
    }

    /// Parse answers text. `path` is only used for error context.
    pub fn parse(text: &str, path: &Path) -> Result<Self, WorkspaceError> {
        // An empty document deserializes as null, not as an empty mapping.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| WorkspaceError::AnswersParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Template version reference recorded as `_commit`.
    pub fn template_version(&self) -> Option<String> {
        self.get("_commit").and_then(scalar_to_string)
    }

    /// Relative path from the repository back to the template source.
    pub fn src_path(&self) -> Option<String> {
        self.get("_src_path")
            .and_then(scalar_to_string)
            .filter(|s| !s.is_empty())
    }

    /// Truthiness of an answer; absent answers are false.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).map(is_truthy).unwrap_or(false)
    }

    /// Boolean answers whose key starts with [`FEATURE_FLAG_PREFIX`], sorted by key.
    pub fn feature_flags(&self) -> Vec<(&str, bool)> {
        self.values
            .iter()
            .filter(|(k, _)| k.starts_with(FEATURE_FLAG_PREFIX))
            .filter_map(|(k, v)| v.as_bool().map(|b| (k.as_str(), b)))
            .collect()
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Template-engine truthiness: empty strings, zero, empty collections and null are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(tagged) => is_truthy(&tagged.value),
    }
}
