//! Template file inventory and ownership classification.
//!
//! Every regular file under the template source directory maps to the path
//! it renders to in a generated app. Each file is then owned by exactly one
//! party:
//!
//! 1. `App`: listed in `_skip_if_exists` (exact match); checked first.
//! 2. `Excluded`: matched by an evaluated `_exclude` path or lies under one.
//! 3. `Template`: everything else; the only files checked for drift.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use scion_core::Answers;

use crate::config::{TemplateRepo, CONFIG_FILES};
use crate::error::TemplateError;
use crate::expr::{evaluate_excludes, Exclusions};

/// A file of the template source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateFile {
    /// Path the file renders to, relative to the app root, `/`-separated.
    pub output_path: String,
    /// Path of the source, relative to the template source directory.
    pub source_path: String,
    /// Rendered with variable substitution, so not byte-comparable with its source.
    pub templated: bool,
}

/// Map a source path to its rendered output path.
///
/// Returns `None` for dynamically named sources (containing `{{` or `{%`).
/// A source ending in `suffix` is templated and loses the suffix; an empty
/// suffix marks every file as templated without renaming it.
pub fn render_source_path(source_path: &str, suffix: &str) -> Option<TemplateFile> {
    if source_path.contains("{{") || source_path.contains("{%") {
        return None;
    }
    let (output_path, templated) = if suffix.is_empty() {
        (source_path.to_string(), true)
    } else {
        match source_path.strip_suffix(suffix) {
            Some(stripped) if !stripped.is_empty() => (stripped.to_string(), true),
            _ => (source_path.to_string(), false),
        }
    };
    Some(TemplateFile {
        output_path,
        source_path: source_path.to_string(),
        templated,
    })
}

/// Walk `source_dir` and list every template file, sorted by source path.
///
/// `.git` directories are not descended into.
pub fn enumerate(source_dir: &Path, suffix: &str) -> Result<Vec<TemplateFile>, TemplateError> {
    if !source_dir.is_dir() {
        return Err(TemplateError::SourceDirMissing {
            path: source_dir.to_path_buf(),
        });
    }

    let walker = WalkDir::new(source_dir)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || e.file_name() != ".git");

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(source_dir) else {
            continue;
        };
        let Some(source_path) = slash_path(relative) else {
            tracing::warn!(path = %relative.display(), "skipping template file with a non-UTF-8 name");
            continue;
        };
        match render_source_path(&source_path, suffix) {
            Some(file) => files.push(file),
            None => tracing::debug!(source = %source_path, "skipping dynamically named file"),
        }
    }
    files.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    Ok(files)
}

/// `/`-joined components of `path`, or `None` if any is not valid UTF-8.
fn slash_path(path: &Path) -> Option<String> {
    let mut parts = Vec::new();
    for component in path.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str()?);
        }
    }
    Some(parts.join("/"))
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Who owns a file in a generated app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    Template,
    App,
    Excluded,
}

/// Ownership of one output path.
pub fn ownership_of(
    output_path: &str,
    skip_if_exists: &BTreeSet<String>,
    exclusions: &Exclusions,
) -> Ownership {
    if skip_if_exists.contains(output_path) {
        Ownership::App
    } else if exclusions.excludes(output_path) {
        Ownership::Excluded
    } else {
        Ownership::Template
    }
}

/// Template files partitioned by [`Ownership`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub template_owned: Vec<TemplateFile>,
    pub app_owned: Vec<TemplateFile>,
    pub excluded: Vec<TemplateFile>,
}

impl Classification {
    pub fn total(&self) -> usize {
        self.template_owned.len() + self.app_owned.len() + self.excluded.len()
    }
}

/// Partition `files`, preserving their order within each class.
pub fn classify(
    files: Vec<TemplateFile>,
    skip_if_exists: &[String],
    exclusions: &Exclusions,
) -> Classification {
    let skip: BTreeSet<String> = skip_if_exists.iter().cloned().collect();
    let mut classification = Classification::default();
    for file in files {
        match ownership_of(&file.output_path, &skip, exclusions) {
            Ownership::App => classification.app_owned.push(file),
            Ownership::Excluded => classification.excluded.push(file),
            Ownership::Template => classification.template_owned.push(file),
        }
    }
    classification
}

/// A template repository's files classified for one app's answers.
#[derive(Debug, Clone)]
pub struct TemplateInventory {
    pub source_dir: PathBuf,
    pub classification: Classification,
    pub exclusions: Exclusions,
}

impl TemplateInventory {
    /// Enumerate `repo`'s sources and classify them against `answers`.
    pub fn build(repo: &TemplateRepo, answers: &Answers) -> Result<Self, TemplateError> {
        let source_dir = repo.source_dir();
        let exclusions = evaluate_excludes(&repo.config.exclude, answers)?;
        let mut files = enumerate(&source_dir, repo.config.suffix())?;
        if source_dir == repo.root {
            // Copier never renders its own configuration file.
            files.retain(|f| !CONFIG_FILES.contains(&f.source_path.as_str()));
        }
        let classification = classify(files, &repo.config.skip_if_exists, &exclusions);
        tracing::debug!(
            template_owned = classification.template_owned.len(),
            app_owned = classification.app_owned.len(),
            excluded = classification.excluded.len(),
            "classified template files"
        );
        Ok(Self {
            source_dir,
            classification,
            exclusions,
        })
    }
}
