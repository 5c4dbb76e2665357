//! Drift detection for template-owned files.
//!
//! Each template-owned file lands in exactly one bucket:
//!
//! | bucket        | meaning                                                      |
//! |---------------|--------------------------------------------------------------|
//! | missing       | absent from the app                                          |
//! | post-adoption | committed changes since the sync baseline                    |
//! | pre-existing  | non-templated, unchanged since sync, bytes differ from source |
//! | unverifiable  | templated and unchanged since sync                           |
//! | matching      | non-templated, unchanged since sync, bytes equal source      |

use std::path::Path;

use serde::Serialize;

use scion_core::{CommitSha, Git};
use scion_template::TemplateFile;

use crate::diff::{count_changes, source_diff, LineCounts};
use crate::error::{io_err, SyncError};

/// A template-owned file the app modified after adopting the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostAdoptionChange {
    pub path: String,
    pub counts: LineCounts,
    pub diff: String,
    /// One-line commits touching the file since the baseline.
    pub commits: Vec<String>,
    /// The file also differs from its template source.
    pub also_diverges: bool,
}

/// A non-templated file that already differed from its source at adoption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDivergence {
    pub path: String,
    pub source_path: String,
    pub counts: LineCounts,
    pub diff: String,
}

/// A templated file that cannot be checked without re-rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnverifiableFile {
    pub path: String,
    pub source_path: String,
}

/// Mutually exclusive counts over the template-owned files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DriftSummary {
    pub matching: usize,
    pub unverifiable: usize,
    pub post_adoption: usize,
    pub pre_existing: usize,
    pub missing: usize,
}

impl DriftSummary {
    pub fn total(&self) -> usize {
        self.matching + self.unverifiable + self.post_adoption + self.pre_existing + self.missing
    }
}

/// Findings for one app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DriftReport {
    pub checked: usize,
    pub post_adoption: Vec<PostAdoptionChange>,
    pub pre_existing: Vec<SourceDivergence>,
    pub unverifiable: Vec<UnverifiableFile>,
    pub missing: Vec<String>,
}

impl DriftReport {
    pub fn summary(&self) -> DriftSummary {
        let flagged = self.post_adoption.len()
            + self.pre_existing.len()
            + self.unverifiable.len()
            + self.missing.len();
        DriftSummary {
            matching: self.checked.saturating_sub(flagged),
            unverifiable: self.unverifiable.len(),
            post_adoption: self.post_adoption.len(),
            pre_existing: self.pre_existing.len(),
            missing: self.missing.len(),
        }
    }

    /// Whether anything other than unverifiable files was found.
    pub fn has_findings(&self) -> bool {
        !self.post_adoption.is_empty() || !self.pre_existing.is_empty() || !self.missing.is_empty()
    }

    /// Post-adoption changes whose file also differs from its source.
    pub fn also_diverging(&self) -> usize {
        self.post_adoption.iter().filter(|c| c.also_diverges).count()
    }
}

/// Check every template-owned file of the app at `app_dir` against its
/// source in `source_dir` and against history since `baseline`.
pub fn detect(
    git: &Git,
    baseline: &CommitSha,
    app_dir: &Path,
    source_dir: &Path,
    template_owned: &[TemplateFile],
) -> Result<DriftReport, SyncError> {
    let mut report = DriftReport {
        checked: template_owned.len(),
        ..DriftReport::default()
    };

    for file in template_owned {
        let app_file = app_dir.join(&file.output_path);
        if !app_file.is_file() {
            report.missing.push(file.output_path.clone());
            continue;
        }

        let mut post = post_adoption_change(git, baseline, &file.output_path)?;

        if file.templated {
            if post.is_none() {
                report.unverifiable.push(UnverifiableFile {
                    path: file.output_path.clone(),
                    source_path: file.source_path.clone(),
                });
            }
        } else {
            let source = source_dir.join(&file.source_path);
            if let Some(divergence) = compare_with_source(file, &source, &app_file)? {
                match post.as_mut() {
                    Some(change) => change.also_diverges = true,
                    None => report.pre_existing.push(divergence),
                }
            }
        }

        if let Some(change) = post {
            report.post_adoption.push(change);
        }
    }

    Ok(report)
}

fn post_adoption_change(
    git: &Git,
    baseline: &CommitSha,
    output_path: &str,
) -> Result<Option<PostAdoptionChange>, SyncError> {
    let pathspec = literal_pathspec(output_path);
    let pathspecs = [pathspec.as_str()];
    if !git.changed_since(baseline, &pathspecs)? {
        return Ok(None);
    }
    let diff = git.diff_since(baseline, &pathspecs, false)?;
    let commits = git.log_since(baseline, &pathspecs)?;
    Ok(Some(PostAdoptionChange {
        path: output_path.to_string(),
        counts: count_changes(&diff),
        diff,
        commits,
        also_diverges: false,
    }))
}

fn compare_with_source(
    file: &TemplateFile,
    source: &Path,
    app_file: &Path,
) -> Result<Option<SourceDivergence>, SyncError> {
    let template_bytes = std::fs::read(source).map_err(|e| io_err(source, e))?;
    let app_bytes = std::fs::read(app_file).map_err(|e| io_err(app_file, e))?;
    if template_bytes == app_bytes {
        return Ok(None);
    }
    let diff = source_diff(
        &String::from_utf8_lossy(&template_bytes),
        &String::from_utf8_lossy(&app_bytes),
        &file.source_path,
        &file.output_path,
    );
    Ok(Some(SourceDivergence {
        path: file.output_path.clone(),
        source_path: file.source_path.clone(),
        counts: count_changes(&diff),
        diff,
    }))
}

/// Pathspec matching `path` exactly, without glob expansion.
fn literal_pathspec(path: &str) -> String {
    format!(":(literal){path}")
}
