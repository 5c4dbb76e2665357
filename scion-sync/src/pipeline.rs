//! Drift audit entrypoint used by `scion violations`.

use std::path::{Path, PathBuf};

use scion_core::{Answers, Git, SyncBaseline, ANSWERS_FILE};
use scion_template::{TemplateInventory, TemplateRepo};

use crate::baseline::find_baseline;
use crate::drift::{detect, DriftReport};
use crate::error::{io_err, SyncError};

/// Everything known about one app after a drift audit.
#[derive(Debug, Clone)]
pub struct AuditResult {
    pub app_dir: PathBuf,
    pub template_root: PathBuf,
    pub answers: Answers,
    pub baseline: SyncBaseline,
    /// `<short sha> <subject>` of the baseline commit.
    pub baseline_description: String,
    pub inventory: TemplateInventory,
    pub report: DriftReport,
}

impl AuditResult {
    /// Directory name of the app, for report headings.
    pub fn app_name(&self) -> String {
        self.app_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.app_dir.display().to_string())
    }
}

/// Audit the app at `app_dir` for drift from its template.
///
/// The template repository is `template_override` when given, otherwise the
/// answers' `_src_path` resolved against the app directory.
pub fn audit(app_dir: &Path, template_override: Option<&Path>) -> Result<AuditResult, SyncError> {
    let app_dir = app_dir.canonicalize().map_err(|e| io_err(app_dir, e))?;
    let answers = Answers::load(&app_dir)?;

    let template_root = resolve_template_root(&app_dir, &answers, template_override)?;
    tracing::info!(
        app = %app_dir.display(),
        template = %template_root.display(),
        "auditing app"
    );
    let template = TemplateRepo::load(&template_root)?;
    let inventory = TemplateInventory::build(&template, &answers)?;

    let git = Git::new(&app_dir);
    let baseline = find_baseline(&git)?.ok_or_else(|| SyncError::NoBaseline {
        app: app_dir.clone(),
        file: ANSWERS_FILE,
    })?;
    let baseline_description = git.describe_commit(&baseline.sha)?;

    let report = detect(
        &git,
        &baseline.sha,
        &app_dir,
        &inventory.source_dir,
        &inventory.classification.template_owned,
    )?;

    Ok(AuditResult {
        app_dir,
        template_root,
        answers,
        baseline,
        baseline_description,
        inventory,
        report,
    })
}

fn resolve_template_root(
    app_dir: &Path,
    answers: &Answers,
    template_override: Option<&Path>,
) -> Result<PathBuf, SyncError> {
    if let Some(root) = template_override {
        return Ok(root.canonicalize().unwrap_or_else(|_| root.to_path_buf()));
    }
    let src = answers.src_path().ok_or_else(|| SyncError::NoTemplateSource {
        app: app_dir.to_path_buf(),
    })?;
    if is_remote(&src) {
        return Err(SyncError::RemoteTemplateSource { src });
    }
    let root = app_dir.join(&src);
    Ok(root.canonicalize().unwrap_or(root))
}

/// Whether `_src_path` names a remote repository rather than a directory.
fn is_remote(src: &str) -> bool {
    src.contains("://") || src.starts_with("git@") || src.starts_with("gh:") || src.starts_with("gl:")
}
