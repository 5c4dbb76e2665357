//! Changes made in a repository since its last template sync.
//!
//! The sync baseline is the most recent commit touching the answers file.
//! Everything the app committed after it, outside `docs/`, is app work done on
//! top of the template.

use scion_core::{Answers, Git, RepoRef, SyncBaseline, ANSWERS_FILE};

use crate::error::SyncError;

/// Pathspecs limiting the report to app code.
pub const APP_PATHSPECS: &[&str] = &[".", ":(exclude)docs/"];

/// Version label used when the answers record no `_commit`.
pub const UNKNOWN_VERSION: &str = "unknown";

/// Length of the baseline SHA shown in report headers.
pub const SHORT_SHA_LEN: usize = 12;

/// Most recent commit touching the answers file in `git`'s working tree.
pub fn find_baseline(git: &Git) -> Result<Option<SyncBaseline>, SyncError> {
    Ok(git.last_commit_touching(ANSWERS_FILE)?)
}

/// App work since the sync baseline of one repository.
#[derive(Debug, Clone)]
pub struct ChangesSinceSync {
    pub repo: RepoRef,
    pub template_version: String,
    pub baseline: SyncBaseline,
    /// One-line commits, newest first.
    pub commits: Vec<String>,
    pub diff: String,
}

impl ChangesSinceSync {
    pub fn short_sha(&self) -> &str {
        self.baseline.sha.short(SHORT_SHA_LEN)
    }
}

/// Outcome for one Copier-managed repository.
#[derive(Debug, Clone)]
pub enum RepoChanges {
    Changes(ChangesSinceSync),
    /// The answers file exists but was never committed.
    NoHistory { repo: RepoRef },
    /// git could not be queried for this repository.
    Failed { repo: RepoRef, reason: String },
}

/// Report app changes since sync for `repo`.
///
/// Returns `None` when the repository has no answers file.
pub fn changes_since_sync(repo: &RepoRef, color: bool) -> Result<Option<RepoChanges>, SyncError> {
    if !Answers::exists_in(&repo.path) {
        tracing::debug!(repo = %repo.name, "not copier-managed; skipping");
        return Ok(None);
    }

    let git = Git::new(&repo.path);
    let Some(baseline) = find_baseline(&git)? else {
        return Ok(Some(RepoChanges::NoHistory { repo: repo.clone() }));
    };

    let template_version = read_template_version(repo);
    let commits = git.log_since(&baseline.sha, APP_PATHSPECS)?;
    let diff = git.diff_since(&baseline.sha, APP_PATHSPECS, color)?;

    Ok(Some(RepoChanges::Changes(ChangesSinceSync {
        repo: repo.clone(),
        template_version,
        baseline,
        commits,
        diff,
    })))
}

/// Report every Copier-managed repository in `repos`, in order.
///
/// Per-repository failures are reported inline and do not stop the run.
pub fn changes_for_all(repos: &[RepoRef], color: bool) -> Vec<RepoChanges> {
    repos
        .iter()
        .filter_map(|repo| inline_failure(repo, changes_since_sync(repo, color)))
        .collect()
}

fn inline_failure(
    repo: &RepoRef,
    result: Result<Option<RepoChanges>, SyncError>,
) -> Option<RepoChanges> {
    match result {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!(repo = %repo.name, "cannot report changes: {err}");
            Some(RepoChanges::Failed {
                repo: repo.clone(),
                reason: err.to_string(),
            })
        }
    }
}

fn read_template_version(repo: &RepoRef) -> String {
    match Answers::load(&repo.path) {
        Ok(answers) => answers
            .template_version()
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
        Err(err) => {
            tracing::warn!(repo = %repo.name, "cannot read template version: {err}");
            UNKNOWN_VERSION.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use scion_core::GitError;

    use super::*;

    #[test]
    fn git_spawn_failure_is_reported_inline() {
        let repo = RepoRef::new("api", "/srv/api");
        let err = SyncError::Git(GitError::Spawn {
            args: "log".into(),
            dir: PathBuf::from("/srv/api"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "git not found"),
        });
        match inline_failure(&repo, Err(err)) {
            Some(RepoChanges::Failed { repo, reason }) => {
                assert_eq!(repo.name.0, "api");
                assert!(reason.contains("git not found"));
            }
            other => panic!("expected inline failure, got {other:?}"),
        }
    }

    #[test]
    fn unmanaged_repo_stays_skipped() {
        let repo = RepoRef::new("api", "/srv/api");
        assert!(inline_failure(&repo, Ok(None)).is_none());
    }
}
