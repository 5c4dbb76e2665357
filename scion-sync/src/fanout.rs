//! Fan git commands out across every workspace repository.
//!
//! Repositories are processed one at a time in enumeration order. `push` is
//! two-phase: nothing is pushed unless every repository is clean.

use scion_core::{Git, GitError, GitOutput, RepoRef};

use crate::error::SyncError;

/// Output `git push --tags` prints when there is nothing to push.
pub const TAGS_UP_TO_DATE: &str = "Everything up-to-date";

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

/// Result of `git pull` plus the working tree state afterwards.
#[derive(Debug, Clone)]
pub struct PullOutcome {
    pub repo: RepoRef,
    pub output: GitOutput,
    pub status: WorkingTree,
}

/// Working tree state read with `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingTree {
    Clean,
    Dirty { changes: Vec<String> },
    Unknown { reason: String },
}

impl WorkingTree {
    pub fn read(git: &Git) -> Self {
        match git.status_porcelain() {
            Ok(changes) if changes.is_empty() => WorkingTree::Clean,
            Ok(changes) => WorkingTree::Dirty { changes },
            Err(err) => WorkingTree::Unknown {
                reason: failure_reason(&err),
            },
        }
    }

    pub fn is_clean(&self) -> bool {
        matches!(self, WorkingTree::Clean)
    }
}

/// `git pull` every repository, calling `report` after each one.
///
/// A repository where git cannot run is reported as a failed pull.
pub fn pull_all(repos: &[RepoRef], mut report: impl FnMut(&PullOutcome)) {
    for repo in repos {
        let git = Git::new(&repo.path);
        let outcome = PullOutcome {
            repo: repo.clone(),
            output: output_or_failure(git.pull()),
            status: WorkingTree::read(&git),
        };
        report(&outcome);
    }
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// A repository that prevents the push from starting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedRepo {
    pub repo: RepoRef,
    /// `Dirty` or `Unknown`; never `Clean`.
    pub state: WorkingTree,
}

/// Phase one: every repository that is not known to be clean.
pub fn preflight(repos: &[RepoRef]) -> Vec<BlockedRepo> {
    repos
        .iter()
        .filter_map(|repo| {
            let state = WorkingTree::read(&Git::new(&repo.path));
            (!state.is_clean()).then(|| BlockedRepo {
                repo: repo.clone(),
                state,
            })
        })
        .collect()
}

/// Result of pushing commits and tags of one repository.
#[derive(Debug, Clone)]
pub struct PushOutcome {
    pub repo: RepoRef,
    pub commits: GitOutput,
    pub tags: GitOutput,
}

impl PushOutcome {
    pub fn success(&self) -> bool {
        self.commits.success && self.tags.success
    }

    /// Tag push output worth showing; `None` when there was nothing to push.
    pub fn tags_message(&self) -> Option<&str> {
        let message = self.tags.message();
        (!message.is_empty() && message != TAGS_UP_TO_DATE).then_some(message)
    }
}

/// Outcome of a two-phase push.
#[derive(Debug, Clone)]
pub enum PushRun {
    /// Phase one failed; nothing was pushed.
    Blocked(Vec<BlockedRepo>),
    Pushed(Vec<PushOutcome>),
}

/// Push every repository if and only if all of them are clean.
///
/// `report` is called after each repository is pushed. A failed push is
/// reported and the remaining repositories are still pushed.
pub fn push_all(repos: &[RepoRef], mut report: impl FnMut(&PushOutcome)) -> PushRun {
    let blocked = preflight(repos);
    if !blocked.is_empty() {
        tracing::info!(blocked = blocked.len(), "push aborted by pre-flight");
        return PushRun::Blocked(blocked);
    }

    let mut outcomes = Vec::with_capacity(repos.len());
    for repo in repos {
        let git = Git::new(&repo.path);
        let outcome = PushOutcome {
            repo: repo.clone(),
            commits: output_or_failure(git.push()),
            tags: output_or_failure(git.push_tags()),
        };
        report(&outcome);
        outcomes.push(outcome);
    }
    PushRun::Pushed(outcomes)
}

fn output_or_failure(result: Result<GitOutput, GitError>) -> GitOutput {
    result.unwrap_or_else(|err| GitOutput {
        success: false,
        stdout: String::new(),
        stderr: err.to_string(),
    })
}

fn failure_reason(err: &GitError) -> String {
    match err {
        GitError::Failed { stderr, .. } if !stderr.is_empty() => stderr.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// One kind of pending local work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewSection {
    Unpushed { commits: Vec<String>, diff: String },
    Staged { diff: String },
    Unstaged { diff: String },
    Untracked { files: Vec<String> },
    /// git could not be queried for this repository.
    Failed { reason: String },
}

impl ReviewSection {
    pub fn title(&self) -> &'static str {
        match self {
            ReviewSection::Unpushed { .. } => "Unpushed commits",
            ReviewSection::Staged { .. } => "Staged changes",
            ReviewSection::Unstaged { .. } => "Unstaged changes",
            ReviewSection::Untracked { .. } => "Untracked files",
            ReviewSection::Failed { .. } => "Review failed",
        }
    }
}

/// Pending work of one repository; repositories with none are omitted.
#[derive(Debug, Clone)]
pub struct RepoReview {
    pub repo: RepoRef,
    pub sections: Vec<ReviewSection>,
}

/// Collect unpushed commits, staged, unstaged and untracked work of `repo`.
pub fn review_repo(repo: &RepoRef, color: bool) -> Result<Vec<ReviewSection>, SyncError> {
    let git = Git::new(&repo.path);
    let mut sections = Vec::new();

    if let Some(commits) = git.unpushed_commits()? {
        if !commits.is_empty() {
            let diff = git.diff_unpushed(color)?;
            sections.push(ReviewSection::Unpushed { commits, diff });
        }
    }

    let staged = git.diff_staged(color)?;
    if !staged.trim().is_empty() {
        sections.push(ReviewSection::Staged { diff: staged });
    }

    let unstaged = git.diff_unstaged(color)?;
    if !unstaged.trim().is_empty() {
        sections.push(ReviewSection::Unstaged { diff: unstaged });
    }

    let files = git.untracked_files()?;
    if !files.is_empty() {
        sections.push(ReviewSection::Untracked { files });
    }

    Ok(sections)
}

/// Review every repository, keeping only those with pending work.
///
/// A repository that cannot be reviewed is kept with a single
/// [`ReviewSection::Failed`] section.
pub fn review_all(repos: &[RepoRef], color: bool) -> Vec<RepoReview> {
    let mut reviews = Vec::new();
    for repo in repos {
        let sections = match review_repo(repo, color) {
            Ok(sections) => sections,
            Err(err) => {
                tracing::warn!(repo = %repo.name, "review failed: {err}");
                vec![ReviewSection::Failed {
                    reason: err.to_string(),
                }]
            }
        };
        if !sections.is_empty() {
            reviews.push(RepoReview {
                repo: repo.clone(),
                sections,
            });
        }
    }
    reviews
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stderr: &str) -> GitOutput {
        GitOutput {
            success: true,
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    fn outcome(tags: &str) -> PushOutcome {
        PushOutcome {
            repo: RepoRef::new("app", "/tmp/app"),
            commits: output("To origin\n   abc..def  main -> main\n"),
            tags: output(tags),
        }
    }

    #[test]
    fn up_to_date_tags_are_hidden() {
        assert_eq!(outcome("Everything up-to-date\n").tags_message(), None);
        assert_eq!(outcome("").tags_message(), None);
    }

    #[test]
    fn new_tags_are_shown() {
        let pushed = outcome(" * [new tag]  v1.2.0 -> v1.2.0\n");
        assert_eq!(pushed.tags_message(), Some("* [new tag]  v1.2.0 -> v1.2.0"));
    }

    #[test]
    fn spawn_failures_become_failed_output() {
        let out = output_or_failure(Git::new("/definitely/not/here").push());
        assert!(!out.success);
        assert!(!out.message().is_empty());
    }

    #[test]
    fn section_titles() {
        let section = ReviewSection::Untracked {
            files: vec!["a".into(), "b".into()],
        };
        assert_eq!(section.title(), "Untracked files");
    }
}
