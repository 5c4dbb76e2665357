//! Thin synchronous wrapper around the `git` executable.
//!
//! Every call blocks until git exits. Queries that exit non-zero are logged
//! and read as "no data"; the only strict query is
//! [`Git::status_porcelain`], which the push pre-flight depends on.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process::Command;

use chrono::DateTime;

use crate::error::GitError;
use crate::types::{CommitSha, SyncBaseline};

/// Upstream range used for "commits not yet pushed".
pub const UPSTREAM_RANGE: &str = "@{upstream}..HEAD";

/// Captured result of one git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl GitOutput {
    /// Trimmed stderr when non-empty, otherwise trimmed stdout.
    ///
    /// `git push` reports progress on stderr, so this is the useful text for
    /// most mutating commands.
    pub fn message(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim()
        } else {
            stderr
        }
    }
}

/// Runs git commands inside one working tree.
#[derive(Debug, Clone)]
pub struct Git {
    dir: PathBuf,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Run `git <args>` and capture its output. Fails only when git cannot be
    /// started.
    pub fn run<I, S>(&self, args: I) -> Result<GitOutput, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let rendered = render_args(&args);
        tracing::debug!(dir = %self.dir.display(), "git {rendered}");

        let output = Command::new("git")
            .args(&args)
            .current_dir(&self.dir)
            .output()
            .map_err(|source| GitError::Spawn {
                args: rendered.clone(),
                dir: self.dir.clone(),
                source,
            })?;

        Ok(GitOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Stdout of a read-only query, or an empty string when git exits non-zero.
    fn query(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.run(args)?;
        if output.success {
            return Ok(output.stdout);
        }
        tracing::warn!(
            dir = %self.dir.display(),
            stderr = %output.stderr.trim(),
            "git {} failed; treating as empty",
            args.join(" ")
        );
        Ok(String::new())
    }

    // -----------------------------------------------------------------------
    // Working tree state
    // -----------------------------------------------------------------------

    /// Lines of `git status --porcelain`. Empty means clean.
    ///
    /// A failing status query is an error rather than "clean".
    pub fn status_porcelain(&self) -> Result<Vec<String>, GitError> {
        let args = ["status", "--porcelain"];
        let output = self.run(args)?;
        if !output.success {
            return Err(GitError::Failed {
                args: args.join(" "),
                dir: self.dir.clone(),
                stderr: output.stderr.trim().to_string(),
            });
        }
        Ok(non_empty_lines(&output.stdout))
    }

    /// Current branch name, or `HEAD` when detached.
    pub fn current_branch(&self) -> Result<Option<String>, GitError> {
        let out = self.query(&["rev-parse", "--abbrev-ref", "HEAD"])?;
        let branch = out.trim();
        Ok((!branch.is_empty()).then(|| branch.to_string()))
    }

    /// Untracked, non-ignored files.
    pub fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        let out = self.query(&["ls-files", "--others", "--exclude-standard"])?;
        Ok(non_empty_lines(&out))
    }

    /// Staged changes as a patch.
    pub fn diff_staged(&self, color: bool) -> Result<String, GitError> {
        self.query(&["diff", color_flag(color), "--cached"])
    }

    /// Unstaged changes as a patch.
    pub fn diff_unstaged(&self, color: bool) -> Result<String, GitError> {
        self.query(&["diff", color_flag(color)])
    }

    // -----------------------------------------------------------------------
    // Remote
    // -----------------------------------------------------------------------

    pub fn pull(&self) -> Result<GitOutput, GitError> {
        self.run(["pull"])
    }

    pub fn push(&self) -> Result<GitOutput, GitError> {
        self.run(["push"])
    }

    pub fn push_tags(&self) -> Result<GitOutput, GitError> {
        self.run(["push", "--tags"])
    }

    /// One-line commits ahead of upstream. `None` when the branch has no
    /// upstream or the query fails.
    pub fn unpushed_commits(&self) -> Result<Option<Vec<String>>, GitError> {
        let output = self.run(["log", "--oneline", UPSTREAM_RANGE])?;
        if !output.success {
            return Ok(None);
        }
        Ok(Some(non_empty_lines(&output.stdout)))
    }

    /// Patch of the commits ahead of upstream.
    pub fn diff_unpushed(&self, color: bool) -> Result<String, GitError> {
        self.query(&["diff", color_flag(color), UPSTREAM_RANGE])
    }

    // -----------------------------------------------------------------------
    // History
    // -----------------------------------------------------------------------

    /// Most recent commit that touched `path`, with its author date.
    pub fn last_commit_touching(&self, path: &str) -> Result<Option<SyncBaseline>, GitError> {
        let out = self.query(&["log", "-1", "--format=%H %ai", "--", path])?;
        Ok(parse_commit_line(out.trim()))
    }

    /// `<short sha> <subject>` of a commit.
    pub fn describe_commit(&self, sha: &CommitSha) -> Result<String, GitError> {
        let out = self.query(&["log", "-1", "--format=%h %s", sha.as_str()])?;
        Ok(out.trim().to_string())
    }

    /// One-line commits in `<since>..HEAD` limited to `pathspecs`.
    pub fn log_since(&self, since: &CommitSha, pathspecs: &[&str]) -> Result<Vec<String>, GitError> {
        let range = format!("{since}..HEAD");
        let mut args = vec!["log", "--oneline", range.as_str(), "--"];
        args.extend_from_slice(pathspecs);
        Ok(non_empty_lines(&self.query(&args)?))
    }

    /// Patch between `since` and `HEAD` limited to `pathspecs`.
    pub fn diff_since(
        &self,
        since: &CommitSha,
        pathspecs: &[&str],
        color: bool,
    ) -> Result<String, GitError> {
        let mut args = vec!["diff", color_flag(color), since.as_str(), "HEAD", "--"];
        args.extend_from_slice(pathspecs);
        self.query(&args)
    }

    /// Whether anything under `pathspecs` differs between `since` and `HEAD`.
    pub fn changed_since(&self, since: &CommitSha, pathspecs: &[&str]) -> Result<bool, GitError> {
        let mut args = vec!["diff", "--name-only", since.as_str(), "HEAD", "--"];
        args.extend_from_slice(pathspecs);
        Ok(!self.query(&args)?.trim().is_empty())
    }
}

fn color_flag(color: bool) -> &'static str {
    if color {
        "--color=always"
    } else {
        "--color=never"
    }
}

fn render_args<S: AsRef<OsStr>>(args: &[S]) -> String {
    args.iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `<sha> <author date>` as printed by `--format=%H %ai`.
fn parse_commit_line(line: &str) -> Option<SyncBaseline> {
    if line.is_empty() {
        return None;
    }
    let (sha, date) = match line.split_once(' ') {
        Some((sha, date)) => (sha, Some(date.trim())),
        None => (line, None),
    };
    let date = date.and_then(|d| DateTime::parse_from_str(d, "%Y-%m-%d %H:%M:%S %z").ok());
    Some(SyncBaseline {
        sha: CommitSha::from(sha),
        date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_line_with_date() {
        let baseline =
            parse_commit_line("9fceb02d0ae598e95dc970b74767f19372d61af8 2024-01-31 09:15:00 -0500")
                .expect("baseline");
        assert_eq!(baseline.sha.short(7), "9fceb02");
        assert_eq!(baseline.date_label(), "2024-01-31");
    }

    #[test]
    fn commit_line_without_date() {
        let baseline = parse_commit_line("9fceb02").expect("baseline");
        assert_eq!(baseline.sha.as_str(), "9fceb02");
        assert!(baseline.date.is_none());
    }

    #[test]
    fn empty_commit_line_is_none() {
        assert!(parse_commit_line("").is_none());
    }

    #[test]
    fn message_prefers_stderr() {
        let out = GitOutput {
            success: true,
            stdout: "out\n".into(),
            stderr: "  err \n".into(),
        };
        assert_eq!(out.message(), "err");

        let quiet = GitOutput {
            success: true,
            stdout: "Already up to date.\n".into(),
            stderr: String::new(),
        };
        assert_eq!(quiet.message(), "Already up to date.");
    }

    #[test]
    fn spawn_failure_in_missing_directory_is_an_error() {
        let git = Git::new("/definitely/not/a/real/dir/for/scion");
        let err = git.run(["status"]).unwrap_err();
        assert!(matches!(err, GitError::Spawn { .. }));
    }
}
