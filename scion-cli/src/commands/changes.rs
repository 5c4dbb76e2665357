//! `scion changes`: app work since each repository's last template sync.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use scion_core::ANSWERS_FILE;
use scion_sync::{changes_for_all, ChangesSinceSync, RepoChanges};

use crate::output::{banner, block, emit_paged, prefs};
use crate::GlobalArgs;

/// Arguments for `scion changes`.
#[derive(Args, Debug)]
pub struct ChangesArgs {}

impl ChangesArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let repos = global.repos()?;
        let reports = changes_for_all(&repos, prefs().color);
        emit_paged(&render(&reports)?)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn render(reports: &[RepoChanges]) -> Result<String> {
    let mut out = String::new();
    for report in reports {
        match report {
            RepoChanges::NoHistory { repo } => {
                out.push_str(&banner(&[format!("{}  ({})", repo.name, repo.path.display())]));
                writeln!(out, "  ERROR: No git history for {ANSWERS_FILE}")?;
            }
            RepoChanges::Failed { repo, reason } => {
                out.push_str(&banner(&[format!("{}  ({})", repo.name, repo.path.display())]));
                writeln!(out, "  ERROR: {reason}")?;
            }
            RepoChanges::Changes(changes) => render_changes(&mut out, changes)?,
        }
    }
    if reports.is_empty() {
        writeln!(out, "No copier-managed repos found.")?;
    }
    out.push('\n');
    Ok(out)
}

fn render_changes(out: &mut String, changes: &ChangesSinceSync) -> Result<()> {
    let repo = &changes.repo;
    out.push_str(&banner(&[
        format!("{}  (template {})", repo.name, changes.template_version),
        repo.path.display().to_string(),
    ]));

    let count = changes.commits.len();
    let noun = if count == 1 { "commit" } else { "commits" };
    writeln!(
        out,
        "\n  Last sync: {}  {}  -  {count} app {noun} since then",
        changes.short_sha(),
        changes.baseline.date_label()
    )?;

    if !changes.commits.is_empty() {
        writeln!(out, "\n--- Commits since last sync ---")?;
        out.push_str(&block(&changes.commits.join("\n")));
    }
    if !changes.diff.trim().is_empty() {
        writeln!(out, "\n--- Diff since last sync ---")?;
        out.push_str(&block(&changes.diff));
    }
    if changes.commits.is_empty() && changes.diff.trim().is_empty() {
        writeln!(out, "\n  (no app changes since last sync)")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use scion_core::{CommitSha, RepoRef, SyncBaseline};

    use super::*;

    fn changes(commits: Vec<String>) -> ChangesSinceSync {
        ChangesSinceSync {
            repo: RepoRef::new("billing", "/srv/billing"),
            template_version: "v2.1.0".into(),
            baseline: SyncBaseline {
                sha: CommitSha::from("0123456789abcdef0123456789abcdef01234567"),
                date: None,
            },
            commits,
            diff: String::new(),
        }
    }

    #[test]
    fn header_shows_version_sha_and_count() {
        let out = render(&[RepoChanges::Changes(changes(vec!["abc add main".into()]))])
            .expect("render");
        assert!(out.contains("  billing  (template v2.1.0)"));
        assert!(out.contains("Last sync: 0123456789ab"));
        assert!(out.contains("1 app commit since then"));
        assert!(out.contains("--- Commits since last sync ---"));
    }

    #[test]
    fn quiet_repo_says_no_changes() {
        let out = render(&[RepoChanges::Changes(changes(vec![]))]).expect("render");
        assert!(out.contains("0 app commits since then"));
        assert!(out.contains("(no app changes since last sync)"));
    }

    #[test]
    fn missing_history_is_inline() {
        let repo = RepoRef::new("fresh", "/srv/fresh");
        let out = render(&[RepoChanges::NoHistory { repo }]).expect("render");
        assert!(out.contains("ERROR: No git history for .copier-answers.yml"));
    }

    #[test]
    fn git_failure_is_inline() {
        let reports = [
            RepoChanges::Failed {
                repo: RepoRef::new("broken", "/srv/broken"),
                reason: "failed to run `git log` in /srv/broken".into(),
            },
            RepoChanges::Changes(changes(vec![])),
        ];
        let out = render(&reports).expect("render");
        let failed = out.find("ERROR: failed to run `git log`").expect("failure line");
        let billing = out.find("billing  (template v2.1.0)").expect("next repo");
        assert!(failed < billing);
    }

    #[test]
    fn nothing_managed() {
        let out = render(&[]).expect("render");
        assert!(out.contains("No copier-managed repos found."));
    }
}
