//! `scion review`: pending local work across the workspace.

use std::fmt::Write as _;
use std::process::ExitCode;

use anyhow::Result;
use clap::Args;

use scion_sync::fanout::{RepoReview, ReviewSection};
use scion_sync::review_all;

use crate::output::{banner, block, emit_paged, prefs};
use crate::GlobalArgs;

/// Arguments for `scion review`.
#[derive(Args, Debug)]
pub struct ReviewArgs {}

impl ReviewArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let repos = global.repos()?;
        let reviews = review_all(&repos, prefs().color);
        emit_paged(&render(&reviews)?)?;
        Ok(ExitCode::SUCCESS)
    }
}

fn render(reviews: &[RepoReview]) -> Result<String> {
    let mut out = String::new();
    for review in reviews {
        let repo = &review.repo;
        out.push_str(&banner(&[format!("{}  ({})", repo.name, repo.path.display())]));
        for section in &review.sections {
            writeln!(out, "\n--- {} ---", section.title())?;
            match section {
                ReviewSection::Unpushed { commits, diff } => {
                    out.push_str(&block(&commits.join("\n")));
                    out.push_str(&block(diff));
                }
                ReviewSection::Staged { diff } | ReviewSection::Unstaged { diff } => {
                    out.push_str(&block(diff));
                }
                ReviewSection::Untracked { files } => {
                    out.push_str(&block(&files.join("\n")));
                }
                ReviewSection::Failed { reason } => {
                    writeln!(out, "  ERROR: {reason}")?;
                }
            }
        }
    }
    if reviews.is_empty() {
        writeln!(out, "No pending changes in any repo.")?;
    }
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use scion_core::RepoRef;

    use super::*;

    #[test]
    fn empty_review_says_so() {
        let out = render(&[]).expect("render");
        assert!(out.contains("No pending changes in any repo."));
    }

    #[test]
    fn sections_render_in_order() {
        colored::control::set_override(false);
        let review = RepoReview {
            repo: RepoRef::new("api", "/srv/api"),
            sections: vec![
                ReviewSection::Unpushed {
                    commits: vec!["abc1234 fix login".into()],
                    diff: "diff --git a/x b/x\n".into(),
                },
                ReviewSection::Untracked {
                    files: vec!["notes.txt".into()],
                },
            ],
        };
        let out = render(&[review]).expect("render");
        let unpushed = out.find("--- Unpushed commits ---").expect("unpushed");
        let untracked = out.find("--- Untracked files ---").expect("untracked");
        assert!(unpushed < untracked);
        assert!(out.contains("  api  (/srv/api)"));
        assert!(out.contains("abc1234 fix login\n"));
    }

    #[test]
    fn failed_review_is_inline() {
        let review = RepoReview {
            repo: RepoRef::new("gone", "/srv/gone"),
            sections: vec![ReviewSection::Failed {
                reason: "failed to run `git status` in /srv/gone".into(),
            }],
        };
        let out = render(&[review]).expect("render");
        assert!(out.contains("--- Review failed ---"));
        assert!(out.contains("  ERROR: failed to run `git status` in /srv/gone"));
    }
}
