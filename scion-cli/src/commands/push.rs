//! `scion push`: push commits and tags of every repository, all or nothing.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use scion_sync::fanout::{BlockedRepo, PushOutcome};
use scion_sync::{push_all, PushRun, WorkingTree};

use crate::output::{banner, block, emit};
use crate::GlobalArgs;

/// Arguments for `scion push`.
#[derive(Args, Debug)]
pub struct PushArgs {}

impl PushArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let repos = global.repos()?;
        let mut write_error = None;
        let run = push_all(&repos, |outcome| {
            if write_error.is_none() {
                write_error = emit(&render_outcome(outcome)).err();
            }
        });
        if let Some(err) = write_error {
            return Err(err);
        }

        match run {
            PushRun::Blocked(blocked) => {
                emit(&render_blocked(&blocked))?;
                Ok(ExitCode::FAILURE)
            }
            PushRun::Pushed(outcomes) => {
                emit("\n")?;
                let failed = outcomes.iter().filter(|o| !o.success()).count();
                if failed > 0 {
                    tracing::warn!(failed, "some pushes failed");
                    return Ok(ExitCode::FAILURE);
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn render_blocked(blocked: &[BlockedRepo]) -> String {
    let mut out = format!(
        "{}\n\n",
        "Aborting: the following repos have uncommitted changes:"
            .red()
            .bold()
    );
    for entry in blocked {
        out.push_str(&format!("  {}  ({})\n", entry.repo.name, entry.repo.path.display()));
        match &entry.state {
            WorkingTree::Dirty { changes } => {
                for line in changes {
                    out.push_str(&format!("    {line}\n"));
                }
            }
            WorkingTree::Unknown { reason } => {
                out.push_str(&format!("    git status failed: {reason}\n"));
            }
            WorkingTree::Clean => {}
        }
        out.push('\n');
    }
    out
}

fn render_outcome(outcome: &PushOutcome) -> String {
    let repo = &outcome.repo;
    let mut out = banner(&[format!("{}  ({})", repo.name, repo.path.display())]);
    let message = block(outcome.commits.message());
    if outcome.commits.success {
        out.push_str(&message);
    } else {
        out.push_str(&message.red().to_string());
    }
    if let Some(tags) = outcome.tags_message() {
        out.push_str(&block(tags));
    }
    out
}
