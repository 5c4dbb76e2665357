//! `scion pull`: pull every workspace repository.

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use scion_sync::fanout::PullOutcome;
use scion_sync::{pull_all, WorkingTree};

use crate::output::{banner, block, emit};
use crate::GlobalArgs;

/// Arguments for `scion pull`.
#[derive(Args, Debug)]
pub struct PullArgs {}

impl PullArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let repos = global.repos()?;
        let mut write_error = None;
        pull_all(&repos, |outcome| {
            if write_error.is_none() {
                write_error = emit(&render(outcome)).err();
            }
        });
        if let Some(err) = write_error {
            return Err(err);
        }
        emit("\n")?;
        Ok(ExitCode::SUCCESS)
    }
}

fn render(outcome: &PullOutcome) -> String {
    let repo = &outcome.repo;
    let mut out = banner(&[format!("{}  ({})", repo.name, repo.path.display())]);
    out.push_str(&block(&outcome.output.stdout));
    out.push_str(&block(&outcome.output.stderr));
    out.push_str(&status_line(&outcome.status));
    out
}

fn status_line(state: &WorkingTree) -> String {
    match state {
        WorkingTree::Clean => format!("Status: {}\n", "clean".green()),
        WorkingTree::Dirty { changes } => {
            let mut out = format!("Status: {}\n", "DIRTY".red().bold());
            for line in changes {
                out.push_str(&format!("  {line}\n"));
            }
            out
        }
        WorkingTree::Unknown { reason } => {
            format!("Status: {} ({reason})\n", "unknown".yellow().bold())
        }
    }
}
