//! `scion repos`: list the workspace repositories.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use scion_core::{Git, RepoRef};
use scion_sync::WorkingTree;

use crate::output::emit;
use crate::GlobalArgs;

/// Arguments for `scion repos`.
#[derive(Args, Debug)]
pub struct ReposArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct RepoRow {
    #[tabled(rename = "repo")]
    name: String,
    #[tabled(rename = "path")]
    path: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "status")]
    status: String,
}

impl ReposArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<ExitCode> {
        let repos = global.repos()?;
        let rows = repos.iter().map(row).collect::<Result<Vec<_>>>()?;

        if self.json {
            let json = serde_json::to_string_pretty(&rows).context("failed to serialize repos")?;
            emit(&format!("{json}\n"))?;
            return Ok(ExitCode::SUCCESS);
        }

        if rows.is_empty() {
            emit("No repositories found in workspace.\n")?;
            return Ok(ExitCode::SUCCESS);
        }
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        emit(&format!("{table}\n"))?;
        Ok(ExitCode::SUCCESS)
    }
}

fn row(repo: &RepoRef) -> Result<RepoRow> {
    let git = Git::new(&repo.path);
    let branch = git
        .current_branch()
        .with_context(|| format!("cannot read branch of '{}'", repo.name))?
        .unwrap_or_else(|| "-".to_string());
    let status = match WorkingTree::read(&git) {
        WorkingTree::Clean => "clean".to_string(),
        WorkingTree::Dirty { changes } => format!("dirty ({})", changes.len()),
        WorkingTree::Unknown { .. } => "unknown".to_string(),
    };
    Ok(RepoRow {
        name: repo.name.to_string(),
        path: repo.path.display().to_string(),
        branch,
        status,
    })
}
