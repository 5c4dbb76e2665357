//! scion: git fan-out and template drift checks for a Copier workspace.
//!
//! # Usage
//!
//! ```text
//! scion pull | push | review | changes | repos
//! scion violations <APP_DIR> [--template-repo <DIR>] [--diff] [--commits] [--json]
//!
//! global: --workspace <FILE> (env SCION_WORKSPACE)  --color auto|always|never  -v / -vv
//! ```

mod commands;
mod output;
mod pager;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};

use commands::{
    changes::ChangesArgs, pull::PullArgs, push::PushArgs, repos::ReposArgs, review::ReviewArgs,
    violations::ViolationsArgs,
};
use output::ColorMode;
use scion_core::workspace::{list_repos_at, resolve_descriptor};
use scion_core::RepoRef;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "scion",
    version,
    about = "Fan git out across a Copier workspace and find template drift",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run `git pull` in every workspace repository.
    Pull(PullArgs),

    /// Push commits and tags of every repository, only if all are clean.
    Push(PushArgs),

    /// Show unpushed, staged, unstaged and untracked work per repository.
    Review(ReviewArgs),

    /// Show app commits and diff since each repository's last template sync.
    Changes(ChangesArgs),

    /// Report template-owned files an app has modified.
    Violations(ViolationsArgs),

    /// List the workspace repositories.
    Repos(ReposArgs),
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Workspace descriptor; defaults to the first `*.code-workspace` in the current directory.
    #[arg(long, global = true, env = "SCION_WORKSPACE", value_name = "FILE")]
    pub workspace: Option<PathBuf>,

    /// When to use ANSI colors.
    #[arg(long, global = true, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,

    /// Log more to stderr (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalArgs {
    /// Repositories of the resolved workspace descriptor, in fan-out order.
    pub fn repos(&self) -> Result<Vec<RepoRef>> {
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        let descriptor = resolve_descriptor(self.workspace.as_deref(), &cwd)?;
        tracing::info!(descriptor = %descriptor.display(), "using workspace");
        let repos = list_repos_at(&descriptor)?;
        tracing::debug!(count = repos.len(), "enumerated repositories");
        Ok(repos)
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let Cli { global, command } = Cli::parse();
    init_tracing(global.verbose);
    output::init(global.color);

    let result = match command {
        Commands::Pull(args) => args.run(&global),
        Commands::Push(args) => args.run(&global),
        Commands::Review(args) => args.run(&global),
        Commands::Changes(args) => args.run(&global),
        Commands::Violations(args) => args.run(),
        Commands::Repos(args) => args.run(&global),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
