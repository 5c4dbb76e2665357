//! Hand long reports to `less -R`.
//!
//! The pager runs on a current-thread runtime that races its exit against
//! Ctrl-C. The child is spawned with `kill_on_drop`, so it never outlives the
//! call, whichever branch wins.

use std::io::ErrorKind;
use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

pub const PAGER: &str = "less";
pub const PAGER_ARGS: &[&str] = &["-R"];

/// Page `text`, blocking until the pager exits or the user interrupts.
pub fn page(text: &str) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start pager runtime")?;
    runtime.block_on(run(text.as_bytes()))
}

async fn run(text: &[u8]) -> Result<()> {
    let mut child = Command::new(PAGER)
        .args(PAGER_ARGS)
        .env("LESSCHARSET", "utf-8")
        .stdin(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("cannot start {PAGER}"))?;
    let mut stdin = child.stdin.take().context("pager stdin unavailable")?;

    let finished = async {
        // The user may quit before reading everything.
        if let Err(err) = stdin.write_all(text).await {
            if err.kind() != ErrorKind::BrokenPipe {
                return Err(err);
            }
        }
        drop(stdin);
        child.wait().await
    };

    tokio::select! {
        status = finished => {
            let status = status.context("pager failed")?;
            tracing::debug!(%status, "pager exited");
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("cannot listen for ctrl-c")?;
            tracing::info!("interrupted; closing pager");
        }
    }
    Ok(())
}
