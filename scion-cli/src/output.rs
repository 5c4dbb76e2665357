//! Terminal preferences and report rendering helpers.
//!
//! Interactivity and color are decided once, in [`init`], and read through
//! [`prefs`] for the rest of the run.

use std::io::{ErrorKind, IsTerminal, Write};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::ValueEnum;
use colored::Colorize;

use crate::pager;

/// Width of the `=` banner framing each repository.
pub const BANNER_WIDTH: usize = 76;

/// Width of section rules in the drift report.
pub const RULE_WIDTH: usize = 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

#[derive(Clone, Copy, Debug)]
pub struct OutputPrefs {
    pub color: bool,
    pub interactive: bool,
}

static PREFS: OnceLock<OutputPrefs> = OnceLock::new();

pub fn init(mode: ColorMode) {
    let interactive = std::io::stdout().is_terminal();
    let color = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => interactive && std::env::var_os("NO_COLOR").is_none(),
    };
    colored::control::set_override(color);
    let _ = PREFS.set(OutputPrefs { color, interactive });
}

pub fn prefs() -> OutputPrefs {
    *PREFS.get().unwrap_or(&OutputPrefs {
        color: false,
        interactive: false,
    })
}

// ---------------------------------------------------------------------------
// Emitting
// ---------------------------------------------------------------------------

/// Write `text` to stdout. A closed pipe ends output quietly.
pub fn emit(text: &str) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    match stdout.write_all(text.as_bytes()).and_then(|()| stdout.flush()) {
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        other => other.context("cannot write to stdout"),
    }
}

/// Show `text` through the pager when stdout is a terminal, else print it.
pub fn emit_paged(text: &str) -> Result<()> {
    if prefs().interactive {
        match pager::page(text) {
            Ok(()) => return Ok(()),
            Err(err) => tracing::warn!("pager unavailable, printing instead: {err:#}"),
        }
    }
    emit(text)
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

/// Repository banner: a blank line, then the heading lines framed by `=`.
pub fn banner(lines: &[String]) -> String {
    let frame = "=".repeat(BANNER_WIDTH);
    let mut out = format!("\n{frame}\n");
    for line in lines {
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&frame);
    out.push('\n');
    out
}

/// Dimmed horizontal rule.
pub fn rule() -> String {
    "-".repeat(RULE_WIDTH).dimmed().to_string()
}

/// Indent and color a plain unified diff line by line.
pub fn render_diff(diff: &str, indent: &str) -> String {
    let mut out = String::new();
    for line in diff.lines() {
        let styled = if line.starts_with("+++") || line.starts_with("---") {
            line.to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with("@@") {
            line.cyan().to_string()
        } else {
            line.to_string()
        };
        out.push_str(indent);
        out.push_str(&styled);
        out.push('\n');
    }
    out
}

/// `text` with exactly one trailing newline, or nothing when blank.
pub fn block(text: &str) -> String {
    let trimmed = text.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_frames_lines() {
        colored::control::set_override(false);
        let out = banner(&["app  (/srv/app)".to_string()]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1].len(), BANNER_WIDTH);
        assert_eq!(lines[2], "  app  (/srv/app)");
        assert_eq!(lines[3], lines[1]);
    }

    #[test]
    fn diff_lines_are_indented() {
        colored::control::set_override(false);
        let out = render_diff("--- a\n+++ b\n@@ -1 +1 @@\n-x\n+y\n", "    ");
        assert!(out.lines().all(|l| l.starts_with("    ")));
        assert_eq!(out.lines().count(), 5);
    }

    #[test]
    fn block_normalizes_trailing_newlines() {
        assert_eq!(block("a\nb\n\n\n"), "a\nb\n");
        assert_eq!(block("  \n"), "");
    }
}
