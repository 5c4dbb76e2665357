//! `scion violations <APP_DIR>`: template-owned files an app has modified.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use scion_sync::drift::{PostAdoptionChange, SourceDivergence, UnverifiableFile};
use scion_sync::{audit, AuditResult, DriftSummary};
use scion_template::UnsupportedRule;

use crate::output::{emit, render_diff, rule};

/// Arguments for `scion violations`.
#[derive(Args, Debug)]
pub struct ViolationsArgs {
    /// Path to the generated app.
    pub app_dir: PathBuf,

    /// Template repository; defaults to `_src_path` from the app's answers.
    #[arg(long, value_name = "DIR")]
    pub template_repo: Option<PathBuf>,

    /// Show full diffs for modified files.
    #[arg(long)]
    pub diff: bool,

    /// Show the commits touching each modified file.
    #[arg(long)]
    pub commits: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl ViolationsArgs {
    pub fn run(self) -> Result<ExitCode> {
        let result = audit(&self.app_dir, self.template_repo.as_deref())?;

        if self.json {
            let json = serde_json::to_string_pretty(&JsonReport::from(&result))
                .context("failed to serialize violations report")?;
            emit(&format!("{json}\n"))?;
        } else {
            emit(&self.render(&result)?)?;
        }

        Ok(if result.report.has_findings() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    fn render(&self, result: &AuditResult) -> Result<String> {
        let mut out = String::new();
        render_header(&mut out, result)?;
        let report = &result.report;

        // Post-adoption changes
        if report.post_adoption.is_empty() {
            let line = "No post-adoption changes. All template-owned files unchanged since copier update.";
            writeln!(out, "{}\n", line.green())?;
        } else {
            let heading = format!(
                "POST-ADOPTION CHANGES: {} template-owned files modified since copier update",
                report.post_adoption.len()
            );
            writeln!(out, "{}", heading.red().bold())?;
            writeln!(out, "{}\n", rule())?;
            for change in &report.post_adoption {
                self.render_post_adoption(&mut out, change)?;
            }
            if !self.commits && !self.diff {
                writeln!(out)?;
            }
        }

        // Pre-existing divergence
        if !report.pre_existing.is_empty() {
            let heading = format!(
                "PRE-EXISTING DIVERGENCE: {} non-templated files differ from source",
                report.pre_existing.len()
            );
            writeln!(out, "{}", heading.yellow().bold())?;
            let note = "(These differences existed at adoption time or were introduced outside git.)";
            writeln!(out, "{}", note.dimmed())?;
            writeln!(out, "{}\n", rule())?;
            for divergence in &report.pre_existing {
                writeln!(
                    out,
                    "  {}  {}",
                    divergence.path.yellow(),
                    divergence.counts.to_string().dimmed()
                )?;
                if self.diff && !divergence.diff.is_empty() {
                    writeln!(out)?;
                    out.push_str(&render_diff(&divergence.diff, "    "));
                    writeln!(out)?;
                }
            }
            if !self.diff {
                writeln!(out)?;
            }
        }

        // Unverifiable templated files
        if !report.unverifiable.is_empty() {
            let heading = format!(
                "TEMPLATED FILES: {} template files are rendered (cannot compare directly)",
                report.unverifiable.len()
            );
            writeln!(out, "{}", heading.blue().bold())?;
            let note = "(These files are rendered by Copier with variable substitution. \
                        Run `copier update --pretend` to check for drift.)";
            writeln!(out, "{}", note.dimmed())?;
            writeln!(out, "{}", rule())?;
            for file in &report.unverifiable {
                let source = format!("<- {}", file.source_path);
                writeln!(out, "  {}  {}", file.path.dimmed(), source.dimmed())?;
            }
            writeln!(out)?;
        }

        let also = report.also_diverging();
        if also > 0 {
            let note = format!(
                "  ({also} file(s) diverge from source AND were modified post-adoption; reported above.)"
            );
            writeln!(out, "{}\n", note.dimmed())?;
        }

        // Missing files
        if !report.missing.is_empty() {
            let heading = format!(
                "MISSING: {} template-owned files not found in app",
                report.missing.len()
            );
            writeln!(out, "{}", heading.yellow().bold())?;
            writeln!(out, "{}", rule())?;
            for path in &report.missing {
                writeln!(out, "  {}", path.dimmed())?;
            }
            writeln!(out)?;
            let note = "  (May be expected if deleted intentionally or app predates these additions.)";
            writeln!(out, "{}\n", note.dimmed())?;
        }

        render_summary(&mut out, &report.summary())?;
        Ok(out)
    }

    fn render_post_adoption(&self, out: &mut String, change: &PostAdoptionChange) -> Result<()> {
        writeln!(
            out,
            "  {}  {}",
            change.path.yellow(),
            change.counts.to_string().dimmed()
        )?;
        if self.commits {
            for commit in &change.commits {
                writeln!(out, "    {}", commit.cyan())?;
            }
        }
        let has_detail = !change.commits.is_empty() || !change.diff.is_empty();
        if (self.commits || self.diff) && has_detail {
            writeln!(out)?;
        }
        if self.diff && !change.diff.is_empty() {
            out.push_str(&render_diff(&change.diff, "    "));
            writeln!(out)?;
        }
        Ok(())
    }
}

fn render_header(out: &mut String, result: &AuditResult) -> Result<()> {
    writeln!(out)?;
    let title = format!("Template Violation Report: {}", result.app_name());
    writeln!(out, "{}", title.bold())?;
    writeln!(out, "{}\n", "=".repeat(60).dimmed())?;

    writeln!(out, "{}", "Feature flags:".bold())?;
    for (flag, value) in result.answers.feature_flags() {
        let value = if value {
            "True".green()
        } else {
            "False".dimmed()
        };
        writeln!(out, "  {flag}: {value}")?;
    }
    writeln!(out)?;

    let classification = &result.inventory.classification;
    writeln!(out, "{}", "File inventory:".bold())?;
    writeln!(out, "  Template-owned: {} files", classification.template_owned.len())?;
    writeln!(out, "  App-owned (_skip_if_exists): {} files", classification.app_owned.len())?;
    writeln!(out, "  Excluded by feature flags: {} files", classification.excluded.len())?;
    writeln!(out)?;

    let unsupported = &result.inventory.exclusions.unsupported;
    if !unsupported.is_empty() {
        let heading = format!("Unsupported _exclude rules (not evaluated): {}", unsupported.len());
        writeln!(out, "{}", heading.yellow().bold())?;
        for entry in unsupported {
            let reason = format!("({})", entry.reason);
            writeln!(out, "  {}  {}", entry.raw, reason.dimmed())?;
        }
        writeln!(out)?;
    }

    writeln!(out, "{}", "Baseline commit (last copier update):".bold())?;
    writeln!(out, "  {}\n", result.baseline_description)?;
    Ok(())
}

fn render_summary(out: &mut String, summary: &DriftSummary) -> Result<()> {
    writeln!(out, "{}", "Summary:".bold())?;
    writeln!(
        out,
        "  {} template-owned files match source exactly",
        summary.matching.to_string().green()
    )?;
    if summary.unverifiable > 0 {
        writeln!(
            out,
            "  {} templated files (need `copier update --pretend` to verify)",
            summary.unverifiable.to_string().blue()
        )?;
    }
    if summary.post_adoption > 0 {
        writeln!(
            out,
            "  {} files modified since last copier update",
            summary.post_adoption.to_string().red()
        )?;
    }
    if summary.pre_existing > 0 {
        writeln!(
            out,
            "  {} files with pre-existing divergence from template source",
            summary.pre_existing.to_string().yellow()
        )?;
    }
    if summary.missing > 0 {
        writeln!(
            out,
            "  {} template-owned files missing",
            summary.missing.to_string().yellow()
        )?;
    }
    writeln!(out)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct JsonReport<'a> {
    app: String,
    app_dir: String,
    template_repo: String,
    baseline: JsonBaseline<'a>,
    feature_flags: BTreeMap<&'a str, bool>,
    inventory: JsonInventory,
    unsupported_excludes: &'a [UnsupportedRule],
    post_adoption: &'a [PostAdoptionChange],
    pre_existing: &'a [SourceDivergence],
    unverifiable: &'a [UnverifiableFile],
    missing: &'a [String],
    summary: DriftSummary,
    has_findings: bool,
}

#[derive(Serialize)]
struct JsonBaseline<'a> {
    sha: &'a str,
    date: String,
    description: &'a str,
}

#[derive(Serialize)]
struct JsonInventory {
    template_owned: usize,
    app_owned: usize,
    excluded: usize,
}

impl<'a> From<&'a AuditResult> for JsonReport<'a> {
    fn from(result: &'a AuditResult) -> Self {
        let classification = &result.inventory.classification;
        let report = &result.report;
        JsonReport {
            app: result.app_name(),
            app_dir: result.app_dir.display().to_string(),
            template_repo: result.template_root.display().to_string(),
            baseline: JsonBaseline {
                sha: result.baseline.sha.as_str(),
                date: result.baseline.date_label(),
                description: &result.baseline_description,
            },
            feature_flags: result.answers.feature_flags().into_iter().collect(),
            inventory: JsonInventory {
                template_owned: classification.template_owned.len(),
                app_owned: classification.app_owned.len(),
                excluded: classification.excluded.len(),
            },
            unsupported_excludes: &result.inventory.exclusions.unsupported,
            post_adoption: &report.post_adoption,
            pre_existing: &report.pre_existing,
            unverifiable: &report.unverifiable,
            missing: &report.missing,
            summary: report.summary(),
            has_findings: report.has_findings(),
        }
    }
}
