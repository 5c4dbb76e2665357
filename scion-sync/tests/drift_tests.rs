//! Drift audits of a generated app against an on-disk template.

mod common;

use std::path::{Path, PathBuf};

use scion_core::{WorkspaceError, ANSWERS_FILE};
use scion_sync::{audit, SyncError};
use scion_template::TemplateError;
use tempfile::TempDir;

use common::{commit_all, commit_file, init_repo, write};

const COPIER_YML: &str = r#"
_subdirectory: template
_skip_if_exists:
  - app/config.py
_exclude:
  - "{% if not use_database %}app/extensions.py{% endif %}"
"#;

const ANSWERS: &str = "\
_commit: v1.0.0
_src_path: ../template
project_name: billing
use_database: false
";

struct Fixture {
    _root: TempDir,
    app: PathBuf,
    template: PathBuf,
}

fn write_template(template: &Path) {
    write(template, "copier.yml", COPIER_YML);
    write(template, "template/README.md.jinja", "# {{ project_name }}\n");
    write(template, "template/Makefile", "all:\n\tpytest\n");
    write(template, "template/app/__init__.py", "");
    write(template, "template/app/main.py", "print('v1')\n");
    write(template, "template/app/util.py", "X = 1\n");
    write(template, "template/app/config.py", "DEBUG = False\n");
    write(template, "template/app/extensions.py", "db = None\n");
}

/// App adopted from the template with one pre-existing divergence, one
/// missing file and one app-owned file that differs.
fn fixture() -> Fixture {
    let root = TempDir::new().expect("root");
    let template = root.path().join("template");
    let app = root.path().join("app");
    write_template(&template);

    init_repo(&app);
    write(&app, ANSWERS_FILE, ANSWERS);
    write(&app, "README.md", "# billing\n");
    write(&app, "Makefile", "all:\n\tpytest\n");
    write(&app, "app/main.py", "print('v1')\n");
    write(&app, "app/util.py", "X = 2\n");
    write(&app, "app/config.py", "DEBUG = True\n");
    commit_all(&app, "adopt template");

    Fixture {
        _root: root,
        app,
        template,
    }
}

#[test]
fn buckets_every_template_owned_file_once() {
    let fx = fixture();
    commit_file(&fx.app, "app/main.py", "print('v2')\n", "tweak main");

    let result = audit(&fx.app, None).expect("audit");
    let report = &result.report;
    assert_eq!(result.inventory.classification.template_owned.len(), 5);

    assert_eq!(report.post_adoption.len(), 1);
    let main = &report.post_adoption[0];
    assert_eq!(main.path, "app/main.py");
    assert!(main.also_diverges);
    assert_eq!(main.counts.added, 1);
    assert_eq!(main.counts.removed, 1);
    assert_eq!(main.commits.len(), 1);
    assert!(main.commits[0].ends_with("tweak main"));

    let pre: Vec<&str> = report.pre_existing.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(pre, vec!["app/util.py"]);
    assert!(report.pre_existing[0].diff.contains("--- template/app/util.py"));

    let unverifiable: Vec<&str> = report.unverifiable.iter().map(|u| u.path.as_str()).collect();
    assert_eq!(unverifiable, vec!["README.md"]);
    assert_eq!(report.missing, vec!["app/__init__.py"]);

    let summary = report.summary();
    assert_eq!(summary.matching, 1);
    assert_eq!(summary.total(), 5);
    assert!(report.has_findings());
}

#[test]
fn app_owned_and_excluded_files_are_never_reported() {
    let fx = fixture();
    commit_file(&fx.app, "app/config.py", "DEBUG = 1\n", "local config");

    let result = audit(&fx.app, None).expect("audit");
    let report = &result.report;
    let reported = report
        .post_adoption
        .iter()
        .map(|c| c.path.as_str())
        .chain(report.pre_existing.iter().map(|d| d.path.as_str()))
        .chain(report.unverifiable.iter().map(|u| u.path.as_str()))
        .chain(report.missing.iter().map(String::as_str))
        .collect::<Vec<_>>();
    assert!(!reported.contains(&"app/config.py"));
    assert!(!reported.contains(&"app/extensions.py"));
}

#[test]
fn changed_templated_file_is_not_unverifiable() {
    let fx = fixture();
    commit_file(&fx.app, "README.md", "# billing service\n", "rename heading");

    let report = audit(&fx.app, None).expect("audit").report;
    assert!(report.unverifiable.is_empty());
    assert_eq!(report.post_adoption.len(), 1);
    assert_eq!(report.post_adoption[0].path, "README.md");
    assert!(!report.post_adoption[0].also_diverges);
}

#[test]
fn audit_is_idempotent() {
    let fx = fixture();
    commit_file(&fx.app, "app/main.py", "print('v2')\n", "tweak main");

    let first = audit(&fx.app, None).expect("first");
    let second = audit(&fx.app, None).expect("second");
    assert_eq!(first.report, second.report);
    assert_eq!(first.report.summary(), second.report.summary());
}

#[test]
fn clean_adoption_has_no_findings() {
    let fx = fixture();
    write(&fx.app, "app/__init__.py", "");
    write(&fx.app, "app/util.py", "X = 1\n");
    commit_all(&fx.app, "align with template");
    // Re-adopt so the alignment commit becomes the baseline.
    commit_file(&fx.app, ANSWERS_FILE, &format!("{ANSWERS}# resynced\n"), "resync");

    let result = audit(&fx.app, None).expect("audit");
    assert!(!result.report.has_findings());
    assert_eq!(result.report.summary().matching, 4);
    assert_eq!(result.report.summary().unverifiable, 1);
    assert!(result.baseline_description.ends_with("resync"));
}

#[test]
fn line_ending_only_divergence_has_a_diff() {
    let fx = fixture();
    write(&fx.app, "app/main.py", "print('v1')\r\n");
    commit_all(&fx.app, "convert to crlf");
    commit_file(&fx.app, ANSWERS_FILE, &format!("{ANSWERS}# resynced\n"), "resync");

    let report = audit(&fx.app, None).expect("audit").report;
    let main = report
        .pre_existing
        .iter()
        .find(|d| d.path == "app/main.py")
        .expect("main.py diverges");
    assert_eq!(main.counts.added, 1);
    assert_eq!(main.counts.removed, 1);
    assert!(main.diff.contains("-print('v1')"));
    assert!(main.diff.contains("+print('v1')\r"));
}

#[test]
fn template_override_replaces_src_path() {
    let fx = fixture();
    let moved = fx.app.parent().expect("parent").join("elsewhere");
    std::fs::rename(&fx.template, &moved).expect("move template");

    let err = audit(&fx.app, None).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Template(TemplateError::ConfigNotFound { .. })
    ));

    let result = audit(&fx.app, Some(&moved)).expect("audit");
    assert_eq!(result.template_root, moved.canonicalize().expect("canonical"));
}

#[test]
fn missing_answers_file_is_fatal() {
    let root = TempDir::new().expect("root");
    init_repo(root.path());
    let err = audit(root.path(), None).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Workspace(WorkspaceError::AnswersNotFound { .. })
    ));
    assert!(err.to_string().contains(ANSWERS_FILE));
}

#[test]
fn uncommitted_answers_file_has_no_baseline() {
    let root = TempDir::new().expect("root");
    write_template(&root.path().join("template"));
    let app = root.path().join("app");
    init_repo(&app);
    write(&app, ANSWERS_FILE, ANSWERS);

    let err = audit(&app, None).unwrap_err();
    assert!(matches!(err, SyncError::NoBaseline { .. }));
    assert!(err.to_string().contains("no commits found"));
}
