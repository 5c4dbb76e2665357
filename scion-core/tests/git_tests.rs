//! Git wrapper behaviour against real throwaway repositories.

use std::fs;
use std::path::Path;
use std::process::Command;

use scion_core::{Git, GitError, ANSWERS_FILE};
use tempfile::TempDir;

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .status()
        .expect("run git");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo(dir: &Path) {
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "dev@example.com"]);
    git(dir, &["config", "user.name", "Dev"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

fn commit_file(dir: &Path, rel: &str, content: &str, message: &str) {
    let path = dir.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(&path, content).expect("write");
    git(dir, &["add", "."]);
    git(dir, &["commit", "-q", "-m", message]);
}

#[test]
fn baseline_is_last_commit_touching_answers() {
    let repo = TempDir::new().expect("repo");
    init_repo(repo.path());
    commit_file(repo.path(), ANSWERS_FILE, "_commit: v1\n", "adopt template");
    commit_file(repo.path(), "app/main.py", "print('hi')\n", "app work");
    commit_file(repo.path(), ANSWERS_FILE, "_commit: v2\n", "update template");
    commit_file(repo.path(), "app/main.py", "print('bye')\n", "more app work");

    let git = Git::new(repo.path());
    let baseline = git
        .last_commit_touching(ANSWERS_FILE)
        .expect("query")
        .expect("baseline");
    assert_eq!(
        git.describe_commit(&baseline.sha).expect("describe").split_once(' ').map(|(_, s)| s),
        Some("update template")
    );
    assert!(!baseline.date_label().is_empty());

    let log = git.log_since(&baseline.sha, &["."]).expect("log");
    assert_eq!(log.len(), 1);
    assert!(log[0].ends_with("more app work"));

    assert!(git.changed_since(&baseline.sha, &["app/main.py"]).expect("changed"));
    assert!(!git.changed_since(&baseline.sha, &[ANSWERS_FILE]).expect("changed"));

    let diff = git.diff_since(&baseline.sha, &["app/main.py"], false).expect("diff");
    assert!(diff.contains("-print('hi')"));
    assert!(diff.contains("+print('bye')"));
    assert!(!diff.contains('\u{1b}'), "colorless diff must not contain escapes");
}

#[test]
fn no_baseline_without_answers_history() {
    let repo = TempDir::new().expect("repo");
    init_repo(repo.path());
    commit_file(repo.path(), "README.md", "# app\n", "init");

    let git = Git::new(repo.path());
    assert!(git.last_commit_touching(ANSWERS_FILE).expect("query").is_none());
}

#[test]
fn status_and_untracked_reflect_working_tree() {
    let repo = TempDir::new().expect("repo");
    init_repo(repo.path());
    commit_file(repo.path(), "a.txt", "one\n", "init");

    let git = Git::new(repo.path());
    assert!(git.status_porcelain().expect("status").is_empty());

    fs::write(repo.path().join("a.txt"), "two\n").expect("edit");
    fs::write(repo.path().join("new.txt"), "new\n").expect("new");

    let status = git.status_porcelain().expect("status");
    assert_eq!(status.len(), 2, "got: {status:?}");
    assert_eq!(git.untracked_files().expect("untracked"), vec!["new.txt".to_string()]);
    assert!(git.diff_unstaged(false).expect("diff").contains("+two"));
    assert!(git.diff_staged(false).expect("diff").is_empty());
}

#[test]
fn status_outside_a_repository_is_an_error() {
    let dir = TempDir::new().expect("dir");
    let err = Git::new(dir.path()).status_porcelain().unwrap_err();
    assert!(matches!(err, GitError::Failed { .. }), "got: {err:?}");
}

#[test]
fn unpushed_commits_without_upstream_is_none() {
    let repo = TempDir::new().expect("repo");
    init_repo(repo.path());
    commit_file(repo.path(), "a.txt", "one\n", "init");

    assert!(Git::new(repo.path()).unpushed_commits().expect("query").is_none());
}
