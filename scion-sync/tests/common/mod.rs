//! Throwaway git repositories for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::process::Command;

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn init_repo(dir: &Path) {
    fs::create_dir_all(dir).expect("mkdir");
    git(dir, &["init", "-q"]);
    git(dir, &["config", "user.email", "dev@example.com"]);
    git(dir, &["config", "user.name", "Dev"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(path, content).expect("write");
}

pub fn commit_all(dir: &Path, message: &str) {
    git(dir, &["add", "-A"]);
    git(dir, &["commit", "-q", "-m", message]);
}

pub fn commit_file(dir: &Path, rel: &str, content: &str, message: &str) {
    write(dir, rel, content);
    commit_all(dir, message);
}

/// Initialise `dir` with one commit and a bare `origin` tracking the current branch.
pub fn init_with_remote(dir: &Path, remote: &Path) {
    fs::create_dir_all(remote).expect("mkdir remote");
    git(remote, &["init", "-q", "--bare"]);
    init_repo(dir);
    commit_file(dir, "README.md", "hello\n", "initial");
    let remote_str = remote.to_str().expect("utf-8 path");
    git(dir, &["remote", "add", "origin", remote_str]);
    git(dir, &["push", "-q", "-u", "origin", "HEAD"]);
}
