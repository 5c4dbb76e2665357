//! Domain types shared across the scion crates.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Display label of a repository in the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepoName(pub String);

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RepoName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RepoName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A full commit object name as printed by `git log --format=%H`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitSha(pub String);

impl CommitSha {
    /// First `len` characters of the object name (the whole name if shorter).
    pub fn short(&self, len: usize) -> &str {
        match self.0.char_indices().nth(len) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommitSha {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for CommitSha {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A git repository taking part in workspace fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub name: RepoName,
    /// Resolved path of the working tree.
    pub path: PathBuf,
}

impl RepoRef {
    pub fn new(name: impl Into<RepoName>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The last commit that touched a repository's answers file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncBaseline {
    pub sha: CommitSha,
    /// Author date of the commit, when git reported one we could parse.
    pub date: Option<DateTime<FixedOffset>>,
}

impl SyncBaseline {
    /// `YYYY-MM-DD` of the author date, or an empty string.
    pub fn date_label(&self) -> String {
        self.date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(RepoName::from("backend").to_string(), "backend");
        assert_eq!(CommitSha::from("abc123").to_string(), "abc123");
    }

    #[test]
    fn short_sha_truncates_and_tolerates_short_input() {
        let sha = CommitSha::from("0123456789abcdef0123");
        assert_eq!(sha.short(12), "0123456789ab");
        assert_eq!(CommitSha::from("abc").short(12), "abc");
    }

    #[test]
    fn baseline_date_label_is_date_only() {
        let date = DateTime::parse_from_str("2024-03-05 14:22:01 +0100", "%Y-%m-%d %H:%M:%S %z")
            .expect("parse");
        let baseline = SyncBaseline {
            sha: CommitSha::from("abc"),
            date: Some(date),
        };
        assert_eq!(baseline.date_label(), "2024-03-05");

        let undated = SyncBaseline {
            sha: CommitSha::from("abc"),
            date: None,
        };
        assert_eq!(undated.date_label(), "");
    }
}
