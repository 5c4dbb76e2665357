//! Workspace descriptor loading and repository enumeration.
//!
//! The descriptor is a VS Code `*.code-workspace` file:
//!
//! ```text
//! {
//!   "folders": [
//!     { "path": "apps/billing", "name": "billing" },
//!     { "path": "template", },
//!   ],
//! }
//! ```
//!
//! Trailing commas and full-line `//` comments are tolerated. Two fixed
//! repositories ([`IMPLICIT_REPOS`]) are prepended to the listed folders, and
//! every entry whose resolved path has no `.git` is dropped.
//!
//! # API pattern
//!
//! Functions take the descriptor path or search directory explicitly so tests
//! can point them at a `TempDir`.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;

use crate::error::{io_err, WorkspaceError};
use crate::types::RepoRef;

/// Repositories that are always part of the workspace, as `(name, path)`
/// relative to the descriptor's directory.
pub const IMPLICIT_REPOS: &[(&str, &str)] = &[("frontend", "frontend"), ("backend", "backend")];

/// File extension of workspace descriptors.
pub const DESCRIPTOR_EXTENSION: &str = "code-workspace";

// ---------------------------------------------------------------------------
// Descriptor format
// ---------------------------------------------------------------------------

/// Parsed workspace descriptor. Keys other than `folders` are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkspaceDescriptor {
    #[serde(default)]
    pub folders: Vec<FolderEntry>,
}

/// One `folders` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FolderEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub name: Option<String>,
}

/// Parse descriptor text. `path` is only used for error context.
pub fn parse_descriptor(text: &str, path: &Path) -> Result<WorkspaceDescriptor, WorkspaceError> {
    let cleaned = strip_jsonc(text)?;
    serde_json::from_str(&cleaned).map_err(|source| WorkspaceError::DescriptorParse {
        path: path.to_path_buf(),
        source,
    })
}

fn strip_jsonc(text: &str) -> Result<String, WorkspaceError> {
    let line_comment = Regex::new(r"(?m)^\s*//.*$")?;
    let trailing_comma = Regex::new(r",(\s*[}\]])")?;
    let without_comments = line_comment.replace_all(text, "");
    Ok(trailing_comma
        .replace_all(&without_comments, "$1")
        .into_owned())
}

// ---------------------------------------------------------------------------
// Descriptor discovery
// ---------------------------------------------------------------------------

/// Pick the descriptor to use: `explicit` when given, otherwise the
/// alphabetically first `*.code-workspace` file in `search_dir`.
pub fn resolve_descriptor(
    explicit: Option<&Path>,
    search_dir: &Path,
) -> Result<PathBuf, WorkspaceError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => find_descriptor_in(search_dir),
    }
}

/// Alphabetically first `*.code-workspace` file directly inside `dir`.
pub fn find_descriptor_in(dir: &Path) -> Result<PathBuf, WorkspaceError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some(DESCRIPTOR_EXTENSION))
        .collect();
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| WorkspaceError::DescriptorNotFound {
            dir: dir.to_path_buf(),
        })
}

// ---------------------------------------------------------------------------
// Enumeration
// ---------------------------------------------------------------------------

/// Enumerate the git repositories of the workspace described at `descriptor`.
///
/// Order: [`IMPLICIT_REPOS`] first, then `folders` as listed. Entries whose
/// resolved path has no `.git` are skipped without error.
pub fn list_repos_at(descriptor: &Path) -> Result<Vec<RepoRef>, WorkspaceError> {
    let text = std::fs::read_to_string(descriptor).map_err(|e| io_err(descriptor, e))?;
    let parsed = parse_descriptor(&text, descriptor)?;
    let base = descriptor
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(collect_repos(base, &parsed))
}

fn collect_repos(base: &Path, descriptor: &WorkspaceDescriptor) -> Vec<RepoRef> {
    let implicit = IMPLICIT_REPOS
        .iter()
        .map(|(name, path)| (Some((*name).to_string()), PathBuf::from(path)));
    let listed = descriptor
        .folders
        .iter()
        .map(|f| (f.name.clone(), f.path.clone()));

    let mut repos = Vec::new();
    for (name, relative) in implicit.chain(listed) {
        let path = resolve_path(base, &relative);
        if !path.join(".git").exists() {
            tracing::debug!(path = %path.display(), "skipping workspace entry without .git");
            continue;
        }
        let name = name.unwrap_or_else(|| default_name(&path));
        repos.push(RepoRef::new(name, path));
    }
    repos
}

fn resolve_path(base: &Path, relative: &Path) -> PathBuf {
    let joined = base.join(relative);
    joined.canonicalize().unwrap_or(joined)
}

fn default_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
