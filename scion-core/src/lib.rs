//! scion core library: domain types, workspace enumeration, answers file,
//! git runner, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`error`]: [`WorkspaceError`], [`GitError`]
//! - [`workspace`]: descriptor discovery and repository enumeration
//! - [`answers`]: `.copier-answers.yml`
//! - [`git`]: synchronous git invocations

pub mod answers;
pub mod error;
pub mod git;
pub mod types;
pub mod workspace;

pub use answers::{Answers, ANSWERS_FILE};
pub use error::{GitError, WorkspaceError};
pub use git::{Git, GitOutput};
pub use types::{CommitSha, RepoName, RepoRef, SyncBaseline};
