//! # scion-sync
//!
//! Workspace fan-out, changes since the last template sync, and template
//! drift detection.
//!
//! Call [`audit`] to check one app against its template, [`changes_for_all`]
//! to list app work since each repository's sync, or the [`fanout`] functions
//! to pull, push or review every workspace repository.

pub mod baseline;
pub mod diff;
pub mod drift;
pub mod error;
pub mod fanout;
pub mod pipeline;

pub use baseline::{changes_for_all, changes_since_sync, ChangesSinceSync, RepoChanges};
pub use diff::LineCounts;
pub use drift::{DriftReport, DriftSummary};
pub use error::SyncError;
pub use fanout::{push_all, pull_all, review_all, PushRun, WorkingTree};
pub use pipeline::{audit, AuditResult};
