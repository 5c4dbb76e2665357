//! Error types for scion-sync.

use std::path::PathBuf;

use thiserror::Error;

use scion_core::{GitError, WorkspaceError};
use scion_template::TemplateError;

/// All errors that can arise from drift detection and workspace fan-out.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Workspace descriptor or answers file problem.
    #[error(transparent)]
    Workspace(#[from] WorkspaceError),

    /// git could not be run.
    #[error(transparent)]
    Git(#[from] GitError),

    /// Template configuration or source tree problem.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No `--template-repo` was given and the answers record no `_src_path`.
    #[error("cannot determine template repo path for {app}; use --template-repo")]
    NoTemplateSource { app: PathBuf },

    /// `_src_path` points at a remote location rather than a local checkout.
    #[error("template source '{src}' is not a local path; use --template-repo")]
    RemoteTemplateSource { src: String },

    /// No commit ever touched the answers file.
    #[error("no commits found that modified {file} in {app}")]
    NoBaseline { app: PathBuf, file: &'static str },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
