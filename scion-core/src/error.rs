//! Error types for scion-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading the workspace descriptor and the answers file.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// Underlying I/O failure, annotated with the path being accessed.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No descriptor was given and none was found in the search directory.
    #[error("workspace descriptor not found in {dir} (pass --workspace or set SCION_WORKSPACE)")]
    DescriptorNotFound { dir: PathBuf },

    /// The descriptor exists but is not valid JSON once trailing commas are removed.
    #[error("failed to parse workspace descriptor {path}: {source}")]
    DescriptorParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The repository has no `.copier-answers.yml`.
    #[error("{dir} does not contain {file}")]
    AnswersNotFound { dir: PathBuf, file: &'static str },

    /// YAML parse error on the answers file.
    #[error("failed to parse answers file {path}: {source}")]
    AnswersParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Building a text-cleanup pattern failed.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors from invoking git.
///
/// A git command that runs and exits non-zero is not an error here; callers
/// decide whether a failed query means "no data". Only failing to run git at
/// all is reported.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run `git {args}` in {dir}: {source}")]
    Spawn {
        args: String,
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {args}` failed in {dir}: {stderr}")]
    Failed {
        args: String,
        dir: PathBuf,
        stderr: String,
    },
}

/// Convenience constructor for [`WorkspaceError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WorkspaceError {
    WorkspaceError::Io {
        path: path.into(),
        source,
    }
}
