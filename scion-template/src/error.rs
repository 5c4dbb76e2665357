//! Error types for scion-template.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while reading a template repository.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Neither `copier.yml` nor `copier.yaml` exists in the template repository.
    #[error("{dir} does not contain copier.yml")]
    ConfigNotFound { dir: PathBuf },

    /// YAML parse error on the template configuration.
    #[error("failed to parse template configuration {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The configured `_subdirectory` does not exist.
    #[error("template source directory {path} does not exist")]
    SourceDirMissing { path: PathBuf },

    /// Filesystem error while reading template files.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error while walking the template source tree.
    #[error("failed to walk template tree: {0}")]
    Walk(#[from] walkdir::Error),

    /// Building the exclusion rule pattern failed.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> TemplateError {
    TemplateError::Io {
        path: path.into(),
        source,
    }
}
