//! Copier template configuration (`copier.yml`).
//!
//! Only the settings that decide which files a template owns are read:
//!
//! | key                 | meaning                                          |
//! |---------------------|--------------------------------------------------|
//! | `_subdirectory`     | directory holding the template sources           |
//! | `_skip_if_exists`   | paths the generated app owns outright            |
//! | `_exclude`          | paths never generated, possibly flag-conditional |
//! | `_templates_suffix` | suffix marking files rendered with substitution  |
//!
//! Question definitions and every other key are ignored.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, TemplateError};

/// Configuration file names, in lookup order.
pub const CONFIG_FILES: &[&str] = &["copier.yml", "copier.yaml"];

/// Suffix used when `_templates_suffix` is not set.
pub const DEFAULT_TEMPLATES_SUFFIX: &str = ".jinja";

/// The ownership-related subset of `copier.yml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    #[serde(rename = "_subdirectory", default)]
    pub subdirectory: Option<String>,
    #[serde(rename = "_skip_if_exists", default)]
    pub skip_if_exists: Vec<String>,
    #[serde(rename = "_exclude", default)]
    pub exclude: Vec<String>,
    #[serde(rename = "_templates_suffix", default)]
    pub templates_suffix: Option<String>,
}

impl TemplateConfig {
    /// Parse configuration text. `path` is only used for error context.
    pub fn parse(text: &str, path: &Path) -> Result<Self, TemplateError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).map_err(|source| TemplateError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Effective template suffix. An empty suffix marks every file as templated.
    pub fn suffix(&self) -> &str {
        self.templates_suffix
            .as_deref()
            .unwrap_or(DEFAULT_TEMPLATES_SUFFIX)
    }
}

/// A template repository on disk with its parsed configuration.
#[derive(Debug, Clone)]
pub struct TemplateRepo {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub config: TemplateConfig,
}

impl TemplateRepo {
    /// Path of the configuration file in `root`, if any.
    pub fn find_config(root: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.is_file())
    }

    /// Load the template repository at `root`.
    ///
    /// Returns [`TemplateError::ConfigNotFound`] when `root` has no configuration file.
    pub fn load(root: &Path) -> Result<Self, TemplateError> {
        let config_path = Self::find_config(root).ok_or_else(|| TemplateError::ConfigNotFound {
            dir: root.to_path_buf(),
        })?;
        let text = std::fs::read_to_string(&config_path).map_err(|e| io_err(&config_path, e))?;
        let config = TemplateConfig::parse(&text, &config_path)?;
        Ok(Self {
            root: root.to_path_buf(),
            config_path,
            config,
        })
    }

    /// Directory holding the template sources (`<root>/<_subdirectory>`).
    pub fn source_dir(&self) -> PathBuf {
        match self.config.subdirectory.as_deref() {
            None | Some("") | Some(".") => self.root.clone(),
            Some(sub) => self.root.join(sub),
        }
    }
}
