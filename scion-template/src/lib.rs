//! # scion-template
//!
//! Reads a Copier template repository and decides which of its files a
//! generated app owns, which the template owns, and which feature flags
//! exclude.
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use scion_core::Answers;
//! use scion_template::{TemplateInventory, TemplateRepo};
//!
//! fn owned(template: &Path, app: &Path) -> Result<usize, Box<dyn std::error::Error>> {
//!     let repo = TemplateRepo::load(template)?;
//!     let answers = Answers::load(app)?;
//!     let inventory = TemplateInventory::build(&repo, &answers)?;
//!     Ok(inventory.classification.template_owned.len())
//! }
//! ```

pub mod config;
pub mod error;
pub mod expr;
pub mod inventory;

pub use config::{TemplateConfig, TemplateRepo};
pub use error::TemplateError;
pub use expr::{evaluate_excludes, ExcludeRule, Exclusions, UnsupportedRule};
pub use inventory::{classify, Classification, Ownership, TemplateFile, TemplateInventory};
