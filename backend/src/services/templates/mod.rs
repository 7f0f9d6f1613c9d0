//! # Template Service Module
//!
//! Everything between a validated invoice row and a PDF on disk:
//!
//! - `render`: binds the seller and the invoice row into a Tera template and
//!   produces escaped HTML.
//! - `filters`: template helpers, such as `add_days` for due dates.
//! - `markup`: turns the rendered HTML into layout blocks.
//! - `pdf`: lays those blocks out with `genpdf` and writes the file.
//! - `list`: the `GET /api/templates` endpoint used by the GUI.

pub mod filters;
mod list;
pub mod markup;
pub mod pdf;
pub mod render;

use actix_web::web::{get, scope};
use actix_web::Scope;
use common::model::template::TemplateLanguage;
use std::path::{Path, PathBuf};

/// The base path for all template-related API endpoints.
const API_PATH: &str = "/api/templates";

/// Which template a run renders with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// One of the templates shipped in the templates directory.
    Builtin(TemplateLanguage),
    /// A template file supplied by the user.
    Custom(PathBuf),
}

impl Default for TemplateSource {
    fn default() -> Self {
        TemplateSource::Builtin(TemplateLanguage::default())
    }
}

impl TemplateSource {
    /// Path of the template file; built-in names are resolved in `templates_dir`.
    pub fn resolve(&self, templates_dir: &Path) -> PathBuf {
        match self {
            TemplateSource::Builtin(language) => templates_dir.join(language.file_name()),
            TemplateSource::Custom(path) => path.clone(),
        }
    }
}

/// Configures and returns the Actix `Scope` for template routes.
///
/// *   **`GET /`**: lists the built-in templates (`id`, `label`, `file`).
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(list::process))
}
