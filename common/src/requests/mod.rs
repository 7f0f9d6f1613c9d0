use crate::model::template::TemplateLanguage;
use serde::Deserialize;

/// Request payload for `POST /api/generate/start`.
///
/// Paths are plain strings as typed in the form; the server resolves them
/// against its own working directory.
#[derive(Deserialize, Debug, Clone)]
pub struct StartGenerationRequest {
    pub csv_path: String,
    pub name: String,
    pub address: String,
    pub ico: String,
    /// Falls back to the configured default output directory.
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub template: TemplateLanguage,
    /// Takes precedence over `template` when set.
    #[serde(default)]
    pub custom_template: Option<String>,
}
