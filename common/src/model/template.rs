use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Built-in invoice templates shipped in the installation's `templates/` directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateLanguage {
    #[default]
    English,
    Czech,
}

impl TemplateLanguage {
    pub const ALL: [TemplateLanguage; 2] = [TemplateLanguage::English, TemplateLanguage::Czech];

    /// File name of the template inside the templates directory.
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateLanguage::English => "invoice.html",
            TemplateLanguage::Czech => "invoice_cz.html",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TemplateLanguage::English => "English",
            TemplateLanguage::Czech => "Czech",
        }
    }
}

impl fmt::Display for TemplateLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TemplateLanguage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(TemplateLanguage::English),
            "cz" | "cs" | "czech" => Ok(TemplateLanguage::Czech),
            other => Err(format!("unknown template language '{}' (expected en or cz)", other)),
        }
    }
}
