//! Runtime configuration, read from the environment.
//!
//! Front ends build a [`Config`] once at startup; CLI flags override the
//! values found here.

use log::warn;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "./output";
pub const DEFAULT_FONTS_DIR: &str = "./fonts";
pub const DEFAULT_FONT_FAMILY: &str = "LiberationSans";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

const TEMPLATES_DIR_NAME: &str = "templates";

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the built-in `invoice.html` / `invoice_cz.html`.
    pub templates_dir: PathBuf,
    /// Directory with the `genpdf` font family files.
    pub fonts_dir: PathBuf,
    /// Font family name, e.g. `LiberationSans` for `LiberationSans-Regular.ttf`.
    pub font_family: String,
    pub output_dir: PathBuf,
    pub host: String,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            templates_dir: default_templates_dir(),
            fonts_dir: PathBuf::from(DEFAULT_FONTS_DIR),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Reads `INVOICE_*` variables, keeping defaults for anything unset.
    pub fn from_env() -> Self {
        let mut config = Config::default();

        if let Ok(dir) = env::var("INVOICE_TEMPLATES_DIR") {
            config.templates_dir = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("INVOICE_FONTS_DIR") {
            config.fonts_dir = PathBuf::from(dir);
        }
        if let Ok(family) = env::var("INVOICE_FONT_FAMILY") {
            config.font_family = family;
        }
        if let Ok(dir) = env::var("INVOICE_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Ok(host) = env::var("INVOICE_GUI_HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("INVOICE_GUI_PORT") {
            match port.parse() {
                Ok(port) => config.port = port,
                Err(_) => warn!("Ignoring invalid INVOICE_GUI_PORT '{}'", port),
            }
        }

        config
    }
}

/// `templates/` next to the executable when installed, otherwise the one in
/// the source tree.
fn default_templates_dir() -> PathBuf {
    let installed = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(TEMPLATES_DIR_NAME)));

    match installed {
        Some(dir) if dir.is_dir() => dir,
        _ => Path::new(env!("CARGO_MANIFEST_DIR")).join(TEMPLATES_DIR_NAME),
    }
}
