//! Configuration for hbrender
//!
//! This is the tool's own configuration, not the template variables.

use eyre::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::render::RenderOptions;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Fail on references to missing variables
    #[serde(default)]
    pub strict: bool,

    /// HTML-escape substituted values
    #[serde(default)]
    pub html_escape: bool,

    /// Append a newline after each rendered document
    #[serde(default = "default_trailing_newline")]
    pub trailing_newline: bool,

    /// Strip a single top-level key from every variables file
    #[serde(default)]
    pub remove_root_key: bool,
}

fn default_trailing_newline() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            strict: false,
            html_escape: false,
            trailing_newline: default_trailing_newline(),
            remove_root_key: false,
        }
    }
}

impl Config {
    /// Load config from file, or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            return Self::load_file(config_path);
        }

        // Try default locations
        let default_paths = [
            dirs::config_dir().map(|p| p.join("hbrender").join("config.yml")),
            Some(PathBuf::from("hbrender.yml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        debug!("no configuration file found, using defaults");
        Ok(Config::default())
    }

    fn load_file(path: &Path) -> Result<Self> {
        debug!("loading configuration from {}", path.display());
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config {}", path.display()))
    }

    /// Engine settings, with `--strict` forcing strict mode on
    pub fn render_options(&self, force_strict: bool) -> RenderOptions {
        RenderOptions {
            strict: self.strict || force_strict,
            html_escape: self.html_escape,
            trailing_newline: self.trailing_newline,
        }
    }
}
