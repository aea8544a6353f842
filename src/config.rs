//! User configuration read from `~/.devminder/config.toml`.
//!
//! Every field is optional; a missing file means defaults.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;
use crate::palette::TagPalette;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fixture file to load instead of the built-in data.
    #[serde(default)]
    pub data: Option<PathBuf>,
    /// Project opened by `dm ui` and used by `dm list` when none is given.
    #[serde(default)]
    pub default_project: Option<String>,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Start with every parent node expanded.
    #[serde(default)]
    pub expand_all: bool,
    /// Show done tasks in `dm list` without `--all`.
    #[serde(default = "default_true")]
    pub show_completed: bool,
    /// Tag -> colour name overrides, e.g. `QA = "indigo"`.
    #[serde(default)]
    pub tag_colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            expand_all: false,
            show_completed: true,
            tag_colors: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Default location under the home directory.
    pub fn default_path() -> PathBuf {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".devminder").join("config.toml")
    }

    /// Load `path`. A missing file yields the default configuration.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// The built-in palette with this configuration's colour overrides.
    pub fn palette(&self) -> Result<TagPalette, ConfigError> {
        TagPalette::default().with_overrides(&self.ui.tag_colors)
    }
}
