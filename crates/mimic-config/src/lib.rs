use std::path::{Path, PathBuf};

use anyhow::Context;
use mimic_core::{Preferences, RedactionSettings};
use serde::{Deserialize, Serialize};

/// Persistent configuration for mimic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Word list location: `builtin:`, `file:path`, a bare path or an http(s) URL.
    #[serde(default = "default_dictionary")]
    pub dictionary: String,

    #[serde(default)]
    pub redaction: RedactionSettings,

    #[serde(default)]
    pub preferences: Preferences,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dictionary: default_dictionary(),
            redaction: RedactionSettings::default(),
            preferences: Preferences::default(),
        }
    }
}

fn default_dictionary() -> String {
    "builtin:".to_string()
}

impl Config {
    /// Load config from default location or create default if not found
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, writing the defaults there if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn config_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "mimic", "mimic") {
            dirs.config_dir().join("config.toml")
        } else {
            PathBuf::from("~/.mimic/config.toml")
        }
    }
}
