//! Configuration file management
//!
//! Loads TOML configuration files and provides application settings.
//! Default config path: ~/.config/fbterm/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Font settings
    pub font: FontConfig,
    /// Device path settings
    pub paths: PathConfig,
    /// Terminal settings
    pub terminal: TerminalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: FontConfig::default(),
            paths: PathConfig::default(),
            terminal: TerminalConfig::default(),
        }
    }
}

/// Font settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Fallback font file paths, tried in order for codepoints the
    /// primary font does not cover
    pub fallbacks: Vec<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            fallbacks: vec![
                "/usr/share/fonts/noto/NotoSansArabic-Regular.ttf".to_string(),
                "/usr/share/fonts/noto/NotoSansHebrew-Regular.ttf".to_string(),
                "/usr/share/fonts/noto/NotoSansThai-Regular.ttf".to_string(),
            ],
        }
    }
}

/// Device path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    /// Framebuffer device
    pub framebuffer: String,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            framebuffer: "/dev/fb0".to_string(),
        }
    }
}

/// Terminal settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Shell to spawn (empty: use $SHELL, then /bin/sh)
    pub shell: String,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            shell: String::new(),
        }
    }
}

/// Default config file location
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("fbterm").join("config.toml"))
}

impl Config {
    /// Load the config file, falling back to built-in defaults when it is
    /// missing or unreadable.
    pub fn load() -> Self {
        if let Some(path) = default_config_path() {
            if path.exists() {
                match Self::load_from_file(path.to_string_lossy().as_ref()) {
                    Ok(config) => {
                        info!("Loaded config: {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to load config {}: {:#}", path.display(), e);
                    }
                }
            }
        }
        info!("Using built-in default config");
        Self::default()
    }

    /// Load settings from a specific path
    fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;
        Ok(config)
    }
}
