//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the study library lives
    pub library: LibraryConfig,
    /// UI settings
    pub ui: UiConfig,
}

/// Library location settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// HTTP(S) base URL or local directory holding the library
    pub base: String,
    /// Manifest path relative to the base
    pub manifest_path: String,
    /// Root that document paths are built under
    pub materials_root: String,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Viewport width below which the sidebar floats over the content
    pub narrow_width: f32,
    /// Sidebar width
    pub sidebar_width: f32,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            base: ".".to_string(),
            manifest_path: "config.json".to_string(),
            materials_root: "/materials".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            narrow_width: 768.0,
            sidebar_width: 288.0,
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "studyshelf", "StudyShelf")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        let path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Self::load_from(&path)
    }

    /// Load configuration from a file, falling back to defaults when absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        tracing::info!("Loaded config from: {}", path.display());
        Ok(config)
    }

    pub fn dark_mode(&self) -> bool {
        self.ui.theme.eq_ignore_ascii_case("dark")
    }
}
