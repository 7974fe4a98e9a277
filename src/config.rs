// =============================================================================
// CONFIGURATION - Load settings from config.toml
// =============================================================================
//
// Loading and parsing of config.toml with sensible defaults when the file is
// missing or malformed. Shader paths live here: they are configuration
// values, never computed at runtime.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub graphics: GraphicsConfig,
    pub debug: DebugConfig,
}

/// Window settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Lantern".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// Graphics settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GraphicsConfig {
    /// Force FIFO (vsync) instead of the mailbox/immediate preference chain.
    pub vsync: bool,
    pub clear_color: [f32; 4],
    pub vert_shader: String,
    pub frag_shader: String,
}

impl Default for GraphicsConfig {
    fn default() -> Self {
        Self {
            vsync: false,
            clear_color: [0.01, 0.01, 0.01, 1.0],
            vert_shader: "shaders/simple.vert.spv".to_string(),
            frag_shader: "shaders/simple.frag.spv".to_string(),
        }
    }
}

/// Debug settings
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub validation_layers: bool,
    pub show_fps: bool,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            validation_layers: true,
            show_fps: true,
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults if not found
    pub fn load() -> Self {
        Self::load_from_path("config.toml").unwrap_or_else(|e| {
            log::warn!("Failed to load config.toml: {}. Using defaults.", e);
            Config::default()
        })
    }

    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        log::info!("Loaded configuration from {:?}", path);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_sections_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 600);
        assert!(!config.graphics.vsync);
        assert_eq!(config.graphics.vert_shader, "shaders/simple.vert.spv");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let toml = r#"
            [window]
            title = "demo"
            width = 1920

            [graphics]
            vsync = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.window.title, "demo");
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.window.height, 600);
        assert!(config.graphics.vsync);
        assert!(config.debug.validation_layers);
    }
}
