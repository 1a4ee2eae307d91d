use crate::error::{CaptionError, Result};
use crate::render::Canvas;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Preset name or path used when none is given on the command line.
    pub default_preset: String,
    /// Extra directory searched for `<name>.json` / `<name>.toml` presets.
    pub presets_dir: Option<PathBuf>,
    /// Number of segments laid out concurrently.
    pub concurrency: usize,
    pub canvas: Canvas,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_preset: "tiktok".to_string(),
            presets_dir: None,
            concurrency: 4,
            canvas: Canvas::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                match toml::from_str::<Config>(&contents) {
                    Ok(file_config) => config = file_config,
                    Err(e) => tracing::warn!(
                        "Ignoring malformed config file {}: {}",
                        config_path.display(),
                        e
                    ),
                }
            }
        }

        // Override with environment variables
        if let Ok(preset) = std::env::var("AUTOCAPTION_PRESET") {
            if !preset.trim().is_empty() {
                config.default_preset = preset.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var("AUTOCAPTION_PRESETS_DIR") {
            if !dir.trim().is_empty() {
                config.presets_dir = Some(PathBuf::from(dir.trim()));
            }
        }
        if let Ok(concurrency) = std::env::var("AUTOCAPTION_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                config.concurrency = c;
            }
        }
        if let Ok(canvas) = std::env::var("AUTOCAPTION_CANVAS") {
            if let Ok(c) = canvas.parse() {
                config.canvas = c;
            }
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(CaptionError::config(
                "concurrency",
                "must be greater than 0",
            ));
        }

        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CaptionError::config(
                "canvas",
                format!("dimensions must be non-zero, got {}", self.canvas),
            ));
        }

        if self.default_preset.trim().is_empty() {
            return Err(CaptionError::config(
                "default_preset",
                "must name a preset",
            ));
        }

        Ok(())
    }

    pub fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("autocaption").join("config.toml"))
    }
}
