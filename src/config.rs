//! Chart appearance configuration, optionally loaded from a TOML file.

use serde::Deserialize;
use std::path::Path;

/// Rendering parameters shared by every chart of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PlotConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Stroke width of every series line
    pub line_width: u32,
    pub caption_font_size: u32,
    pub label_font_size: u32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            line_width: 1,
            caption_font_size: 20,
            label_font_size: 14,
        }
    }
}

impl PlotConfig {
    /// Load configuration from a TOML file.
    ///
    /// Keys missing from the file keep their default values.
    ///
    /// # Returns
    /// * `Ok(PlotConfig)` if the file was read, parsed and validated
    /// * `Err(String)` with a descriptive error message otherwise
    pub fn load(config_path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(config_path).map_err(|e| format!("Failed to read config file: {}", e))?;

        let config: PlotConfig = toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `config_path` when given, defaults otherwise.
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, String> {
        match config_path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be > 0".into());
        }
        if self.line_width == 0 {
            return Err("line-width must be > 0".into());
        }
        Ok(())
    }
}
