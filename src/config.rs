//! Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::text::DEFAULT_TEXT;

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

/// Startup configuration: viewport, content, asset paths and initial settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    pub text: String,
    pub font_path: PathBuf,
    pub noise_path: PathBuf,
    /// Bright surface color as hex.
    pub color_a: String,
    /// Dark surface color as hex.
    pub color_b: String,
    /// Subdivisions per glyph quad side.
    pub glyph_detail: u32,
    pub settings: Settings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            text: DEFAULT_TEXT.to_string(),
            font_path: PathBuf::from("assets/fonts/BebasNeue-Regular.ttf"),
            noise_path: PathBuf::from("assets/img/noise.png"),
            color_a: "#e1e1e1".to_string(),
            color_b: "#000000".to_string(),
            glyph_detail: 80,
            settings: Settings::default(),
        }
    }
}

impl AppConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Parsed surface colors `(color_a, color_b)`.
    pub fn colors(&self) -> Result<([f32; 3], [f32; 3]), ConfigError> {
        let parse = |hex: &str| parse_hex_color(hex).ok_or_else(|| ConfigError::InvalidColor(hex.to_string()));
        Ok((parse(&self.color_a)?, parse(&self.color_b)?))
    }
}

/// Parse hex color to RGB floats (accepts 6-char RGB or 8-char RGBA, alpha is ignored).
pub fn parse_hex_color(hex: &str) -> Option<[f32; 3]> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 && hex.len() != 8 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()? as f32 / 255.0;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()? as f32 / 255.0;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()? as f32 / 255.0;
    Some([r, g, b])
}
