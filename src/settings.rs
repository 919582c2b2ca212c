//! Live-tunable effect parameters.
//!
//! [`Settings`] is the single source of truth for every value the control
//! panel can change. It is read once per frame by [`crate::App::apply_settings`].

use serde::{Deserialize, Serialize};

/// Identifier for a tunable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    Progress,
    Freq,
    Amp,
    CamX,
    CamY,
    CamZ,
    FontSize,
    LineHeight,
    OffsetY,
    NoiseAmount,
    BloomStrength,
    BloomRadius,
    BloomThreshold,
}

impl ParamId {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == s)
    }

    /// Canonical parameter name, as used in config files and by the panel.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Progress => "progress",
            Self::Freq => "freq",
            Self::Amp => "amp",
            Self::CamX => "camx",
            Self::CamY => "camy",
            Self::CamZ => "camz",
            Self::FontSize => "fontSize",
            Self::LineHeight => "lineHeight",
            Self::OffsetY => "offsetY",
            Self::NoiseAmount => "noiseAmount",
            Self::BloomStrength => "bloomStrength",
            Self::BloomRadius => "bloomRadius",
            Self::BloomThreshold => "bloomThreshold",
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            Self::Progress,
            Self::Freq,
            Self::Amp,
            Self::CamX,
            Self::CamY,
            Self::CamZ,
            Self::FontSize,
            Self::LineHeight,
            Self::OffsetY,
            Self::NoiseAmount,
            Self::BloomStrength,
            Self::BloomRadius,
            Self::BloomThreshold,
        ]
    }

    /// Whether changing this parameter requires rebuilding text geometry.
    pub fn affects_layout(&self) -> bool {
        matches!(self, Self::FontSize | Self::LineHeight)
    }
}

/// Effect settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Fraction of the text revealed by the wave sweep (0.0 - 1.0).
    pub progress: f32,
    /// Spatial frequency of the wave along the vertical axis.
    pub freq: f32,
    /// Displacement amplitude in world units.
    pub amp: f32,
    pub camx: f32,
    pub camy: f32,
    pub camz: f32,
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Shift of the sweep origin along the reading direction.
    pub offset_y: f32,
    /// Film grain intensity.
    pub noise_amount: f32,
    pub bloom_strength: f32,
    pub bloom_radius: f32,
    pub bloom_threshold: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            progress: 0.2,
            freq: 7.7,
            amp: 0.25,
            camx: -70.0,
            camy: 70.0,
            camz: 70.0,
            font_size: 5.8,
            line_height: 0.72,
            offset_y: 0.0,
            noise_amount: 0.8,
            bloom_strength: 0.3,
            bloom_radius: 0.3,
            bloom_threshold: 0.5,
        }
    }
}

impl Settings {
    pub fn get(&self, param: ParamId) -> f32 {
        match param {
            ParamId::Progress => self.progress,
            ParamId::Freq => self.freq,
            ParamId::Amp => self.amp,
            ParamId::CamX => self.camx,
            ParamId::CamY => self.camy,
            ParamId::CamZ => self.camz,
            ParamId::FontSize => self.font_size,
            ParamId::LineHeight => self.line_height,
            ParamId::OffsetY => self.offset_y,
            ParamId::NoiseAmount => self.noise_amount,
            ParamId::BloomStrength => self.bloom_strength,
            ParamId::BloomRadius => self.bloom_radius,
            ParamId::BloomThreshold => self.bloom_threshold,
        }
    }

    pub fn set(&mut self, param: ParamId, value: f32) {
        let slot = match param {
            ParamId::Progress => &mut self.progress,
            ParamId::Freq => &mut self.freq,
            ParamId::Amp => &mut self.amp,
            ParamId::CamX => &mut self.camx,
            ParamId::CamY => &mut self.camy,
            ParamId::CamZ => &mut self.camz,
            ParamId::FontSize => &mut self.font_size,
            ParamId::LineHeight => &mut self.line_height,
            ParamId::OffsetY => &mut self.offset_y,
            ParamId::NoiseAmount => &mut self.noise_amount,
            ParamId::BloomStrength => &mut self.bloom_strength,
            ParamId::BloomRadius => &mut self.bloom_radius,
            ParamId::BloomThreshold => &mut self.bloom_threshold,
        };
        *slot = value;
    }

    /// Camera position as set by the `camx`/`camy`/`camz` parameters.
    pub fn camera_position(&self) -> [f32; 3] {
        [self.camx, self.camy, self.camz]
    }
}
