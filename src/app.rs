//! Application state: settings, camera, text node, material and pass chain.
//!
//! [`Settings`] is the only source of truth. Every derived value (material
//! uniforms, text layout, pass tunables, camera position) is written by
//! [`App::apply_settings`], which runs once per frame from [`App::update`] and
//! once more right after every panel change, so a change is visible on the
//! pass objects before the next frame.

use glam::Vec3;

use crate::assets::{load_assets, AssetError, Assets};
use crate::camera::PerspectiveCamera;
use crate::config::{AppConfig, ConfigError};
use crate::material::WaveMaterial;
use crate::panel::{ControlPanel, PanelError, ParamChange};
use crate::postprocess::PassChain;
use crate::settings::Settings;
use crate::text::{TextLayout, TextNode, DEFAULT_TEXT};
use crate::wave;

/// Errors surfaced while building or driving the app.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Panel(#[from] PanelError),
    #[error(transparent)]
    Gpu(#[from] crate::gpu::GpuError),
}

/// Size of the output surface in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSurface {
    pub width: u32,
    pub height: u32,
}

/// The wavy text scene.
pub struct App {
    settings: Settings,
    panel: ControlPanel,
    camera: PerspectiveCamera,
    surface: OutputSurface,
    passes: PassChain,
    text: Option<TextNode>,
    material: Option<WaveMaterial>,
    content: String,
    layout: TextLayout,
    colors: ([f32; 3], [f32; 3]),
    frames: u64,
    generation: u64,
}

impl App {
    pub fn new(settings: Settings, width: u32, height: u32) -> Self {
        let (width, height) = (width.max(1), height.max(1));
        let mut app = Self {
            camera: PerspectiveCamera::for_viewport(width, height),
            passes: PassChain::new(&settings, width, height),
            settings,
            panel: ControlPanel::default(),
            surface: OutputSurface { width, height },
            text: None,
            material: None,
            content: DEFAULT_TEXT.to_string(),
            layout: TextLayout::default(),
            colors: ([225.0 / 255.0; 3], [0.0; 3]),
            frames: 0,
            generation: 0,
        };
        app.apply_settings();
        app.resize(width, height);
        app
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let colors = config.colors()?;
        let mut app = Self::new(config.settings.clone(), config.width, config.height);
        app.content = config.text.clone();
        app.layout.glyph_detail = config.glyph_detail;
        app.colors = colors;
        Ok(app)
    }

    /// Build an app from `config` and attach the assets it names.
    pub async fn load(config: &AppConfig) -> Result<Self, AppError> {
        let mut app = Self::from_config(config)?;
        let assets = load_assets(&config.font_path, &config.noise_path).await?;
        app.attach_assets(assets);
        Ok(app)
    }

    /// Build the text node and the material from loaded assets.
    ///
    /// Both assets are required up front, so the material is never bound
    /// without its noise texture. Attaching again replaces the previous node.
    pub fn attach_assets(&mut self, assets: Assets) {
        if self.text.is_some() {
            log::warn!("Replacing existing text node");
        }

        let layout = TextLayout {
            font_size: self.settings.font_size,
            line_height: self.settings.line_height,
            ..self.layout.clone()
        };
        let mut text = TextNode::new(self.content.clone(), layout, assets.font);
        text.sync();

        let mut material = WaveMaterial::new(self.colors.0, self.colors.1, assets.noise, &self.settings);
        material.set_resolution(self.surface.width, self.surface.height);

        log::info!(
            "Text ready: {} glyphs, {} vertices",
            text.geometry().glyph_count,
            text.geometry().vertices.len()
        );
        self.text = Some(text);
        self.material = Some(material);
        self.generation += 1;
    }

    /// Set a parameter through the control panel and apply it immediately.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<ParamChange, PanelError> {
        let change = self.panel.set(&mut self.settings, name, value)?;
        log::debug!(
            "{}: {} -> {}",
            change.param.name(),
            change.previous,
            change.value
        );
        if change.changed() {
            self.apply_settings();
        }
        Ok(change)
    }

    /// Push the current settings into every derived object.
    pub fn apply_settings(&mut self) {
        let s = &self.settings;
        self.passes.apply_settings(s);
        self.camera.position = Vec3::from(s.camera_position());
        if let Some(material) = &mut self.material {
            material.apply_settings(s);
        }
        if let Some(text) = &mut self.text {
            text.set_font_size(s.font_size);
            text.set_line_height(s.line_height);
            text.sync();
        }
    }

    /// Per-frame update. Safe to call before any assets are attached.
    pub fn update(&mut self, timestamp_ms: f64) {
        self.apply_settings();
        if let Some(material) = &mut self.material {
            material.set_time_from_timestamp(timestamp_ms);
        }
        self.frames += 1;
    }

    /// Resize the output surface and update the camera projection.
    pub fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.surface = OutputSurface { width, height };
        self.camera.aspect = width as f32 / height as f32;
        self.camera.update_projection_matrix();
        self.passes.set_size(width, height);
        if let Some(material) = &mut self.material {
            material.set_resolution(width, height);
        }
        log::info!("Resized to {}x{}", width, height);
    }

    /// Vertex positions of the text mesh after wave displacement, computed
    /// on the CPU with the current uniforms. `None` until assets are attached.
    pub fn displaced_vertices(&self) -> Option<Vec<[f32; 3]>> {
        let text = self.text.as_ref()?;
        let params = self.material.as_ref()?.wave_params();
        Some(
            text.geometry()
                .vertices
                .iter()
                .map(|v| wave::displace(v.position, v.sweep, &params))
                .collect(),
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable settings; changes take effect on the next [`App::update`].
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn panel(&self) -> &ControlPanel {
        &self.panel
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn surface(&self) -> OutputSurface {
        self.surface
    }

    pub fn passes(&self) -> &PassChain {
        &self.passes
    }

    pub fn passes_mut(&mut self) -> &mut PassChain {
        &mut self.passes
    }

    pub fn text(&self) -> Option<&TextNode> {
        self.text.as_ref()
    }

    pub fn material(&self) -> Option<&WaveMaterial> {
        self.material.as_ref()
    }

    /// Incremented every time assets are attached.
    pub fn asset_generation(&self) -> u64 {
        self.generation
    }

    /// Number of [`App::update`] calls so far.
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_before_assets_is_harmless() {
        let mut app = App::new(Settings::default(), 640, 480);
        app.update(16.0);
        app.update(32.0);
        assert!(app.material().is_none());
        assert!(app.displaced_vertices().is_none());
        assert_eq!(app.frame_count(), 2);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let mut app = App::new(Settings::default(), 640, 480);
        app.resize(0, 0);
        assert_eq!(app.surface(), OutputSurface { width: 1, height: 1 });
        assert_eq!(app.camera().aspect, 1.0);
    }

    #[test]
    fn test_camera_follows_settings() {
        let mut app = App::new(Settings::default(), 640, 480);
        app.set_parameter("camx", 12.34).unwrap();
        assert!((app.camera().position.x - 12.3).abs() < 1e-4);
    }

    #[test]
    fn test_from_config_rejects_bad_colors() {
        let config = AppConfig {
            color_a: "zzz".into(),
            ..Default::default()
        };
        assert!(App::from_config(&config).is_err());
    }
}
