//! Wavy Text
//!
//! Multi-line 3D text whose surface ripples with a time-varying wave that
//! sweeps down the block as `progress` goes from 0 to 1, rendered headless
//! with wgpu and post-processed with bloom and film grain.
//!
//! # Features
//!
//! - Font loading and glyph atlas rasterization via fontdue
//! - Subdivided text mesh with anchor, line height and letter spacing
//! - Wave displacement and shading (CPU reference + WGSL)
//! - Control panel with clamped, stepped parameters
//! - GPU rendering via wgpu (Metal on macOS, Vulkan on Linux)
//! - Cancellable frame loop with fixed-step or wall-clock timing

pub mod app;
pub mod assets;
pub mod camera;
pub mod config;
pub mod frame_loop;
pub mod gpu;
pub mod material;
pub mod panel;
pub mod postprocess;
pub mod settings;
pub mod text;
pub mod wave;

// Re-export commonly used types
pub use app::{App, AppError, OutputSurface};
pub use assets::{load_assets, load_font, load_noise_texture, AssetError, Assets, NoiseTexture, WrapMode};
pub use camera::PerspectiveCamera;
pub use config::{parse_hex_color, AppConfig, ConfigError};
pub use frame_loop::{
    CancellationToken, FixedStepClock, FrameClock, FrameLoop, FrameTarget, ResizeHandle, SystemClock,
};
pub use gpu::{GpuContext, GpuError, SceneRenderer};
pub use material::{WaveMaterial, WaveUniforms};
pub use panel::{Control, ControlPanel, PanelError, ParamChange};
pub use postprocess::{BloomPass, FilmPass, PassChain, PassKind, RenderPass};
pub use settings::{ParamId, Settings};
pub use text::{FontFace, GlyphSource, TextLayout, TextNode, DEFAULT_TEXT};
pub use wave::WaveParams;
