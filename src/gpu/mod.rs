//! GPU rendering using wgpu.
//!
//! Headless rendering of the wavy text scene: the text mesh is drawn with the
//! wave shader into an offscreen target, post-processed (bloom, film grain)
//! and read back to the CPU as RGBA8.

pub mod context;
pub mod layouts;
pub mod pipelines;
pub mod postprocess;
pub mod renderer;
pub mod textures;

pub use context::{GpuContext, GpuError};
pub use postprocess::PostProcessPipeline;
pub use renderer::SceneRenderer;
