//! Post-processing pass chain.
//!
//! The pass objects own their tunables; the GPU side
//! ([`crate::gpu::PostProcessPipeline`]) reads them every frame. Passes always
//! run in the order scene render, bloom, film grain.

use crate::settings::Settings;

/// Renders the 3D scene into the first target of the chain.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub clear_color: [f32; 3],
}

impl Default for RenderPass {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0],
        }
    }
}

/// Bright-pass bloom: extract, blur, add back.
#[derive(Debug, Clone, PartialEq)]
pub struct BloomPass {
    pub enabled: bool,
    /// Amount of bloom added back onto the scene.
    pub strength: f32,
    /// Blur spread. 0.0 keeps the glow tight around bright areas.
    pub radius: f32,
    /// Luminance above which pixels contribute to bloom.
    pub threshold: f32,
    pub resolution: (u32, u32),
}

impl BloomPass {
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.strength = settings.bloom_strength;
        self.radius = settings.bloom_radius;
        self.threshold = settings.bloom_threshold;
    }
}

/// Animated film grain.
#[derive(Debug, Clone, PartialEq)]
pub struct FilmPass {
    pub enabled: bool,
    pub noise_intensity: f32,
    pub grayscale: bool,
}

impl FilmPass {
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.noise_intensity = settings.noise_amount;
    }
}

/// Identifies a pass in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Render,
    Bloom,
    Film,
}

/// The ordered pass chain.
#[derive(Debug, Clone, PartialEq)]
pub struct PassChain {
    pub render: RenderPass,
    pub bloom: BloomPass,
    pub film: FilmPass,
}

impl PassChain {
    pub fn new(settings: &Settings, width: u32, height: u32) -> Self {
        let mut chain = Self {
            render: RenderPass::default(),
            bloom: BloomPass {
                enabled: true,
                strength: 0.0,
                radius: 0.0,
                threshold: 0.0,
                resolution: (width, height),
            },
            film: FilmPass {
                enabled: true,
                noise_intensity: 0.0,
                grayscale: false,
            },
        };
        chain.apply_settings(settings);
        chain
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.bloom.apply_settings(settings);
        self.film.apply_settings(settings);
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.bloom.resolution = (width, height);
    }

    /// Enabled passes, in execution order.
    pub fn passes(&self) -> Vec<PassKind> {
        let mut passes = vec![PassKind::Render];
        if self.bloom.enabled {
            passes.push(PassKind::Bloom);
        }
        if self.film.enabled {
            passes.push(PassKind::Film);
        }
        passes
    }
}
