//! Wave shader material: the named uniform slots and the noise texture.

use glam::Mat4;

use crate::assets::NoiseTexture;
use crate::settings::Settings;
use crate::wave::{scaled_time, WaveParams, NOISE_SCALE, SWEEP_FEATHER};

/// GPU layout of the wave uniforms. Must match `WaveUniforms` in `wave.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct WaveUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub color_a: [f32; 4], // rgb + unused alpha (vec4 for alignment)
    pub color_b: [f32; 4],
    pub resolution: [f32; 4],
    pub time: f32,
    pub progress: f32,
    pub freq: f32,
    pub amp: f32,
    pub offset_y: f32,
    pub noise_scale: f32,
    pub feather: f32,
    pub _padding: f32,
}

/// Shader material for the text mesh.
#[derive(Debug, Clone)]
pub struct WaveMaterial {
    pub time: f32,
    pub color_a: [f32; 3],
    pub color_b: [f32; 3],
    pub progress: f32,
    pub freq: f32,
    pub amp: f32,
    pub offset_y: f32,
    /// `(width, height, 1, 1)`.
    pub resolution: [f32; 4],
    /// Both faces of the mesh are shaded identically.
    pub double_sided: bool,
    noise: NoiseTexture,
}

impl WaveMaterial {
    pub fn new(color_a: [f32; 3], color_b: [f32; 3], noise: NoiseTexture, settings: &Settings) -> Self {
        let mut material = Self {
            time: 0.0,
            color_a,
            color_b,
            progress: 0.0,
            freq: 0.0,
            amp: 0.0,
            offset_y: 0.0,
            resolution: [1.0, 1.0, 1.0, 1.0],
            double_sided: true,
            noise,
        };
        material.apply_settings(settings);
        material
    }

    /// Copy the wave parameters from settings.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.progress = settings.progress;
        self.freq = settings.freq;
        self.amp = settings.amp;
        self.offset_y = settings.offset_y;
    }

    pub fn set_time_from_timestamp(&mut self, timestamp_ms: f64) {
        self.time = scaled_time(timestamp_ms);
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32, 1.0, 1.0];
    }

    pub fn noise(&self) -> &NoiseTexture {
        &self.noise
    }

    pub fn wave_params(&self) -> WaveParams {
        WaveParams {
            time: self.time,
            freq: self.freq,
            amp: self.amp,
            progress: self.progress,
            offset_y: self.offset_y,
        }
    }

    pub fn to_uniforms(&self, view_proj: Mat4) -> WaveUniforms {
        WaveUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            color_a: [self.color_a[0], self.color_a[1], self.color_a[2], 1.0],
            color_b: [self.color_b[0], self.color_b[1], self.color_b[2], 1.0],
            resolution: self.resolution,
            time: self.time,
            progress: self.progress,
            freq: self.freq,
            amp: self.amp,
            offset_y: self.offset_y,
            noise_scale: NOISE_SCALE,
            feather: SWEEP_FEATHER,
            _padding: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_size_matches_wgsl_layout() {
        // mat4 + 3 * vec4 + 8 scalars
        assert_eq!(std::mem::size_of::<WaveUniforms>(), 64 + 48 + 32);
    }

    #[test]
    fn test_material_tracks_settings() {
        let mut settings = Settings::default();
        let mut material =
            WaveMaterial::new([1.0; 3], [0.0; 3], NoiseTexture::placeholder(4), &settings);
        assert_eq!(material.freq, 7.7);

        settings.amp = 0.9;
        settings.offset_y = 0.4;
        material.apply_settings(&settings);
        let p = material.wave_params();
        assert_eq!(p.amp, 0.9);
        assert_eq!(p.offset_y, 0.4);
    }

    #[test]
    fn test_time_is_scaled() {
        let mut material = WaveMaterial::new(
            [1.0; 3],
            [0.0; 3],
            NoiseTexture::placeholder(4),
            &Settings::default(),
        );
        material.set_time_from_timestamp(2000.0);
        assert_eq!(material.to_uniforms(Mat4::IDENTITY).time, 10.0);
    }
}
