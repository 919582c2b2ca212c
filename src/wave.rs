//! Wave displacement and shading model.
//!
//! CPU reference for the formulas in `gpu/shaders/wave.wgsl`. The two must
//! stay in sync; the GPU path is what ends up on screen, this one is what the
//! tests pin down.
//!
//! ```text
//! phase = y * freq + time
//! s     = clamp(sweep - offset_y, 0, 1)
//! gate  = smoothstep(clamp((progress * (1 + FEATHER) - s) / FEATHER, 0, 1))
//! z'    = z + sin(phase) * amp * gate
//! ```
//!
//! `sweep` is the vertex's normalized reading position (0 at the top of the
//! text block, 1 at the bottom). With `progress = 0` nothing is displaced,
//! with `progress = 1` every vertex gets the full wave.

use crate::settings::Settings;

/// Converts a frame timestamp in milliseconds into shader time.
pub const TIME_SCALE: f64 = 0.005;

/// Width of the soft edge of the sweep front, in sweep units.
pub const SWEEP_FEATHER: f32 = 0.25;

/// World-space to noise-texture UV scale.
pub const NOISE_SCALE: f32 = 0.15;

/// Weight of the noise sample in the color blend.
const NOISE_WEIGHT: f32 = 0.6;

/// Uniform values consumed by the wave shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub time: f32,
    pub freq: f32,
    pub amp: f32,
    pub progress: f32,
    pub offset_y: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self::from_settings(&Settings::default(), 0.0)
    }
}

impl WaveParams {
    pub fn from_settings(settings: &Settings, timestamp_ms: f64) -> Self {
        Self {
            time: scaled_time(timestamp_ms),
            freq: settings.freq,
            amp: settings.amp,
            progress: settings.progress,
            offset_y: settings.offset_y,
        }
    }

    /// Phase of the wave at vertical coordinate `y`.
    pub fn phase(&self, y: f32) -> f32 {
        y * self.freq + self.time
    }
}

/// Scale a frame timestamp (ms) to shader time.
pub fn scaled_time(timestamp_ms: f64) -> f32 {
    (timestamp_ms * TIME_SCALE) as f32
}

fn smoothstep(x: f32) -> f32 {
    x * x * (3.0 - 2.0 * x)
}

/// Fraction of the full wave applied at a given sweep position.
pub fn sweep_gate(sweep: f32, progress: f32, offset_y: f32) -> f32 {
    let s = (sweep - offset_y).clamp(0.0, 1.0);
    let front = progress * (1.0 + SWEEP_FEATHER);
    smoothstep(((front - s) / SWEEP_FEATHER).clamp(0.0, 1.0))
}

/// Depth offset for a vertex at height `y` and sweep position `sweep`.
pub fn displacement(y: f32, sweep: f32, params: &WaveParams) -> f32 {
    let gate = sweep_gate(sweep, params.progress, params.offset_y);
    params.phase(y).sin() * params.amp * gate
}

/// Displace a vertex along the text's facing axis (z).
pub fn displace(position: [f32; 3], sweep: f32, params: &WaveParams) -> [f32; 3] {
    let [x, y, z] = position;
    [x, y, z + displacement(y, sweep, params)]
}

/// Surface color for a fragment.
///
/// `noise` is the red channel of the noise texture sample (0.0 - 1.0).
pub fn shade(
    color_a: [f32; 3],
    color_b: [f32; 3],
    noise: f32,
    y: f32,
    sweep: f32,
    params: &WaveParams,
) -> [f32; 3] {
    let gate = sweep_gate(sweep, params.progress, params.offset_y);
    let wave01 = 0.5 + 0.5 * params.phase(y).sin();
    let swept = 1.0 + (wave01 - 1.0) * gate;
    let t = (NOISE_WEIGHT * noise + (1.0 - NOISE_WEIGHT) * swept).clamp(0.0, 1.0);
    [
        color_b[0] + (color_a[0] - color_b[0]) * t,
        color_b[1] + (color_a[1] - color_b[1]) * t,
        color_b[2] + (color_a[2] - color_b[2]) * t,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params(progress: f32) -> WaveParams {
        WaveParams {
            time: 5.0,
            freq: 7.7,
            amp: 0.25,
            progress,
            offset_y: 0.0,
        }
    }

    #[test]
    fn test_scaled_time() {
        assert_eq!(scaled_time(0.0), 0.0);
        assert_relative_eq!(scaled_time(1000.0), 5.0);
    }

    #[test]
    fn test_gate_is_monotonic_in_progress() {
        let mut last = 0.0;
        for i in 0..=20 {
            let g = sweep_gate(0.5, i as f32 / 20.0, 0.0);
            assert!(g >= last);
            last = g;
        }
    }

    #[test]
    fn test_gate_front_reaches_top_first() {
        // Partway through the sweep the top of the text is revealed before the bottom.
        let top = sweep_gate(0.0, 0.3, 0.0);
        let bottom = sweep_gate(1.0, 0.3, 0.0);
        assert!(top > bottom);
        assert_eq!(bottom, 0.0);
    }

    #[test]
    fn test_offset_shifts_the_sweep_origin() {
        // With offset_y, everything above the offset behaves like the top line.
        assert_eq!(sweep_gate(0.4, 0.1, 0.5), sweep_gate(0.0, 0.1, 0.0));
    }

    #[test]
    fn test_displace_only_touches_z() {
        let p = displace([1.0, 2.0, 3.0], 0.0, &params(1.0));
        assert_eq!(p[0], 1.0);
        assert_eq!(p[1], 2.0);
        assert_relative_eq!(p[2], 3.0 + (2.0f32 * 7.7 + 5.0).sin() * 0.25, epsilon = 1e-6);
    }

    #[test]
    fn test_shade_stays_between_colors() {
        let a = [0.88, 0.88, 0.88];
        let b = [0.0, 0.0, 0.0];
        for noise in [0.0, 0.3, 1.0] {
            for y in [-2.0, 0.0, 1.3] {
                let c = shade(a, b, noise, y, 0.2, &params(0.5));
                assert!(c[0] >= 0.0 && c[0] <= 0.88 + 1e-6);
            }
        }
    }

    #[test]
    fn test_shade_without_sweep_ignores_wave() {
        let a = [1.0, 1.0, 1.0];
        let b = [0.0, 0.0, 0.0];
        let c1 = shade(a, b, 0.5, 0.0, 0.5, &params(0.0));
        let c2 = shade(a, b, 0.5, 1.0, 0.5, &params(0.0));
        assert_eq!(c1, c2);
        assert_relative_eq!(c1[0], 0.6 * 0.5 + 0.4);
    }
}
