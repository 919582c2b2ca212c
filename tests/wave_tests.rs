//! Integration tests for the wave displacement model.

use std::f32::consts::PI;

use approx::assert_relative_eq;
use wavy_text::wave::{displacement, scaled_time, sweep_gate, WaveParams};
use wavy_text::Settings;

fn params(progress: f32, amp: f32) -> WaveParams {
    WaveParams {
        time: 5.0,
        freq: 7.7,
        amp,
        progress,
        offset_y: 0.0,
    }
}

#[test]
fn test_displacement_is_periodic_in_y() {
    let p = params(1.0, 0.25);
    let period = 2.0 * PI / p.freq;
    for y in [-3.0f32, -0.7, 0.0, 0.4, 2.5] {
        assert_relative_eq!(
            displacement(y, 0.5, &p),
            displacement(y + period, 0.5, &p),
            epsilon = 1e-4
        );
    }
}

#[test]
fn test_zero_amplitude_never_displaces() {
    let p = params(1.0, 0.0);
    for i in 0..50 {
        let y = i as f32 * 0.13 - 3.0;
        assert_eq!(displacement(y, i as f32 / 50.0, &p), 0.0);
    }
}

#[test]
fn test_zero_progress_applies_no_sweep() {
    for i in 0..=10 {
        let sweep = i as f32 / 10.0;
        assert_eq!(sweep_gate(sweep, 0.0, 0.0), 0.0);
        assert_eq!(displacement(1.0, sweep, &params(0.0, 0.25)), 0.0);
    }
}

#[test]
fn test_full_progress_applies_full_sweep() {
    let p = params(1.0, 0.25);
    for i in 0..=10 {
        let sweep = i as f32 / 10.0;
        assert_eq!(sweep_gate(sweep, 1.0, 0.0), 1.0);
        assert_relative_eq!(
            displacement(1.0, sweep, &p),
            (1.0f32 * 7.7 + 5.0).sin() * 0.25,
            epsilon = 1e-6
        );
    }
}

#[test]
fn test_amplitude_bounds_displacement() {
    let p = params(0.6, 0.4);
    for i in 0..200 {
        let y = i as f32 * 0.05 - 5.0;
        assert!(displacement(y, 0.3, &p).abs() <= 0.4 + 1e-6);
    }
}

#[test]
fn test_params_from_settings() {
    let p = WaveParams::from_settings(&Settings::default(), 1000.0);
    assert_relative_eq!(p.time, 5.0);
    assert_eq!(p.freq, 7.7);
    assert_eq!(p.amp, 0.25);
    assert_eq!(p.progress, 0.2);
    assert_relative_eq!(scaled_time(16.0), 0.08, epsilon = 1e-7);
}
