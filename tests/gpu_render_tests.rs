//! GPU rendering integration tests. Each test skips when no adapter is available.

mod common;

use common::app_with_text;
use wavy_text::frame_loop::{CancellationToken, FixedStepClock, FrameLoop};
use wavy_text::{App, SceneRenderer, Settings};

async fn renderer(width: u32, height: u32) -> Option<SceneRenderer> {
    match SceneRenderer::new(width, height).await {
        Ok(r) => Some(r),
        Err(e) => {
            eprintln!("Skipping test - GPU not available: {}", e);
            None
        }
    }
}

fn lit_pixels(pixels: &[u8]) -> usize {
    pixels.chunks(4).filter(|p| p[0] > 16 || p[1] > 16 || p[2] > 16).count()
}

#[tokio::test]
async fn test_text_is_visible() {
    let Some(mut renderer) = renderer(320, 180).await else {
        return;
    };

    let mut app = app_with_text("AB", 4, 320, 180);
    app.passes_mut().film.enabled = false;
    app.update(1000.0);

    let pixels = renderer.render(&app).unwrap();
    assert_eq!(pixels.len(), 320 * 180 * 4);
    assert!(lit_pixels(&pixels) > 0, "expected some text pixels");
}

#[tokio::test]
async fn test_frame_is_deterministic_without_grain() {
    let Some(mut renderer) = renderer(160, 90).await else {
        return;
    };

    let mut app = app_with_text("WAVE", 8, 160, 90);
    app.passes_mut().film.enabled = false;
    app.update(1000.0);

    let first = renderer.render(&app).unwrap();
    let second = renderer.render(&app).unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_renderer_follows_app_resize() {
    let Some(mut renderer) = renderer(320, 180).await else {
        return;
    };

    let mut app = App::new(Settings::default(), 320, 180);
    app.resize(64, 48);
    app.update(0.0);
    let pixels = renderer.render(&app).unwrap();
    assert_eq!(renderer.size(), (64, 48));
    assert_eq!(pixels.len(), 64 * 48 * 4);
}

#[tokio::test]
async fn test_frame_loop_draws_into_renderer() {
    let Some(mut renderer) = renderer(96, 54).await else {
        return;
    };

    let mut app = app_with_text("A", 2, 96, 54);
    let mut frame_loop =
        FrameLoop::new(FixedStepClock::at_fps(30), CancellationToken::new()).with_frame_limit(3);
    let frames = frame_loop.run(&mut app, &mut renderer).unwrap();

    assert_eq!(frames, 3);
    assert_eq!(renderer.last_frame().map(|f| f.len()), Some(96 * 54 * 4));
}
