//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use wavy_text::text::{GlyphSource, LineMetrics, RasterGlyph};
use wavy_text::{App, AppConfig, Assets, NoiseTexture, Settings};

/// Monospace glyph source: every visible character is a solid square half an
/// em wide, sitting on the baseline. Whitespace rasterizes to nothing.
pub struct BlockGlyphs;

impl GlyphSource for BlockGlyphs {
    fn advance(&self, _ch: char) -> f32 {
        0.5
    }

    fn rasterize(&self, ch: char, px: f32) -> RasterGlyph {
        if ch.is_whitespace() {
            return RasterGlyph::default();
        }
        let size = (px * 0.5) as usize;
        RasterGlyph {
            width: size,
            height: size,
            left: 0,
            bottom: 0,
            coverage: vec![255; size * size],
        }
    }

    fn line_metrics(&self) -> LineMetrics {
        LineMetrics {
            ascent: 0.8,
            descent: -0.2,
        }
    }
}

pub fn block_assets() -> Assets {
    Assets {
        font: Arc::new(BlockGlyphs),
        noise: NoiseTexture::placeholder(64),
    }
}

/// An app showing `text` with `detail` subdivisions per glyph side, assets attached.
pub fn app_with_text(text: &str, detail: u32, width: u32, height: u32) -> App {
    let config = AppConfig {
        width,
        height,
        text: text.to_string(),
        glyph_detail: detail,
        settings: Settings::default(),
        ..Default::default()
    };
    let mut app = App::from_config(&config).expect("default colors parse");
    app.attach_assets(block_assets());
    app
}
