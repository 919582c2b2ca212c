//! Glyph sources.

use std::fmt;

/// A rasterized glyph coverage bitmap.
///
/// `left` and `bottom` place the bitmap relative to the pen position on the
/// baseline, in pixels, y pointing up. Rows are stored top to bottom.
#[derive(Debug, Clone, Default)]
pub struct RasterGlyph {
    pub width: usize,
    pub height: usize,
    pub left: i32,
    pub bottom: i32,
    pub coverage: Vec<u8>,
}

impl RasterGlyph {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Vertical font metrics in em units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMetrics {
    /// Distance from baseline to the top of the tallest glyphs (positive).
    pub ascent: f32,
    /// Distance from baseline to the bottom of descenders (negative).
    pub descent: f32,
}

/// Anything that can measure and rasterize glyphs.
pub trait GlyphSource: Send + Sync {
    /// Horizontal advance of `ch` in em units.
    fn advance(&self, ch: char) -> f32;

    /// Rasterize `ch` at `px` pixels per em.
    fn rasterize(&self, ch: char, px: f32) -> RasterGlyph;

    fn line_metrics(&self) -> LineMetrics;
}

/// A TrueType/OpenType face backed by fontdue.
pub struct FontFace {
    font: fontdue::Font,
}

impl FontFace {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, String> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| e.to_string())?;
        Ok(Self { font })
    }

    pub fn name(&self) -> Option<&str> {
        self.font.name()
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFace")
            .field("name", &self.font.name())
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

impl GlyphSource for FontFace {
    fn advance(&self, ch: char) -> f32 {
        let units = self.font.units_per_em();
        self.font.metrics(ch, units).advance_width / units
    }

    fn rasterize(&self, ch: char, px: f32) -> RasterGlyph {
        let (metrics, coverage) = self.font.rasterize(ch, px);
        RasterGlyph {
            width: metrics.width,
            height: metrics.height,
            left: metrics.xmin,
            bottom: metrics.ymin,
            coverage,
        }
    }

    fn line_metrics(&self) -> LineMetrics {
        let units = self.font.units_per_em();
        match self.font.horizontal_line_metrics(units) {
            Some(m) => LineMetrics {
                ascent: m.ascent / units,
                descent: m.descent / units,
            },
            None => LineMetrics {
                ascent: 0.8,
                descent: -0.2,
            },
        }
    }
}
