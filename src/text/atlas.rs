//! Glyph coverage atlas.
//!
//! Glyphs are rasterized once at a fixed pixel size and packed into rows
//! ("shelves") of a single-channel texture. Each entry keeps a one-pixel
//! transparent border so that the quad edges sample zero coverage.

use std::collections::BTreeMap;

use super::font::GlyphSource;

/// Pixels per em used when rasterizing glyphs into the atlas.
pub const ATLAS_PX: f32 = 64.0;

const ATLAS_WIDTH: usize = 1024;
const PADDING: usize = 1;

/// Placement of a glyph inside the atlas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtlasEntry {
    /// UV rectangle `[u0, v0, u1, v1]`, v0 at the top of the glyph.
    pub uv: [f32; 4],
    /// Quad extent relative to the pen position, in em units:
    /// `[left, bottom, right, top]`, padding included.
    pub bounds: [f32; 4],
}

/// Single-channel glyph atlas.
#[derive(Debug, Clone)]
pub struct GlyphAtlas {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
    entries: BTreeMap<char, AtlasEntry>,
}

impl GlyphAtlas {
    /// Rasterize every distinct visible character of `text`.
    pub fn build(source: &dyn GlyphSource, text: &str) -> Self {
        let mut chars: Vec<char> = text.chars().filter(|c| !c.is_control()).collect();
        chars.sort_unstable();
        chars.dedup();

        let glyphs: Vec<_> = chars
            .into_iter()
            .map(|ch| (ch, source.rasterize(ch, ATLAS_PX)))
            .filter(|(_, g)| !g.is_empty())
            .collect();

        // Shelf packing: place left to right, wrap to a new row when full.
        let mut placements = Vec::with_capacity(glyphs.len());
        let (mut x, mut y, mut row_height) = (0usize, 0usize, 0usize);
        for (_, glyph) in &glyphs {
            let w = (glyph.width + 2 * PADDING).min(ATLAS_WIDTH);
            let h = glyph.height + 2 * PADDING;
            if x + w > ATLAS_WIDTH {
                x = 0;
                y += row_height;
                row_height = 0;
            }
            placements.push((x, y));
            x += w;
            row_height = row_height.max(h);
        }
        let height = (y + row_height).max(1);

        let mut pixels = vec![0u8; ATLAS_WIDTH * height];
        let mut entries = BTreeMap::new();
        for ((ch, glyph), (px, py)) in glyphs.iter().zip(placements) {
            let copy_width = glyph.width.min(ATLAS_WIDTH - 2 * PADDING);
            for row in 0..glyph.height {
                let src = &glyph.coverage[row * glyph.width..row * glyph.width + copy_width];
                let dst_start = (py + PADDING + row) * ATLAS_WIDTH + px + PADDING;
                pixels[dst_start..dst_start + copy_width].copy_from_slice(src);
            }

            let w = copy_width + 2 * PADDING;
            let h = glyph.height + 2 * PADDING;
            let pad = PADDING as f32;
            let left = (glyph.left as f32 - pad) / ATLAS_PX;
            let bottom = (glyph.bottom as f32 - pad) / ATLAS_PX;
            entries.insert(
                *ch,
                AtlasEntry {
                    uv: [
                        px as f32 / ATLAS_WIDTH as f32,
                        py as f32 / height as f32,
                        (px + w) as f32 / ATLAS_WIDTH as f32,
                        (py + h) as f32 / height as f32,
                    ],
                    bounds: [
                        left,
                        bottom,
                        left + w as f32 / ATLAS_PX,
                        bottom + h as f32 / ATLAS_PX,
                    ],
                },
            );
        }

        log::debug!(
            "Built glyph atlas: {} glyphs, {}x{}",
            entries.len(),
            ATLAS_WIDTH,
            height
        );

        Self {
            width: ATLAS_WIDTH,
            height,
            pixels,
            entries,
        }
    }

    pub fn entry(&self, ch: char) -> Option<&AtlasEntry> {
        self.entries.get(&ch)
    }

    /// Whether every visible character of `text` has an entry.
    pub fn covers(&self, text: &str) -> bool {
        text.chars()
            .filter(|c| !c.is_control() && !c.is_whitespace())
            .all(|c| self.entries.contains_key(&c))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Coverage pixels, row-major, one byte per texel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn glyph_count(&self) -> usize {
        self.entries.len()
    }
}
