//! Text node: string + layout parameters + synced geometry.

use std::sync::Arc;

use super::atlas::GlyphAtlas;
use super::font::GlyphSource;

/// Vertex data for the text mesh.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextVertex {
    pub position: [f32; 3],
    pub glyph_uv: [f32; 2],
    /// Normalized reading position: 0 at the top of the block, 1 at the bottom.
    pub sweep: f32,
}

/// Horizontal anchor of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorX {
    Left,
    #[default]
    Center,
    Right,
}

/// Vertical anchor of the text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorY {
    Top,
    #[default]
    Middle,
    Bottom,
}

/// Layout parameters. Any change requires [`TextNode::sync`].
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Em size in world units.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height: f32,
    /// Extra advance after each glyph, in em units.
    pub letter_spacing: f32,
    pub anchor_x: AnchorX,
    pub anchor_y: AnchorY,
    /// Subdivisions per glyph quad side. The wave needs interior vertices
    /// to bend a glyph, a plain quad would only move its corners.
    pub glyph_detail: u32,
}

impl Default for TextLayout {
    fn default() -> Self {
        Self {
            font_size: 5.8,
            line_height: 0.72,
            letter_spacing: -0.05,
            anchor_x: AnchorX::Center,
            anchor_y: AnchorY::Middle,
            glyph_detail: 80,
        }
    }
}

/// Axis-aligned 2D bounds of the laid-out text block.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Bounds {
    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }
}

/// Geometry produced by a layout sync.
#[derive(Debug, Clone, Default)]
pub struct TextGeometry {
    pub vertices: Vec<TextVertex>,
    pub indices: Vec<u32>,
    /// Line-box bounds of the whole block (not the ink bounds).
    pub bounds: Bounds,
    pub glyph_count: usize,
}

/// A renderable block of text.
pub struct TextNode {
    text: String,
    layout: TextLayout,
    source: Arc<dyn GlyphSource>,
    atlas: GlyphAtlas,
    atlas_revision: u64,
    geometry: TextGeometry,
    revision: u64,
    dirty: bool,
}

impl TextNode {
    pub fn new(text: impl Into<String>, layout: TextLayout, source: Arc<dyn GlyphSource>) -> Self {
        let text = text.into();
        let atlas = GlyphAtlas::build(source.as_ref(), &text);
        Self {
            text,
            layout,
            source,
            atlas,
            atlas_revision: 1,
            geometry: TextGeometry::default(),
            revision: 0,
            dirty: true,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn layout(&self) -> &TextLayout {
        &self.layout
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.dirty = true;
        }
    }

    pub fn set_font_size(&mut self, font_size: f32) {
        if font_size != self.layout.font_size {
            self.layout.font_size = font_size;
            self.dirty = true;
        }
    }

    pub fn set_line_height(&mut self, line_height: f32) {
        if line_height != self.layout.line_height {
            self.layout.line_height = line_height;
            self.dirty = true;
        }
    }

    pub fn set_layout(&mut self, layout: TextLayout) {
        if layout != self.layout {
            self.layout = layout;
            self.dirty = true;
        }
    }

    /// Whether layout-affecting fields changed since the last sync.
    pub fn needs_sync(&self) -> bool {
        self.dirty
    }

    /// Rebuild geometry if anything changed. Returns whether it rebuilt.
    pub fn sync(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        if !self.atlas.covers(&self.text) {
            self.atlas = GlyphAtlas::build(self.source.as_ref(), &self.text);
            self.atlas_revision += 1;
        }
        self.geometry = build_geometry(&self.text, &self.layout, self.source.as_ref(), &self.atlas);
        self.revision += 1;
        self.dirty = false;
        log::debug!(
            "Synced text geometry: {} glyphs, {} vertices",
            self.geometry.glyph_count,
            self.geometry.vertices.len()
        );
        true
    }

    /// Geometry from the last sync.
    pub fn geometry(&self) -> &TextGeometry {
        &self.geometry
    }

    /// Incremented on every geometry rebuild.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn atlas(&self) -> &GlyphAtlas {
        &self.atlas
    }

    /// Incremented whenever the atlas is rebuilt.
    pub fn atlas_revision(&self) -> u64 {
        self.atlas_revision
    }
}

fn build_geometry(
    text: &str,
    layout: &TextLayout,
    source: &dyn GlyphSource,
    atlas: &GlyphAtlas,
) -> TextGeometry {
    let size = layout.font_size;
    let line_advance = layout.line_height * size;
    let metrics = source.line_metrics();
    let lines: Vec<&str> = text.split('\n').collect();

    let line_widths: Vec<f32> = lines
        .iter()
        .map(|line| {
            let n = line.chars().count();
            if n == 0 {
                return 0.0;
            }
            let advance: f32 = line.chars().map(|c| source.advance(c)).sum();
            (advance + layout.letter_spacing * (n - 1) as f32) * size
        })
        .collect();

    let block_width = line_widths.iter().cloned().fold(0.0f32, f32::max);
    let block_height = lines.len() as f32 * line_advance;

    let left = match layout.anchor_x {
        AnchorX::Left => 0.0,
        AnchorX::Center => -block_width / 2.0,
        AnchorX::Right => -block_width,
    };
    let top = match layout.anchor_y {
        AnchorY::Top => 0.0,
        AnchorY::Middle => block_height / 2.0,
        AnchorY::Bottom => block_height,
    };
    let bounds = Bounds {
        min: [left, top - block_height],
        max: [left + block_width, top],
    };

    // Center the glyph box inside each line box (half-leading).
    let glyph_box = (metrics.ascent - metrics.descent) * size;
    let half_leading = (line_advance - glyph_box) / 2.0;

    let detail = layout.glyph_detail.max(1);
    let mut geometry = TextGeometry {
        bounds,
        ..Default::default()
    };

    for (line_index, line) in lines.iter().enumerate() {
        let baseline = top - line_index as f32 * line_advance - half_leading - metrics.ascent * size;
        let mut pen_x = left;

        for ch in line.chars() {
            if let Some(entry) = atlas.entry(ch) {
                push_glyph_quad(&mut geometry, entry, pen_x, baseline, size, detail);
                geometry.glyph_count += 1;
            }
            pen_x += (source.advance(ch) + layout.letter_spacing) * size;
        }
    }

    geometry
}

fn push_glyph_quad(
    geometry: &mut TextGeometry,
    entry: &super::atlas::AtlasEntry,
    pen_x: f32,
    baseline: f32,
    size: f32,
    detail: u32,
) {
    let [bl, bb, br, bt] = entry.bounds;
    let [u0, v0, u1, v1] = entry.uv;
    let x0 = pen_x + bl * size;
    let x1 = pen_x + br * size;
    let y0 = baseline + bb * size;
    let y1 = baseline + bt * size;

    let top = geometry.bounds.max[1];
    let height = geometry.bounds.height().max(f32::EPSILON);
    let base = geometry.vertices.len() as u32;
    let n = detail + 1;

    for row in 0..n {
        // Row 0 is the top edge of the glyph.
        let t = row as f32 / detail as f32;
        let y = y1 + (y0 - y1) * t;
        let v = v0 + (v1 - v0) * t;
        let sweep = ((top - y) / height).clamp(0.0, 1.0);
        for col in 0..n {
            let s = col as f32 / detail as f32;
            geometry.vertices.push(TextVertex {
                position: [x0 + (x1 - x0) * s, y, 0.0],
                glyph_uv: [u0 + (u1 - u0) * s, v],
                sweep,
            });
        }
    }

    for row in 0..detail {
        for col in 0..detail {
            let i0 = base + row * n + col;
            let i1 = i0 + 1;
            let i2 = i0 + n;
            let i3 = i2 + 1;
            geometry.indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
}
