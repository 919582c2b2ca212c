//! Text mesh building.
//!
//! A [`TextNode`] lays out a string with a [`GlyphSource`], packs the glyph
//! bitmaps into a [`GlyphAtlas`] and emits one subdivided quad per glyph.
//! Layout changes take effect on the next [`TextNode::sync`].

mod atlas;
mod font;
mod node;

pub use atlas::{AtlasEntry, GlyphAtlas, ATLAS_PX};
pub use font::{FontFace, GlyphSource, LineMetrics, RasterGlyph};
pub use node::{AnchorX, AnchorY, Bounds, TextGeometry, TextLayout, TextNode, TextVertex};

/// Text shown by default: two stanzas of the same five lines.
pub const DEFAULT_TEXT: &str =
    "WHAT\nGOES\nAROUND\nCOMES\nAROUND\nWHAT\nGOES\nAROUND\nCOMES\nAROUND\n";
