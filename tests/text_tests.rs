//! Integration tests for text layout and geometry sync.

mod common;

use std::sync::Arc;

use approx::assert_relative_eq;
use common::BlockGlyphs;
use wavy_text::text::{AnchorX, AnchorY, TextLayout, TextNode, DEFAULT_TEXT};

fn node(text: &str, detail: u32) -> TextNode {
    let layout = TextLayout {
        glyph_detail: detail,
        ..Default::default()
    };
    let mut node = TextNode::new(text, layout, Arc::new(BlockGlyphs));
    node.sync();
    node
}

// ==================== Geometry ====================

#[test]
fn test_vertex_and_index_counts() {
    let node = node("AB\nC", 4);
    let geometry = node.geometry();
    assert_eq!(geometry.glyph_count, 3);
    assert_eq!(geometry.vertices.len(), 3 * 5 * 5);
    assert_eq!(geometry.indices.len(), 3 * 4 * 4 * 6);
    let max = *geometry.indices.iter().max().unwrap() as usize;
    assert!(max < geometry.vertices.len());
}

#[test]
fn test_whitespace_has_no_quads_but_advances_pen() {
    let tight = node("AB", 1);
    let spaced = node("A B", 1);
    assert_eq!(spaced.geometry().glyph_count, 2);

    // The last glyph moves right by one advance when a space is inserted,
    // while centering shifts the whole block left by half of that.
    let last_x = |n: &TextNode| n.geometry().vertices.last().unwrap().position[0];
    let advance = (0.5 - 0.05) * 5.8;
    assert_relative_eq!(last_x(&spaced) - last_x(&tight), advance / 2.0, epsilon = 1e-4);
}

#[test]
fn test_block_is_centered() {
    let node = node("AB\nCD", 2);
    let b = node.geometry().bounds;
    assert_relative_eq!(b.min[0], -b.max[0], epsilon = 1e-5);
    assert_relative_eq!(b.min[1], -b.max[1], epsilon = 1e-5);
    assert_relative_eq!(b.height(), 2.0 * 0.72 * 5.8, epsilon = 1e-4);
}

#[test]
fn test_trailing_newline_adds_empty_line() {
    let with = node("A\n", 1);
    let without = node("A", 1);
    assert_relative_eq!(
        with.geometry().bounds.height(),
        2.0 * without.geometry().bounds.height(),
        epsilon = 1e-4
    );
    assert_eq!(with.geometry().glyph_count, 1);
}

#[test]
fn test_left_top_anchor() {
    let layout = TextLayout {
        anchor_x: AnchorX::Left,
        anchor_y: AnchorY::Top,
        glyph_detail: 1,
        ..Default::default()
    };
    let mut node = TextNode::new("ABC", layout, Arc::new(BlockGlyphs));
    node.sync();
    let b = node.geometry().bounds;
    assert_eq!(b.min[0], 0.0);
    assert_eq!(b.max[1], 0.0);
}

#[test]
fn test_sweep_runs_top_to_bottom() {
    let node = node("A\nB\nC", 2);
    let vertices = &node.geometry().vertices;
    for v in vertices {
        assert!((0.0..=1.0).contains(&v.sweep));
    }
    let first = vertices.first().unwrap();
    let last = vertices.last().unwrap();
    assert!(first.position[1] > last.position[1]);
    assert!(first.sweep < last.sweep);
}

#[test]
fn test_default_text_glyph_count() {
    let node = node(DEFAULT_TEXT, 1);
    let visible = DEFAULT_TEXT.chars().filter(|c| !c.is_whitespace()).count();
    assert_eq!(node.geometry().glyph_count, visible);
}

// ==================== Sync ====================

#[test]
fn test_sync_only_when_dirty() {
    let mut node = node("AB", 1);
    let revision = node.revision();
    assert!(!node.sync());
    assert_eq!(node.revision(), revision);

    node.set_font_size(5.8);
    assert!(!node.needs_sync());

    node.set_font_size(2.0);
    assert!(node.needs_sync());
    assert!(node.sync());
    assert_eq!(node.revision(), revision + 1);
}

#[test]
fn test_line_height_change_rebuilds_geometry() {
    let mut node = node("A\nB", 1);
    let before = node.geometry().bounds.height();
    node.set_line_height(0.5);
    node.sync();
    let after = node.geometry().bounds.height();
    assert_relative_eq!(after / before, 0.5 / 0.72, epsilon = 1e-4);
}

#[test]
fn test_new_characters_rebuild_atlas() {
    let mut node = node("AB", 1);
    let atlas_revision = node.atlas_revision();

    node.set_text("BA");
    node.sync();
    assert_eq!(node.atlas_revision(), atlas_revision);

    node.set_text("XYZ");
    node.sync();
    assert_eq!(node.atlas_revision(), atlas_revision + 1);
    assert_eq!(node.geometry().glyph_count, 3);
}
