//! Stroke-built label meshes
//!
//! Face numbers and the coin's H / T marks are drawn as flat strokes rather
//! than text, so they can sit on the cube and coin faces as ordinary meshes.

use bevy::asset::RenderAssetUsages;
use bevy::mesh::{Indices, PrimitiveTopology};
use bevy::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

const STROKE_WIDTH: f32 = 0.12;
const GLYPH_DEPTH: f32 = 0.02;
const GLYPH_WIDTH: f32 = 0.6;
const GLYPH_SPACING: f32 = 0.1;
const ARC_SEGMENTS: u32 = 8;

/// Half height and half width of the glyph box.
const H: f32 = 0.5;
const W: f32 = 0.35;

/// One pen movement of a glyph, in glyph-local units.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Stroke {
    Line(f32, f32, f32, f32),
    /// Centre, radius, start and end angle in radians.
    Arc(f32, f32, f32, f32, f32),
}

use Stroke::{Arc, Line};

/// Strokes for a supported character. Unsupported characters draw an open box.
fn glyph_strokes(c: char) -> Vec<Stroke> {
    match c {
        '0' => vec![
            Arc(0.0, H * 0.45, W * 0.6, 0.0, PI),
            Line(-W * 0.6, H * 0.45, -W * 0.6, -H * 0.45),
            Arc(0.0, -H * 0.45, W * 0.6, PI, TAU),
            Line(W * 0.6, -H * 0.45, W * 0.6, H * 0.45),
        ],
        '1' => vec![Line(0.0, H, 0.0, -H), Line(-W * 0.35, H * 0.65, 0.0, H)],
        '2' => vec![
            Arc(0.0, H * 0.5, W * 0.5, PI, -FRAC_PI_2 * 0.5),
            Line(W * 0.35, H * 0.15, -W * 0.6, -H),
            Line(-W * 0.6, -H, W * 0.6, -H),
        ],
        '3' => vec![
            Arc(0.0, H * 0.5, W * 0.5, PI, -FRAC_PI_2),
            Arc(0.0, -H * 0.5, W * 0.5, FRAC_PI_2, -PI),
        ],
        '4' => vec![
            Line(W * 0.3, H, -W * 0.6, -H * 0.2),
            Line(-W * 0.6, -H * 0.2, W * 0.6, -H * 0.2),
            Line(W * 0.3, H, W * 0.3, -H),
        ],
        '5' => vec![
            Line(W * 0.5, H, -W * 0.5, H),
            Line(-W * 0.5, H, -W * 0.5, 0.0),
            Line(-W * 0.5, 0.0, W * 0.05, 0.0),
            Arc(W * 0.05, -H * 0.5, W * 0.5, FRAC_PI_2, -PI * 0.8),
        ],
        '6' => vec![
            Arc(0.0, H * 0.3, W * 0.5, PI * 0.2, PI),
            Line(-W * 0.5, H * 0.3, -W * 0.5, -H * 0.45),
            Arc(0.0, -H * 0.45, W * 0.5, 0.0, TAU),
        ],
        '7' => vec![Line(-W * 0.5, H, W * 0.5, H), Line(W * 0.5, H, -W * 0.2, -H)],
        '8' => vec![
            Arc(0.0, H * 0.5, W * 0.4, 0.0, TAU),
            Arc(0.0, -H * 0.45, W * 0.5, 0.0, TAU),
        ],
        '9' => vec![
            Arc(0.0, H * 0.45, W * 0.5, 0.0, TAU),
            Line(W * 0.5, H * 0.45, W * 0.5, -H * 0.3),
            Arc(0.0, -H * 0.3, W * 0.5, 0.0, -PI * 0.8),
        ],
        'H' => vec![
            Line(-W * 0.6, H, -W * 0.6, -H),
            Line(W * 0.6, H, W * 0.6, -H),
            Line(-W * 0.6, 0.0, W * 0.6, 0.0),
        ],
        'T' => vec![Line(-W * 0.7, H, W * 0.7, H), Line(0.0, H, 0.0, -H)],
        _ => vec![
            Line(-W * 0.5, H, W * 0.5, H),
            Line(W * 0.5, H, W * 0.5, -H),
            Line(W * 0.5, -H, -W * 0.5, -H),
            Line(-W * 0.5, -H, -W * 0.5, H),
        ],
    }
}

/// Raw triangle data for a label.
#[derive(Debug, Default, Clone)]
pub struct LabelGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl LabelGeometry {
    /// Add one straight stroke as a thin slab: a front quad facing +Z and a
    /// back quad facing -Z.
    fn push_segment(&mut self, offset_x: f32, x1: f32, y1: f32, x2: f32, y2: f32) {
        let (dx, dy) = (x2 - x1, y2 - y1);
        let len = (dx * dx + dy * dy).sqrt();
        if len < 0.001 {
            return;
        }
        let px = -dy / len * STROKE_WIDTH / 2.0;
        let py = dx / len * STROKE_WIDTH / 2.0;
        let z = GLYPH_DEPTH / 2.0;

        let front = [
            [offset_x + x1 - px, y1 - py, z],
            [offset_x + x1 + px, y1 + py, z],
            [offset_x + x2 + px, y2 + py, z],
            [offset_x + x2 - px, y2 - py, z],
        ];
        self.push_quad(front, [0.0, 0.0, 1.0]);

        let back = [
            [offset_x + x1 + px, y1 + py, -z],
            [offset_x + x1 - px, y1 - py, -z],
            [offset_x + x2 - px, y2 - py, -z],
            [offset_x + x2 + px, y2 + py, -z],
        ];
        self.push_quad(back, [0.0, 0.0, -1.0]);
    }

    fn push_quad(&mut self, corners: [[f32; 3]; 4], normal: [f32; 3]) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&corners);
        self.normals.extend_from_slice(&[normal; 4]);
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    fn push_stroke(&mut self, offset_x: f32, stroke: Stroke) {
        match stroke {
            Line(x1, y1, x2, y2) => self.push_segment(offset_x, x1, y1, x2, y2),
            Arc(cx, cy, r, start, end) => {
                let point = |t: f32| {
                    let a = start + (end - start) * t;
                    (cx + r * a.cos(), cy + r * a.sin())
                };
                for i in 0..ARC_SEGMENTS {
                    let (x1, y1) = point(i as f32 / ARC_SEGMENTS as f32);
                    let (x2, y2) = point((i + 1) as f32 / ARC_SEGMENTS as f32);
                    self.push_segment(offset_x, x1, y1, x2, y2);
                }
            }
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Horizontal extent of the drawn strokes.
    pub fn x_bounds(&self) -> Option<(f32, f32)> {
        self.positions.iter().fold(None, |acc, p| match acc {
            None => Some((p[0], p[0])),
            Some((lo, hi)) => Some((lo.min(p[0]), hi.max(p[0]))),
        })
    }
}

/// Lay out a short label left to right, centred on the origin.
pub fn label_geometry(text: &str) -> LabelGeometry {
    let glyphs: Vec<char> = text.chars().filter(|c| !c.is_whitespace()).collect();
    let mut geometry = LabelGeometry::default();
    if glyphs.is_empty() {
        return geometry;
    }

    let count = glyphs.len() as f32;
    let total_width = count * GLYPH_WIDTH + (count - 1.0) * GLYPH_SPACING;
    let start_x = -total_width / 2.0 + GLYPH_WIDTH / 2.0;

    for (i, c) in glyphs.into_iter().enumerate() {
        let offset_x = start_x + i as f32 * (GLYPH_WIDTH + GLYPH_SPACING);
        for stroke in glyph_strokes(c) {
            geometry.push_stroke(offset_x, stroke);
        }
    }
    geometry
}

/// Uniform scale that keeps a label of `chars` glyphs inside a face of the
/// given width.
pub fn label_scale(chars: usize, face_width: f32) -> f32 {
    let count = chars.max(1) as f32;
    let total_width = count * GLYPH_WIDTH + (count - 1.0) * GLYPH_SPACING;
    (face_width * 0.7 / total_width).min(face_width * 0.6)
}

pub fn label_mesh(text: &str) -> Mesh {
    let geometry = label_geometry(text);
    let uvs: Vec<[f32; 2]> = geometry.positions.iter().map(|_| [0.5, 0.5]).collect();

    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, geometry.positions)
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, geometry.normals)
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
    .with_inserted_indices(Indices::U32(geometry.indices))
}
