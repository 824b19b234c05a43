//! Glyph meshes and composite references

use kurbo::Affine;
use serde::Serialize;

use crate::geometry::point::EmPoint;
use crate::io::SubglyphRef;

/// Triangulated simple glyph
///
/// `indices` holds the curve triangles first and the solid triangles after
/// them. Indices are local to this glyph's `points`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GlyphTriangles {
    pub points: Vec<EmPoint>,
    /// One word per point, see [`crate::io::glyf::point_flags`]
    pub flags: Vec<u32>,
    pub indices: Vec<u16>,
    /// Points decoded from the font; the rest were generated
    pub num_points_orig: usize,
    pub num_indices_curve: usize,
}

impl GlyphTriangles {
    pub fn num_points_total(&self) -> usize {
        self.points.len()
    }

    pub fn num_indices_total(&self) -> usize {
        self.indices.len()
    }

    pub fn num_indices_solid(&self) -> usize {
        self.indices.len() - self.num_indices_curve
    }

    pub fn curve_indices(&self) -> &[u16] {
        &self.indices[..self.num_indices_curve]
    }

    pub fn solid_indices(&self) -> &[u16] {
        &self.indices[self.num_indices_curve..]
    }

    /// Move the buffers out, leaving an empty mesh behind
    pub(crate) fn take_buffers(&mut self) -> (Vec<EmPoint>, Vec<u32>, Vec<u16>) {
        let mesh = std::mem::take(self);
        (mesh.points, mesh.flags, mesh.indices)
    }
}

/// One slot of the glyph table
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    Simple(GlyphTriangles),
    Composite(Vec<SubglyphRef>),
}

impl Glyph {
    pub fn is_simple(&self) -> bool {
        matches!(self, Glyph::Simple(_))
    }

    pub fn is_composite(&self) -> bool {
        matches!(self, Glyph::Composite(_))
    }
}

/// Borrowed mesh of one simple glyph
///
/// Before merging this points into the glyph's own buffers with a zero
/// `base_vertex`; afterwards into the merged buffers, where `base_vertex` is
/// the glyph's first point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphMesh<'a> {
    pub points: &'a [EmPoint],
    pub flags: &'a [u32],
    pub indices: &'a [u16],
    pub num_indices_curve: usize,
    pub num_points_orig: usize,
    pub base_vertex: u32,
}

impl<'a> GlyphMesh<'a> {
    pub fn curve_indices(&self) -> &'a [u16] {
        &self.indices[..self.num_indices_curve]
    }

    pub fn solid_indices(&self) -> &'a [u16] {
        &self.indices[self.num_indices_curve..]
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

/// A simple glyph placed by a composite, with the accumulated transform
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GlyphInstance {
    pub glyph_index: u16,
    pub transform: Affine,
}
