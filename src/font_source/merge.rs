//! Merging per-glyph meshes into shared buffers
//!
//! After triangulation every simple glyph owns three small vectors. Merging
//! moves them into one point, one flag and one index buffer, with a
//! [`GlyphRecord`] per glyph telling where its data starts. The merged
//! buffers are what gets uploaded to the GPU.

use bytemuck::{Pod, Zeroable};
use tracing::debug;

use super::glyph::{Glyph, GlyphMesh};
use crate::core::errors::{FontError, FontResult};
use crate::geometry::point::EmPoint;

/// Where one simple glyph lives inside [`MergedBuffers`]
///
/// Indices stay local to the glyph: `first_point` is the base vertex to add
/// when drawing.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable, serde::Serialize)]
pub struct GlyphRecord {
    pub glyph_index: u32,
    pub first_point: u32,
    pub num_points: u32,
    pub num_points_orig: u32,
    pub first_index: u32,
    pub num_indices_curve: u32,
    pub num_indices_solid: u32,
}

impl GlyphRecord {
    pub fn num_indices(&self) -> u32 {
        self.num_indices_curve + self.num_indices_solid
    }
}

/// Element counts the merged buffers need
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MergeTotals {
    pub points: usize,
    pub indices: usize,
    pub records: usize,
}

/// Contiguous mesh data of every simple glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedBuffers {
    pub points: Vec<EmPoint>,
    pub flags: Vec<u32>,
    pub indices: Vec<u16>,
    /// Sorted by glyph index
    pub records: Vec<GlyphRecord>,
}

impl MergedBuffers {
    /// Move the buffers of every simple glyph in `glyphs` into one set of
    /// arrays.
    ///
    /// All storage is reserved up front. If that fails nothing has been
    /// touched and the glyphs keep their own buffers.
    pub fn merge(glyphs: &mut [Option<Glyph>]) -> FontResult<Self> {
        Self::merge_with(glyphs, Self::reserve)
    }

    pub(crate) fn reserve(&mut self, totals: &MergeTotals) -> FontResult<()> {
        self.points.try_reserve_exact(totals.points)?;
        self.flags.try_reserve_exact(totals.points)?;
        self.indices.try_reserve_exact(totals.indices)?;
        self.records.try_reserve_exact(totals.records)?;
        Ok(())
    }

    /// [`MergedBuffers::merge`] with a custom reservation step
    pub(crate) fn merge_with<R>(glyphs: &mut [Option<Glyph>], reserve: R) -> FontResult<Self>
    where
        R: FnOnce(&mut Self, &MergeTotals) -> FontResult<()>,
    {
        let mut totals = MergeTotals::default();
        for glyph in glyphs.iter() {
            if let Some(Glyph::Simple(mesh)) = glyph {
                totals.points += mesh.points.len();
                totals.indices += mesh.indices.len();
                totals.records += 1;
            }
        }
        if totals.points > u32::MAX as usize || totals.indices > u32::MAX as usize {
            return Err(FontError::Alloc);
        }

        let mut merged = Self::default();
        reserve(&mut merged, &totals)?;

        for (index, glyph) in glyphs.iter_mut().enumerate() {
            let Some(Glyph::Simple(mesh)) = glyph else {
                continue;
            };
            let record = GlyphRecord {
                glyph_index: index as u32,
                first_point: merged.points.len() as u32,
                num_points: mesh.points.len() as u32,
                num_points_orig: mesh.num_points_orig as u32,
                first_index: merged.indices.len() as u32,
                num_indices_curve: mesh.num_indices_curve as u32,
                num_indices_solid: mesh.num_indices_solid() as u32,
            };
            let (points, flags, indices) = mesh.take_buffers();
            merged.points.extend(points);
            merged.flags.extend(flags);
            merged.indices.extend(indices);
            merged.records.push(record);
        }

        debug!(
            "Merged {} glyphs: {} points, {} indices",
            merged.records.len(),
            merged.points.len(),
            merged.indices.len()
        );
        Ok(merged)
    }

    pub fn record(&self, glyph: u16) -> Option<&GlyphRecord> {
        self.records
            .binary_search_by_key(&(glyph as u32), |r| r.glyph_index)
            .ok()
            .map(|i| &self.records[i])
    }

    /// View of one glyph inside the merged buffers
    pub fn mesh(&self, glyph: u16) -> Option<GlyphMesh<'_>> {
        let record = self.record(glyph)?;
        let first_point = record.first_point as usize;
        let first_index = record.first_index as usize;
        let points = first_point..first_point + record.num_points as usize;
        let indices = first_index..first_index + record.num_indices() as usize;
        Some(GlyphMesh {
            points: &self.points[points.clone()],
            flags: &self.flags[points],
            indices: &self.indices[indices],
            num_indices_curve: record.num_indices_curve as usize,
            num_points_orig: record.num_points_orig as usize,
            base_vertex: record.first_point,
        })
    }

    pub fn point_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.points)
    }

    pub fn flag_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.flags)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    pub fn record_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.records)
    }
}
