//! The loaded font
//!
//! [`Font::from_bytes`] runs the whole pipeline: table directory, fixed
//! tables, character map, outline decoding and triangulation. A font either
//! loads completely or not at all.

use std::path::Path;

use kurbo::Affine;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::glyph::{Glyph, GlyphInstance, GlyphMesh};
use super::merge::{MergeTotals, MergedBuffers};
use super::metrics::{FontMetrics, HorizontalMetrics};
use crate::core::errors::{FileContext, FontResult};
use crate::data::CodepointTrie;
use crate::io::cmap::read_cmap;
use crate::io::glyf::GlyfDecoder;
use crate::io::sfnt::{
    self, font_offset, read_hmtx, HeadTable, HheaTable, MaxpTable, TableDirectory, Tag,
};
use crate::io::{DecodedGlyph, LoadOptions};
use crate::triangulate::triangulate_all;

/// Composite glyphs nested deeper than this are not expanded
pub const MAX_COMPOSITE_DEPTH: usize = 8;

/// A TrueType font turned into triangle meshes
#[derive(Debug, Clone)]
pub struct Font {
    glyphs: Vec<Option<Glyph>>,
    merged: Option<MergedBuffers>,
    trie: CodepointTrie,
    metrics: FontMetrics,
    h_metrics: HorizontalMetrics,
    checksum_mismatches: usize,
}

/// Glyph and mesh counts of a loaded font
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FontStats {
    pub num_glyphs: usize,
    pub simple_glyphs: usize,
    pub composite_glyphs: usize,
    pub empty_glyphs: usize,
    pub total_points: usize,
    pub generated_points: usize,
    pub total_curve_indices: usize,
    pub total_solid_indices: usize,
    pub max_points: usize,
    pub max_curve_indices: usize,
    pub max_solid_indices: usize,
    pub trie_nodes: usize,
    pub trie_slots: usize,
    pub checksum_mismatches: usize,
}

fn table_data<'a>(directory: &TableDirectory, data: &'a [u8], tag: Tag) -> FontResult<&'a [u8]> {
    directory.require(tag)?.data(data)
}

impl Font {
    /// Read and load a font file
    pub fn load(path: impl AsRef<Path>, options: &LoadOptions) -> FontResult<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).with_file_context(path)?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Self::from_bytes(&data, options)
    }

    /// Load a font from the contents of a `.ttf` or `.ttc` file
    pub fn from_bytes(data: &[u8], options: &LoadOptions) -> FontResult<Self> {
        let offset = font_offset(data)?;
        let directory = TableDirectory::read(data, offset)?;
        directory.check_required()?;
        let checksum_mismatches = directory.verify_checksums(data);

        let head = HeadTable::read(table_data(&directory, data, sfnt::HEAD)?)?;
        let maxp = MaxpTable::read(table_data(&directory, data, sfnt::MAXP)?)?;
        let hhea = HheaTable::read(table_data(&directory, data, sfnt::HHEA)?)?;
        let num_glyphs = maxp.num_glyphs as usize;

        let h_metrics = read_hmtx(
            table_data(&directory, data, sfnt::HMTX)?,
            num_glyphs,
            hhea.number_of_h_metrics as usize,
        )?;
        let trie = read_cmap(table_data(&directory, data, sfnt::CMAP)?)?;

        let decoder = GlyfDecoder::new(
            table_data(&directory, data, sfnt::LOCA)?,
            table_data(&directory, data, sfnt::GLYF)?,
            head.long_loca(),
            maxp.num_glyphs,
            head.units_per_em,
            options.point_capacity(),
        );
        let decoded = decoder.decode_all()?;
        let meshes = triangulate_all(&decoded, options)?;

        let mut glyphs = Vec::new();
        glyphs.try_reserve_exact(num_glyphs)?;
        glyphs.extend(
            decoded
                .into_iter()
                .zip(meshes)
                .map(|(decoded, mesh)| match (decoded, mesh) {
                    (Some(DecodedGlyph::Composite(components)), _) => {
                        Some(Glyph::Composite(components))
                    }
                    (_, Some(mesh)) => Some(Glyph::Simple(mesh)),
                    _ => None,
                }),
        );

        let font = Self {
            glyphs,
            merged: None,
            trie,
            metrics: FontMetrics::from_tables(&head, &hhea),
            h_metrics: HorizontalMetrics::new(h_metrics),
            checksum_mismatches,
        };
        info!(
            "Loaded font: {} glyphs, {} units per em",
            font.num_glyphs(),
            head.units_per_em
        );
        Ok(font)
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    pub fn units_per_em(&self) -> u16 {
        self.metrics.units_per_em
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    pub fn h_metrics(&self) -> &HorizontalMetrics {
        &self.h_metrics
    }

    pub fn trie(&self) -> &CodepointTrie {
        &self.trie
    }

    /// Glyph table slot; `None` for a glyph without outline or out of range
    pub fn glyph(&self, index: u16) -> Option<&Glyph> {
        self.glyphs.get(index as usize)?.as_ref()
    }

    pub fn glyphs(&self) -> &[Option<Glyph>] {
        &self.glyphs
    }

    /// Glyph index of `codepoint`; 0 when unmapped or out of range
    pub fn lookup(&self, codepoint: u32) -> u16 {
        let glyph = self.trie.get(codepoint);
        if glyph as usize >= self.num_glyphs() {
            0
        } else {
            glyph as u16
        }
    }

    pub fn is_merged(&self) -> bool {
        self.merged.is_some()
    }

    pub fn merged(&self) -> Option<&MergedBuffers> {
        self.merged.as_ref()
    }

    /// Move every glyph mesh into shared buffers. A second call does nothing.
    pub fn merge_glyph_data(&mut self) -> FontResult<()> {
        self.merge_glyph_data_with(MergedBuffers::reserve)
    }

    pub(crate) fn merge_glyph_data_with<R>(&mut self, reserve: R) -> FontResult<()>
    where
        R: FnOnce(&mut MergedBuffers, &MergeTotals) -> FontResult<()>,
    {
        if self.merged.is_some() {
            return Ok(());
        }
        self.merged = Some(MergedBuffers::merge_with(&mut self.glyphs, reserve)?);
        Ok(())
    }

    /// Mesh of a simple glyph, from whichever storage currently holds it
    pub fn glyph_mesh(&self, index: u16) -> Option<GlyphMesh<'_>> {
        if let Some(merged) = &self.merged {
            return merged.mesh(index);
        }
        match self.glyph(index)? {
            Glyph::Simple(mesh) => Some(GlyphMesh {
                points: &mesh.points,
                flags: &mesh.flags,
                indices: &mesh.indices,
                num_indices_curve: mesh.num_indices_curve,
                num_points_orig: mesh.num_points_orig,
                base_vertex: 0,
            }),
            Glyph::Composite(_) => None,
        }
    }

    /// Flatten a glyph into the simple glyphs it draws
    ///
    /// Composite references are followed up to [`MAX_COMPOSITE_DEPTH`] levels.
    /// Deeper nesting and reference cycles are skipped with a warning.
    pub fn resolve_glyph(&self, index: u16) -> Vec<GlyphInstance> {
        let mut instances = Vec::new();
        let mut path = Vec::new();
        self.resolve_into(index, Affine::IDENTITY, &mut path, &mut instances);
        instances
    }

    fn resolve_into(
        &self,
        index: u16,
        transform: Affine,
        path: &mut Vec<u16>,
        out: &mut Vec<GlyphInstance>,
    ) {
        let components = match self.glyph(index) {
            None => return,
            Some(Glyph::Simple(_)) => {
                out.push(GlyphInstance {
                    glyph_index: index,
                    transform,
                });
                return;
            }
            Some(Glyph::Composite(components)) => components,
        };

        if path.contains(&index) {
            warn!("Composite glyph {index} references itself, skipping");
            return;
        }
        if path.len() >= MAX_COMPOSITE_DEPTH {
            warn!("Composite glyph {index} nested deeper than {MAX_COMPOSITE_DEPTH}, skipping");
            return;
        }

        path.push(index);
        for component in components {
            self.resolve_into(
                component.glyph_index,
                transform * component.transform(),
                path,
                out,
            );
        }
        path.pop();
    }

    pub fn checksum_mismatches(&self) -> usize {
        self.checksum_mismatches
    }

    pub fn stats(&self) -> FontStats {
        let mut stats = FontStats {
            num_glyphs: self.num_glyphs(),
            trie_nodes: self.trie.node_count(),
            trie_slots: self.trie.allocated_len(),
            checksum_mismatches: self.checksum_mismatches,
            ..Default::default()
        };

        for (index, glyph) in self.glyphs.iter().enumerate() {
            match glyph {
                None => stats.empty_glyphs += 1,
                Some(Glyph::Composite(_)) => stats.composite_glyphs += 1,
                Some(Glyph::Simple(_)) => {
                    stats.simple_glyphs += 1;
                    let Some(mesh) = self.glyph_mesh(index as u16) else {
                        continue;
                    };
                    let (points, curve, solid) = (
                        mesh.points.len(),
                        mesh.curve_indices().len(),
                        mesh.solid_indices().len(),
                    );
                    stats.total_points += points;
                    stats.generated_points += points - mesh.num_points_orig;
                    stats.total_curve_indices += curve;
                    stats.total_solid_indices += solid;
                    stats.max_points = stats.max_points.max(points);
                    stats.max_curve_indices = stats.max_curve_indices.max(curve);
                    stats.max_solid_indices = stats.max_solid_indices.max(solid);
                }
            }
        }
        stats
    }
}
