//! Reading TrueType font files
//!
//! `reader` is the bounds-checked byte cursor, `sfnt` the container and
//! fixed-layout tables, `cmap` the character map and `glyf` the outline
//! decoder. [`LoadOptions`] carries the capacity limits shared by decoding and
//! triangulation.

pub mod cmap;
pub mod glyf;
pub mod reader;
pub mod sfnt;

use serde::{Deserialize, Serialize};

pub use glyf::{DecodedGlyph, Outline, SubglyphRef};
pub use sfnt::Tag;

/// Default point capacity of one glyph, generated points included
pub const MAX_GLYPH_POINTS: usize = 2048;

/// Default triangle index capacity of one glyph
pub const MAX_GLYPH_TRI_INDICES: usize = 4096;

/// Point handles are 16 bits wide
pub const POINT_HANDLE_LIMIT: usize = u16::MAX as usize;

/// Limits and switches for [`crate::Font::load`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Point capacity per glyph (decoded plus generated)
    pub max_glyph_points: usize,
    /// Triangle index capacity per glyph
    pub max_glyph_indices: usize,
    /// Triangulate on the rayon thread pool
    pub parallel: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_glyph_points: MAX_GLYPH_POINTS,
            max_glyph_indices: MAX_GLYPH_TRI_INDICES,
            parallel: false,
        }
    }
}

impl LoadOptions {
    /// Point capacity clamped to what a 16-bit handle can address
    pub fn point_capacity(&self) -> usize {
        self.max_glyph_points.min(POINT_HANDLE_LIMIT)
    }
}
