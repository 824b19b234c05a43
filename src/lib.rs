//! gpufont
//!
//! Loads TrueType fonts and turns every glyph outline into triangle meshes
//! for analytic quadratic-curve rendering on the GPU, then lays out text as
//! per-glyph instance batches.
pub mod core;
pub mod data;
pub mod font_source;
pub mod geometry;
pub mod io;
pub mod layout;
pub mod logging;
#[cfg(test)]
pub(crate) mod test_utils;
pub mod triangulate;

pub use crate::core::errors::{FontError, FontResult, TriangulateError};
pub use crate::font_source::{
    Font, FontMetrics, FontStats, Glyph, GlyphInstance, GlyphMesh, GlyphRecord, GlyphTriangles,
    MergedBuffers,
};
pub use crate::io::LoadOptions;
pub use crate::layout::{layout_str, layout_text, LayoutOptions, LiveLayout, TextLayout};
pub use crate::triangulate::{triangulate_all, Triangulator};
