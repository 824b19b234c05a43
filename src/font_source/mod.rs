//! Font model
//!
//! This module ties the table readers and the triangulator together into a
//! [`Font`]: the glyph table, the merged GPU buffers, metrics and the
//! codepoint map.

pub mod font;
pub mod glyph;
pub mod merge;
pub mod metrics;

// Explicit re-exports for public API
pub use font::{Font, FontStats, MAX_COMPOSITE_DEPTH};
pub use glyph::{Glyph, GlyphInstance, GlyphMesh, GlyphTriangles};
pub use merge::{GlyphRecord, MergedBuffers};
pub use metrics::{FontMetrics, HorizontalMetrics};
