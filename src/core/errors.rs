//! Error types for font loading and glyph triangulation
//!
//! Every parsing and triangulation step returns one of these. A font either
//! loads completely or is rejected with one of the variants below; there is
//! no partial-font mode.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::io::sfnt::Tag;

/// Result alias used throughout the loading pipeline
pub type FontResult<T> = Result<T, FontError>;

/// Why a font file was rejected
#[derive(Debug, Error)]
pub enum FontError {
    /// The file could not be opened or read
    #[error("failed to open font file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A read ran past the end of the file or of a table
    #[error("unexpected end of file")]
    UnexpectedEof,

    /// The first four bytes are neither an sfnt version nor `ttcf`
    #[error("unsupported file identifier {0:#010x}")]
    UnsupportedFormat(u32),

    /// A table carries a version this reader does not understand
    #[error("unsupported {table} version {version:#010x}")]
    UnsupportedVersion { table: Tag, version: u32 },

    /// Malformed data: bad magic, bad ordering, inconsistent counts
    #[error("corrupt font data: {0}")]
    Corrupt(&'static str),

    /// A required table (or a usable cmap subtable) is missing
    #[error("font is missing required data: {0}")]
    Incomplete(String),

    /// A buffer could not be allocated
    #[error("memory allocation failed")]
    Alloc,

    /// A glyph does not fit in a fixed-capacity buffer
    #[error("glyph needs {needed} points but the limit is {limit}")]
    BufferLimit { needed: usize, limit: usize },

    /// A glyph outline could not be triangulated
    #[error("failed to triangulate glyph {glyph}: {source}")]
    Triangulate {
        glyph: u32,
        #[source]
        source: TriangulateError,
    },
}

/// Why a single glyph outline could not be turned into triangles
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriangulateError {
    /// The point arena is exhausted (generated points included)
    #[error("too many points")]
    PointsLimit,

    /// The triangle index buffer is full
    #[error("too many triangle indices")]
    IndicesLimit,

    /// A buffer could not be allocated
    #[error("memory allocation failed")]
    Alloc,

    /// A contour ends before it starts
    #[error("contour {contour} is empty")]
    EmptyContour { contour: usize },

    /// A contour consists only of off-curve points
    #[error("contour {contour} has no on-curve point")]
    NoOnCurvePoint { contour: usize },

    /// The polygon tessellation backend failed
    #[error("tessellation failed: {0}")]
    Tessellation(String),
}

/// Attach a file path to I/O errors, so `Open` always names the file
pub trait FileContext<T> {
    fn with_file_context(self, path: &Path) -> FontResult<T>;
}

impl<T> FileContext<T> for std::io::Result<T> {
    fn with_file_context(self, path: &Path) -> FontResult<T> {
        self.map_err(|source| FontError::Open {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl From<std::collections::TryReserveError> for FontError {
    fn from(_: std::collections::TryReserveError) -> Self {
        FontError::Alloc
    }
}

impl From<crate::data::TrieError> for FontError {
    fn from(_: crate::data::TrieError) -> Self {
        FontError::Alloc
    }
}

impl From<std::collections::TryReserveError> for TriangulateError {
    fn from(_: std::collections::TryReserveError) -> Self {
        TriangulateError::Alloc
    }
}
