//! Font metrics and measurement data
//!
//! Global line metrics come from `head` and `hhea`, per-glyph advance widths
//! and side bearings from `hmtx`. Everything is stored in font units; the
//! `*_em` helpers divide by units-per-em.

use serde::Serialize;

use crate::io::sfnt::{HeadTable, HheaTable, LongHorMetric};

/// Font-wide metrics for spacing and line placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
}

impl FontMetrics {
    pub fn from_tables(head: &HeadTable, hhea: &HheaTable) -> Self {
        Self {
            units_per_em: head.units_per_em,
            ascender: hhea.ascender,
            descender: hhea.descender,
            line_gap: hhea.line_gap,
            advance_width_max: hhea.advance_width_max,
        }
    }

    /// Baseline-to-baseline distance in font units
    pub fn line_height(&self) -> i32 {
        self.ascender as i32 - self.descender as i32 + self.line_gap as i32
    }

    /// Baseline-to-baseline distance in em units
    pub fn line_height_em(&self) -> f32 {
        self.line_height() as f32 / self.upm()
    }

    pub fn ascender_em(&self) -> f32 {
        self.ascender as f32 / self.upm()
    }

    pub fn descender_em(&self) -> f32 {
        self.descender as f32 / self.upm()
    }

    /// Convert a font-unit distance to em units
    pub fn to_em(&self, units: f32) -> f32 {
        units / self.upm()
    }

    fn upm(&self) -> f32 {
        // head parsing rejects zero
        self.units_per_em.max(1) as f32
    }
}

/// Advance width and left side bearing of every glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HorizontalMetrics {
    entries: Vec<LongHorMetric>,
}

impl HorizontalMetrics {
    pub fn new(entries: Vec<LongHorMetric>) -> Self {
        Self { entries }
    }

    /// Metrics of `glyph`; zero for an index past the table
    pub fn get(&self, glyph: u16) -> LongHorMetric {
        self.entries
            .get(glyph as usize)
            .copied()
            .unwrap_or_default()
    }

    pub fn advance_width(&self, glyph: u16) -> u16 {
        self.get(glyph).advance_width
    }

    pub fn lsb(&self, glyph: u16) -> i16 {
        self.get(glyph).lsb
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
