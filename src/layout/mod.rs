//! Text layout
//!
//! Turns a sequence of codepoints into glyph positions and groups them by
//! glyph, so that every distinct glyph can be drawn with one instanced call.
//! Positions are em units relative to the first baseline; later lines move
//! down by the font's line height.

pub mod live;

use serde::{Deserialize, Serialize};

use crate::font_source::Font;

pub use live::{LiveBatch, LiveLayout, DEFAULT_LIVE_CAPACITY};

/// Line breaking and spacing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Glyphs per line before wrapping; `None` or 0 never wraps
    pub max_line_len: Option<usize>,
    /// Multiplier on ascender - descender + line gap
    pub line_height_scale: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            max_line_len: None,
            line_height_scale: 1.0,
        }
    }
}

/// Every position of one glyph in a laid-out text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphBatch {
    pub glyph: u16,
    pub positions: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextLayout {
    /// Ascending by glyph index
    pub batches: Vec<GlyphBatch>,
    pub line_count: usize,
}

impl TextLayout {
    pub fn num_glyphs(&self) -> usize {
        self.batches.iter().map(|b| b.positions.len()).sum()
    }
}

/// Pen that walks codepoints and yields glyph placements
pub(crate) struct Pen<'a> {
    font: &'a Font,
    max_line_len: Option<usize>,
    line_height: f32,
    units_per_em: f32,
    x: i64,
    line: usize,
    on_line: usize,
    started: bool,
}

impl<'a> Pen<'a> {
    pub(crate) fn new(font: &'a Font, options: &LayoutOptions) -> Self {
        let metrics = font.metrics();
        Self {
            font,
            max_line_len: options.max_line_len.filter(|&n| n > 0),
            line_height: metrics.line_height_em() * options.line_height_scale,
            units_per_em: metrics.units_per_em.max(1) as f32,
            x: 0,
            line: 0,
            on_line: 0,
            started: false,
        }
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.x = 0;
        self.on_line = 0;
    }

    /// Glyph and position for `codepoint`; `None` for a line break
    pub(crate) fn place(&mut self, codepoint: u32) -> Option<(u16, [f32; 2])> {
        self.started = true;
        if codepoint == '\n' as u32 {
            self.new_line();
            return None;
        }
        if self.max_line_len.is_some_and(|n| self.on_line >= n) {
            self.new_line();
        }

        let glyph = self.font.lookup(codepoint);
        let metric = self.font.h_metrics().get(glyph);
        let position = [
            (self.x - i64::from(metric.lsb)) as f32 / self.units_per_em,
            -(self.line as f32) * self.line_height,
        ];
        self.x += i64::from(metric.advance_width);
        self.on_line += 1;
        Some((glyph, position))
    }

    pub(crate) fn line_count(&self) -> usize {
        if self.started {
            self.line + 1
        } else {
            0
        }
    }
}

/// Lay out `codepoints` and batch the result by glyph
pub fn layout_text(
    font: &Font,
    codepoints: impl IntoIterator<Item = u32>,
    options: &LayoutOptions,
) -> TextLayout {
    let mut pen = Pen::new(font, options);
    let mut placed: Vec<(u16, [f32; 2])> = codepoints
        .into_iter()
        .filter_map(|c| pen.place(c))
        .collect();
    placed.sort_by_key(|&(glyph, _)| glyph);

    let mut batches: Vec<GlyphBatch> = Vec::new();
    for (glyph, position) in placed {
        match batches.last_mut() {
            Some(batch) if batch.glyph == glyph => batch.positions.push(position),
            _ => batches.push(GlyphBatch {
                glyph,
                positions: vec![position],
            }),
        }
    }

    TextLayout {
        batches,
        line_count: pen.line_count(),
    }
}

/// [`layout_text`] over the characters of a string
pub fn layout_str(font: &Font, text: &str, options: &LayoutOptions) -> TextLayout {
    layout_text(font, text.chars().map(u32::from), options)
}
