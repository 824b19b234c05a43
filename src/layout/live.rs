//! Fixed-capacity layout for short, frequently changing strings
//!
//! [`LiveLayout`] keeps its glyph storage inline, so laying out a status
//! line or an input field every frame never touches the heap. Text past the
//! capacity is dropped.

use super::{LayoutOptions, Pen};
use crate::font_source::Font;

pub const DEFAULT_LIVE_CAPACITY: usize = 320;

#[derive(Debug, Clone, Copy, Default)]
struct Entry {
    glyph: u16,
    seq: usize,
    position: [f32; 2],
}

/// Positions of one glyph, borrowed from a [`LiveLayout`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveBatch<'a> {
    pub glyph: u16,
    pub positions: &'a [[f32; 2]],
}

#[derive(Debug, Clone)]
pub struct LiveLayout<const N: usize = DEFAULT_LIVE_CAPACITY> {
    entries: [Entry; N],
    glyphs: [u16; N],
    positions: [[f32; 2]; N],
    len: usize,
    line_count: usize,
    truncated: bool,
}

impl<const N: usize> Default for LiveLayout<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> LiveLayout<N> {
    pub fn new() -> Self {
        Self {
            entries: [Entry::default(); N],
            glyphs: [0; N],
            positions: [[0.0; 2]; N],
            len: 0,
            line_count: 0,
            truncated: false,
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Replace the current layout with one for `codepoints`
    pub fn layout(
        &mut self,
        font: &Font,
        codepoints: impl IntoIterator<Item = u32>,
        options: &LayoutOptions,
    ) {
        self.len = 0;
        self.truncated = false;

        let mut pen = Pen::new(font, options);
        for codepoint in codepoints {
            let Some((glyph, position)) = pen.place(codepoint) else {
                continue;
            };
            if self.len == N {
                self.truncated = true;
                break;
            }
            self.entries[self.len] = Entry {
                glyph,
                seq: self.len,
                position,
            };
            self.len += 1;
        }
        self.line_count = pen.line_count();

        let entries = &mut self.entries[..self.len];
        entries.sort_unstable_by_key(|e| (e.glyph, e.seq));
        for (i, entry) in entries.iter().enumerate() {
            self.glyphs[i] = entry.glyph;
            self.positions[i] = entry.position;
        }
    }

    pub fn layout_str(&mut self, font: &Font, text: &str, options: &LayoutOptions) {
        self.layout(font, text.chars().map(u32::from), options);
    }

    /// Number of placed glyphs
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// Whether the last layout ran out of capacity
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// One batch per distinct glyph, ascending by glyph index
    pub fn batches(&self) -> impl Iterator<Item = LiveBatch<'_>> + '_ {
        let glyphs = &self.glyphs[..self.len];
        let mut start = 0;
        std::iter::from_fn(move || {
            let glyph = *glyphs.get(start)?;
            let run = glyphs[start..].iter().take_while(|&&g| g == glyph).count();
            let batch = LiveBatch {
                glyph,
                positions: &self.positions[start..start + run],
            };
            start += run;
            Some(batch)
        })
    }
}
