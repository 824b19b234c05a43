//! `cmap` table: character to glyph mapping
//!
//! Only format 4 (segment mapping to delta values) is understood. The first
//! format 4 subtable in encoding-record order is loaded into a
//! [`CodepointTrie`]; all other subtables are skipped.

use tracing::{debug, warn};

use super::reader::{read_u16_at, Cursor};
use super::sfnt::CMAP;
use crate::core::errors::{FontError, FontResult};
use crate::data::CodepointTrie;

/// Outcome of parsing one format 4 subtable
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Format4Summary {
    pub segments: usize,
    /// Codepoints covered by all segments
    pub covered: usize,
    /// Codepoints that resolved to a glyph and were stored
    pub mapped: usize,
}

/// Parse `cmap` into a codepoint trie
pub fn read_cmap(table: &[u8]) -> FontResult<CodepointTrie> {
    let mut c = Cursor::new(table);
    let version = c.read_u16()?;
    if version != 0 {
        return Err(FontError::UnsupportedVersion {
            table: CMAP,
            version: version as u32,
        });
    }
    let num_tables = c.read_u16()?;

    for _ in 0..num_tables {
        let platform_id = c.read_u16()?;
        let encoding_id = c.read_u16()?;
        let offset = c.read_u32()? as usize;

        let format = Cursor::at(table, offset)?.read_u16()?;
        debug!("cmap subtable platform {platform_id} encoding {encoding_id} format {format} at {offset:#x}");

        if format == 4 {
            let mut trie = CodepointTrie::new();
            let summary = read_format4(&table[offset..], &mut trie)?;
            debug!(
                "cmap format 4: {} segments, {}/{} codepoints mapped, {} trie nodes",
                summary.segments,
                summary.mapped,
                summary.covered,
                trie.node_count()
            );
            return Ok(trie);
        }
    }

    Err(FontError::Incomplete(
        "no format 4 cmap subtable".to_string(),
    ))
}

/// Load one format 4 subtable (starting at its format field) into `trie`
pub fn read_format4(subtable: &[u8], trie: &mut CodepointTrie) -> FontResult<Format4Summary> {
    let mut c = Cursor::new(subtable);
    c.skip(2)?;
    let length = c.read_u16()? as usize;
    let subtable = &subtable[..length.min(subtable.len())];
    let mut c = Cursor::at(subtable, 6)?;

    let seg_count = (c.read_u16()? / 2) as usize;
    // searchRange, entrySelector, rangeShift
    c.skip(6)?;
    let end_codes = c.read_u16_array(seg_count)?;
    c.skip(2)?;
    let start_codes = c.read_u16_array(seg_count)?;
    let id_deltas = c.read_u16_array(seg_count)?;
    let id_range_offsets_at = c.position();
    let id_range_offsets = c.read_u16_array(seg_count)?;

    let mut summary = Format4Summary {
        segments: seg_count,
        ..Default::default()
    };

    for s in 0..seg_count {
        let (start, end) = (start_codes[s], end_codes[s]);
        let (delta, range_offset) = (id_deltas[s], id_range_offsets[s]);
        if start > end {
            return Err(FontError::Corrupt("cmap segment starts after it ends"));
        }
        summary.covered += (end - start) as usize + 1;

        for code in start..=end {
            let glyph = if range_offset == 0 {
                delta.wrapping_add(code)
            } else {
                // Relative to this segment's own idRangeOffset entry
                let word = s + range_offset as usize / 2 + (code - start) as usize;
                let Some(value) = read_u16_at(subtable, id_range_offsets_at + 2 * word) else {
                    continue;
                };
                if value == 0 {
                    continue;
                }
                value.wrapping_add(delta)
            };

            trie.set(code as u32, glyph as u32)?;
            summary.mapped += 1;
        }
    }

    if summary.mapped == 0 && seg_count > 0 {
        warn!("cmap format 4 subtable maps no codepoints");
    }
    Ok(summary)
}
