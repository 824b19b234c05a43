//! sfnt container: table directory and the fixed-layout tables
//!
//! Parses the offset table (optionally behind a TrueType Collection header),
//! the table records, and the small fixed-size tables the loader needs:
//! `head`, `maxp`, `hhea` and `hmtx`.

use std::fmt::{Debug, Display, Formatter};

use tracing::debug;

use super::reader::Cursor;
use crate::core::errors::{FontError, FontResult};

/// A four byte table tag
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag([u8; 4]);

impl Tag {
    pub const fn new(src: &[u8; 4]) -> Self {
        Tag(*src)
    }

    pub const fn from_be_bytes(bytes: [u8; 4]) -> Self {
        Tag(bytes)
    }

    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    pub const fn to_be_bytes(self) -> [u8; 4] {
        self.0
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            if (0x20..=0x7E).contains(&byte) {
                write!(f, "{}", byte as char)?;
            } else {
                write!(f, "{{0x{byte:02X}}}")?;
            }
        }
        Ok(())
    }
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tag({self})")
    }
}

pub const HEAD: Tag = Tag::new(b"head");
pub const MAXP: Tag = Tag::new(b"maxp");
pub const LOCA: Tag = Tag::new(b"loca");
pub const GLYF: Tag = Tag::new(b"glyf");
pub const CMAP: Tag = Tag::new(b"cmap");
pub const HHEA: Tag = Tag::new(b"hhea");
pub const HMTX: Tag = Tag::new(b"hmtx");
pub const TTCF: Tag = Tag::new(b"ttcf");

/// Tables the loader cannot work without
pub const REQUIRED_TABLES: [Tag; 7] = [HEAD, MAXP, LOCA, GLYF, CMAP, HHEA, HMTX];

/// sfnt version of a TrueType-outline font
pub const SFNT_VERSION_TRUETYPE: u32 = 0x0001_0000;

const HEAD_MAGIC: u32 = 0x5F0F_3CF5;

/// Offset of the start of the font's offset table.
///
/// Plain fonts start at 0. For a TrueType Collection the first member font is
/// used; the others are ignored.
pub fn font_offset(data: &[u8]) -> FontResult<usize> {
    let mut cursor = Cursor::new(data);
    let ident = cursor.read_u32()?;

    if ident == SFNT_VERSION_TRUETYPE {
        return Ok(0);
    }
    if ident != TTCF.to_u32() {
        return Err(FontError::UnsupportedFormat(ident));
    }

    let version = cursor.read_u32()?;
    if version != 0x0001_0000 && version != 0x0002_0000 {
        return Err(FontError::UnsupportedVersion {
            table: TTCF,
            version,
        });
    }
    let num_fonts = cursor.read_u32()?;
    if num_fonts == 0 {
        return Err(FontError::Incomplete(
            "font collection contains no fonts".to_string(),
        ));
    }
    let first = cursor.read_u32()? as usize;
    debug!("Font collection with {num_fonts} fonts, using the first at {first:#x}");

    let nested = Cursor::at(data, first)?.read_u32()?;
    if nested != SFNT_VERSION_TRUETYPE {
        return Err(FontError::UnsupportedFormat(nested));
    }
    Ok(first)
}

/// One entry of the table directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl TableRecord {
    /// The table's bytes; fails if the record points outside the file
    pub fn data<'a>(&self, file: &'a [u8]) -> FontResult<&'a [u8]> {
        let start = self.offset as usize;
        let end = start
            .checked_add(self.length as usize)
            .ok_or(FontError::UnexpectedEof)?;
        file.get(start..end).ok_or(FontError::UnexpectedEof)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TableDirectory {
    pub records: Vec<TableRecord>,
}

impl TableDirectory {
    /// Read the offset table starting at `offset` (the sfnt version field)
    pub fn read(data: &[u8], offset: usize) -> FontResult<Self> {
        let mut cursor = Cursor::at(data, offset)?;
        cursor.skip(4)?;
        let num_tables = cursor.read_u16()?;
        // searchRange, entrySelector, rangeShift
        cursor.skip(6)?;

        let mut records = Vec::new();
        records.try_reserve_exact(num_tables as usize)?;
        for _ in 0..num_tables {
            records.push(TableRecord {
                tag: cursor.read_tag()?,
                checksum: cursor.read_u32()?,
                offset: cursor.read_u32()?,
                length: cursor.read_u32()?,
            });
        }

        debug!("Table directory: {} tables", records.len());
        Ok(Self { records })
    }

    pub fn find(&self, tag: Tag) -> Option<&TableRecord> {
        self.records.iter().find(|record| record.tag == tag)
    }

    /// Record for a table that must be present
    pub fn require(&self, tag: Tag) -> FontResult<&TableRecord> {
        self.find(tag)
            .ok_or_else(|| FontError::Incomplete(format!("missing required table '{tag}'")))
    }

    /// Fail with `Incomplete` unless every required table is listed
    pub fn check_required(&self) -> FontResult<()> {
        for tag in REQUIRED_TABLES {
            self.require(tag)?;
        }
        Ok(())
    }

    /// Compare stored checksums against the table contents.
    ///
    /// Mismatches are only reported at debug level; they never reject a font.
    /// Returns the number of mismatching tables.
    pub fn verify_checksums(&self, data: &[u8]) -> usize {
        let mut mismatches = 0;
        for record in &self.records {
            let Ok(table) = record.data(data) else {
                continue;
            };
            let actual = table_checksum(table, record.tag == HEAD);
            if actual != record.checksum {
                debug!(
                    "Checksum mismatch in '{}': stored {:#010x}, computed {:#010x}",
                    record.tag, record.checksum, actual
                );
                mismatches += 1;
            }
        }
        mismatches
    }
}

/// Sum of big-endian words, zero padded. The `head` checksum skips the
/// `checksumAdjustment` field.
pub fn table_checksum(table: &[u8], is_head: bool) -> u32 {
    table
        .chunks(4)
        .enumerate()
        .map(|(i, chunk)| {
            if is_head && i == 2 {
                return 0;
            }
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_be_bytes(word)
        })
        .fold(0u32, u32::wrapping_add)
}

/// `head` table (54 bytes)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadTable {
    pub version: u32,
    pub font_revision: u32,
    pub checksum_adjustment: u32,
    pub magic: u32,
    pub flags: u16,
    pub units_per_em: u16,
    pub created: i64,
    pub modified: i64,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub mac_style: u16,
    pub lowest_rec_ppem: u16,
    pub font_direction_hint: i16,
    pub index_to_loc_format: i16,
    pub glyph_data_format: i16,
}

impl HeadTable {
    pub fn read(table: &[u8]) -> FontResult<Self> {
        let mut c = Cursor::new(table);
        let head = Self {
            version: c.read_u32()?,
            font_revision: c.read_u32()?,
            checksum_adjustment: c.read_u32()?,
            magic: c.read_u32()?,
            flags: c.read_u16()?,
            units_per_em: c.read_u16()?,
            created: c.read_i64()?,
            modified: c.read_i64()?,
            x_min: c.read_i16()?,
            y_min: c.read_i16()?,
            x_max: c.read_i16()?,
            y_max: c.read_i16()?,
            mac_style: c.read_u16()?,
            lowest_rec_ppem: c.read_u16()?,
            font_direction_hint: c.read_i16()?,
            index_to_loc_format: c.read_i16()?,
            glyph_data_format: c.read_i16()?,
        };

        if head.magic != HEAD_MAGIC {
            return Err(FontError::Corrupt("bad head magic number"));
        }
        if head.units_per_em == 0 {
            return Err(FontError::Corrupt("units per em is zero"));
        }
        Ok(head)
    }

    /// `true` when `loca` holds 32-bit offsets
    pub fn long_loca(&self) -> bool {
        self.index_to_loc_format != 0
    }
}

/// Extra `maxp` fields present in version 1.0
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxpLimits {
    pub max_points: u16,
    pub max_contours: u16,
    pub max_composite_points: u16,
    pub max_composite_contours: u16,
    pub max_component_elements: u16,
    pub max_component_depth: u16,
}

/// `maxp` table, version 0.5 (6 bytes) or 1.0 (32 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxpTable {
    pub version: u32,
    pub num_glyphs: u16,
    pub limits: Option<MaxpLimits>,
}

impl MaxpTable {
    pub fn read(table: &[u8]) -> FontResult<Self> {
        let mut c = Cursor::new(table);
        let version = c.read_u32()?;
        let num_glyphs = c.read_u16()?;

        let limits = match version {
            0x0000_5000 => None,
            0x0001_0000 => {
                let max_points = c.read_u16()?;
                let max_contours = c.read_u16()?;
                let max_composite_points = c.read_u16()?;
                let max_composite_contours = c.read_u16()?;
                // zones, twilight points, storage, function defs,
                // instruction defs, stack elements, instruction size
                c.skip(14)?;
                let max_component_elements = c.read_u16()?;
                let max_component_depth = c.read_u16()?;
                Some(MaxpLimits {
                    max_points,
                    max_contours,
                    max_composite_points,
                    max_composite_contours,
                    max_component_elements,
                    max_component_depth,
                })
            }
            version => {
                return Err(FontError::UnsupportedVersion {
                    table: MAXP,
                    version,
                })
            }
        };

        Ok(Self {
            version,
            num_glyphs,
            limits,
        })
    }
}

/// `hhea` table (36 bytes)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HheaTable {
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub advance_width_max: u16,
    pub number_of_h_metrics: u16,
}

impl HheaTable {
    pub fn read(table: &[u8]) -> FontResult<Self> {
        let mut c = Cursor::new(table);
        let version = c.read_u32()?;
        let ascender = c.read_i16()?;
        let descender = c.read_i16()?;
        let line_gap = c.read_i16()?;
        let advance_width_max = c.read_u16()?;
        // min lsb, min rsb, x max extent, caret rise/run/offset, 4 reserved
        c.skip(20)?;
        let metric_data_format = c.read_i16()?;
        let number_of_h_metrics = c.read_u16()?;

        if version != 0x0001_0000 {
            return Err(FontError::UnsupportedVersion {
                table: HHEA,
                version,
            });
        }
        if metric_data_format != 0 {
            return Err(FontError::UnsupportedVersion {
                table: HHEA,
                version: metric_data_format as u16 as u32,
            });
        }

        Ok(Self {
            ascender,
            descender,
            line_gap,
            advance_width_max,
            number_of_h_metrics,
        })
    }
}

/// One glyph's horizontal metrics, in font units
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LongHorMetric {
    pub advance_width: u16,
    pub lsb: i16,
}

/// Read `hmtx` into one entry per glyph.
///
/// Glyphs past `num_h_metrics` repeat the last advance width and take their
/// side bearing from the trailing lsb array.
pub fn read_hmtx(
    table: &[u8],
    num_glyphs: usize,
    num_h_metrics: usize,
) -> FontResult<Vec<LongHorMetric>> {
    if num_glyphs == 0 {
        return Ok(Vec::new());
    }
    if num_h_metrics == 0 {
        return Err(FontError::Corrupt("hmtx has no long metrics"));
    }

    let mut c = Cursor::new(table);
    let mut metrics = Vec::new();
    metrics.try_reserve_exact(num_glyphs.max(num_h_metrics))?;

    for _ in 0..num_h_metrics {
        metrics.push(LongHorMetric {
            advance_width: c.read_u16()?,
            lsb: c.read_i16()?,
        });
    }

    let last_advance = metrics[num_h_metrics - 1].advance_width;
    for _ in num_h_metrics..num_glyphs {
        metrics.push(LongHorMetric {
            advance_width: last_advance,
            lsb: c.read_i16()?,
        });
    }
    Ok(metrics)
}
