//! `loca` + `glyf`: glyph outline decoding
//!
//! Each glyph is either a simple glyph (contours of on/off-curve points) or a
//! composite that references other glyphs through affine transforms. Simple
//! outlines are normalized to the em square while decoding, so the rest of the
//! pipeline never sees font units.

use std::ops::Range;

use kurbo::Affine;
use tracing::{debug, warn};

use super::reader::Cursor;
use crate::core::errors::{FontError, FontResult};
use crate::geometry::EmPoint;

/// Bits of the per-point flag word
pub mod point_flags {
    /// The point lies on the outline
    pub const ON_CURVE: u32 = 1;
    /// Corner identity of an on-curve curve corner (values 0 and 2)
    pub const CORNER_TAG: u32 = 2;
    /// Set on the off-curve point of a convex curve triangle
    pub const CONVEX: u32 = 4;
}

// Simple glyph flag bits
const ON_CURVE_POINT: u8 = 0x01;
const X_SHORT: u8 = 0x02;
const Y_SHORT: u8 = 0x04;
const REPEAT: u8 = 0x08;
const X_SAME_OR_POSITIVE: u8 = 0x10;
const Y_SAME_OR_POSITIVE: u8 = 0x20;

/// Composite component flag bits
pub mod component_flags {
    pub const ARGS_ARE_WORDS: u16 = 0x0001;
    pub const ARGS_ARE_XY_VALUES: u16 = 0x0002;
    pub const HAVE_A_SCALE: u16 = 0x0008;
    pub const MORE_COMPONENTS: u16 = 0x0020;
    pub const HAVE_X_AND_Y_SCALE: u16 = 0x0040;
    pub const HAVE_TWO_BY_TWO: u16 = 0x0080;
}

use component_flags::*;

/// A num_contours at or above this marks a composite glyph
const COMPOSITE_THRESHOLD: u16 = 0x1000;

/// The decoded points of a simple glyph
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    /// Em-square coordinates
    pub points: Vec<EmPoint>,
    /// Only [`point_flags::ON_CURVE`] is ever set by the decoder
    pub flags: Vec<u32>,
    /// Index of the last point of each contour
    pub end_points: Vec<u16>,
}

impl Outline {
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn num_contours(&self) -> usize {
        self.end_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_on_curve(&self, point: usize) -> bool {
        self.flags[point] & point_flags::ON_CURVE != 0
    }

    /// Point index range of each contour, unvalidated
    pub fn contour_ranges(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        let mut start = 0usize;
        self.end_points.iter().map(move |&end| {
            let range = start..end as usize + 1;
            start = end as usize + 1;
            range
        })
    }
}

/// One component of a composite glyph
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SubglyphRef {
    pub glyph_index: u16,
    pub flags: u16,
    /// 2×2 matrix in row order xx, xy, yx, yy
    pub matrix: [f32; 4],
    /// Em-square offset; zero when the arguments are anchor points
    pub offset: [f32; 2],
    /// Point-matching anchors (parent point, child point), not applied
    pub anchors: Option<[u16; 2]>,
}

impl SubglyphRef {
    /// The component's transform, offset included
    pub fn transform(&self) -> Affine {
        let [xx, xy, yx, yy] = self.matrix;
        Affine::new([
            xx as f64,
            xy as f64,
            yx as f64,
            yy as f64,
            self.offset[0] as f64,
            self.offset[1] as f64,
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedGlyph {
    Simple(Outline),
    Composite(Vec<SubglyphRef>),
}

/// Decoder over a font's `loca` and `glyf` tables
#[derive(Debug, Clone)]
pub struct GlyfDecoder<'a> {
    loca: &'a [u8],
    glyf: &'a [u8],
    long_loca: bool,
    num_glyphs: u16,
    units_per_em: f32,
    max_points: usize,
}

impl<'a> GlyfDecoder<'a> {
    pub fn new(
        loca: &'a [u8],
        glyf: &'a [u8],
        long_loca: bool,
        num_glyphs: u16,
        units_per_em: u16,
        max_points: usize,
    ) -> Self {
        Self {
            loca,
            glyf,
            long_loca,
            num_glyphs,
            units_per_em: units_per_em as f32,
            max_points,
        }
    }

    fn loca_entry(&self, index: usize) -> Option<usize> {
        let mut c = Cursor::new(self.loca);
        if self.long_loca {
            c.seek(index.checked_mul(4)?).ok()?;
            c.read_u32().ok().map(|v| v as usize)
        } else {
            c.seek(index.checked_mul(2)?).ok()?;
            c.read_u16().ok().map(|v| v as usize * 2)
        }
    }

    /// Byte range of a glyph inside `glyf`; `None` for a glyph with no outline
    pub fn glyph_range(&self, index: u16) -> FontResult<Option<Range<usize>>> {
        let start = self
            .loca_entry(index as usize)
            .ok_or(FontError::UnexpectedEof)?;
        // Fonts that omit the final loca entry end at the table end
        let end = self
            .loca_entry(index as usize + 1)
            .unwrap_or(self.glyf.len());

        if start == end {
            return Ok(None);
        }
        if start > end {
            return Err(FontError::Corrupt("loca offsets decrease"));
        }
        if end > self.glyf.len() {
            return Err(FontError::UnexpectedEof);
        }
        Ok(Some(start..end))
    }

    /// Decode one glyph; `None` if it has no outline
    pub fn decode(&self, index: u16) -> FontResult<Option<DecodedGlyph>> {
        let Some(range) = self.glyph_range(index)? else {
            return Ok(None);
        };
        let mut c = Cursor::new(&self.glyf[range]);
        let num_contours = c.read_u16()?;
        // Bounding box
        c.skip(8)?;

        if num_contours >= COMPOSITE_THRESHOLD {
            self.decode_composite(&mut c).map(DecodedGlyph::Composite)
        } else {
            self.decode_simple(&mut c, num_contours as usize)
                .map(DecodedGlyph::Simple)
        }
        .map(Some)
    }

    /// Decode every glyph, in glyph index order
    pub fn decode_all(&self) -> FontResult<Vec<Option<DecodedGlyph>>> {
        let mut glyphs = Vec::new();
        glyphs.try_reserve_exact(self.num_glyphs as usize)?;

        let (mut simple, mut composite) = (0usize, 0usize);
        for index in 0..self.num_glyphs {
            let glyph = self.decode(index)?;
            match &glyph {
                Some(DecodedGlyph::Simple(_)) => simple += 1,
                Some(DecodedGlyph::Composite(_)) => composite += 1,
                None => {}
            }
            glyphs.push(glyph);
        }

        debug!(
            "Decoded {} glyphs ({} simple, {} composite, {} empty), {} loca",
            self.num_glyphs,
            simple,
            composite,
            self.num_glyphs as usize - simple - composite,
            if self.long_loca { "32-bit" } else { "16-bit" }
        );
        Ok(glyphs)
    }

    fn decode_simple(&self, c: &mut Cursor<'_>, num_contours: usize) -> FontResult<Outline> {
        if num_contours == 0 {
            return Ok(Outline::default());
        }

        let end_points = c.read_u16_array(num_contours)?;
        let num_points = end_points[num_contours - 1] as usize + 1;
        if num_points > self.max_points {
            warn!(
                "Glyph needs {num_points} points, capacity is {}",
                self.max_points
            );
            return Err(FontError::BufferLimit {
                needed: num_points,
                limit: self.max_points,
            });
        }

        let instruction_len = c.read_u16()? as usize;
        c.skip(instruction_len)?;

        let mut raw_flags = Vec::new();
        raw_flags.try_reserve_exact(num_points)?;
        while raw_flags.len() < num_points {
            let flag = c.read_u8()?;
            let mut count = 1;
            if flag & REPEAT != 0 {
                count += c.read_u8()? as usize;
            }
            if raw_flags.len() + count > num_points {
                return Err(FontError::Corrupt("more flags than points"));
            }
            raw_flags.extend(std::iter::repeat(flag).take(count));
        }

        let mut points = Vec::new();
        points.try_reserve_exact(num_points)?;
        let mut x = 0i32;
        for &flag in &raw_flags {
            x = read_coordinate(c, flag, X_SHORT, X_SAME_OR_POSITIVE, x)?;
            points.push([x as f32 / self.units_per_em, 0.0]);
        }
        let mut y = 0i32;
        for (point, &flag) in points.iter_mut().zip(&raw_flags) {
            y = read_coordinate(c, flag, Y_SHORT, Y_SAME_OR_POSITIVE, y)?;
            point[1] = y as f32 / self.units_per_em;
        }

        let flags = raw_flags
            .iter()
            .map(|&flag| (flag & ON_CURVE_POINT) as u32)
            .collect();

        Ok(Outline {
            points,
            flags,
            end_points,
        })
    }

    fn decode_composite(&self, c: &mut Cursor<'_>) -> FontResult<Vec<SubglyphRef>> {
        let mut components = Vec::new();
        loop {
            let flags = c.read_u16()?;
            let mut glyph_index = c.read_u16()?;
            if glyph_index >= self.num_glyphs {
                debug!("Component glyph {glyph_index} out of range, using glyph 0");
                glyph_index = 0;
            }

            let (arg1, arg2, anchors) = if flags & ARGS_ARE_WORDS != 0 {
                let (a, b) = (c.read_u16()?, c.read_u16()?);
                (a as i16, b as i16, [a, b])
            } else {
                let (a, b) = (c.read_u8()?, c.read_u8()?);
                (a as i8 as i16, b as i8 as i16, [a as u16, b as u16])
            };

            let (offset, anchors) = if flags & ARGS_ARE_XY_VALUES != 0 {
                (
                    [
                        arg1 as f32 / self.units_per_em,
                        arg2 as f32 / self.units_per_em,
                    ],
                    None,
                )
            } else {
                debug!("Point-matching component anchors {anchors:?} are not applied");
                ([0.0, 0.0], Some(anchors))
            };

            let fixed: [i16; 4] = if flags & HAVE_A_SCALE != 0 {
                let scale = c.read_i16()?;
                [scale, 0, 0, scale]
            } else if flags & HAVE_X_AND_Y_SCALE != 0 {
                let (sx, sy) = (c.read_i16()?, c.read_i16()?);
                [sx, 0, 0, sy]
            } else if flags & HAVE_TWO_BY_TWO != 0 {
                [c.read_i16()?, c.read_i16()?, c.read_i16()?, c.read_i16()?]
            } else {
                [1 << 14, 0, 0, 1 << 14]
            };

            components.try_reserve(1)?;
            components.push(SubglyphRef {
                glyph_index,
                flags,
                matrix: fixed.map(f2dot14),
                offset,
                anchors,
            });

            if flags & MORE_COMPONENTS == 0 {
                break;
            }
        }
        Ok(components)
    }
}

#[inline]
fn f2dot14(raw: i16) -> f32 {
    raw as f32 / 16384.0
}

/// One delta-encoded coordinate.
///
/// Short deltas are a byte whose sign comes from the "same" bit; long deltas
/// are `i16` and are absent (zero) when the "same" bit is set.
fn read_coordinate(
    c: &mut Cursor<'_>,
    flag: u8,
    short_bit: u8,
    same_bit: u8,
    previous: i32,
) -> FontResult<i32> {
    if flag & short_bit != 0 {
        let delta = c.read_u8()? as i32;
        Ok(if flag & same_bit != 0 {
            previous + delta
        } else {
            previous - delta
        })
    } else if flag & same_bit != 0 {
        Ok(previous)
    } else {
        Ok(previous + c.read_i16()? as i32)
    }
}
