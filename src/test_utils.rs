//! Helpers for building font bytes in tests
//!
//! [`BeBuffer`] writes big-endian scalars; the functions and [`FontBuilder`]
//! on top of it assemble glyphs, cmap subtables and complete single-font or
//! collection files.

use crate::io::glyf::component_flags::*;
use crate::io::sfnt::{self, Tag};

/// A value that can be written big-endian
pub trait Scalar: Copy {
    fn write_be(self, out: &mut Vec<u8>);
}

macro_rules! impl_scalar {
    ($($ty:ty),*) => {
        $(impl Scalar for $ty {
            fn write_be(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_be_bytes());
            }
        })*
    };
}

impl_scalar!(u8, i8, u16, i16, u32, i32, i64);

/// A convenience type for generating a buffer of big-endian bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BeBuffer(Vec<u8>);

impl BeBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write any scalar to this buffer.
    pub fn push(mut self, item: impl Scalar) -> Self {
        item.write_be(&mut self.0);
        self
    }

    /// Write multiple scalars into the buffer
    pub fn extend<T: Scalar>(mut self, iter: impl IntoIterator<Item = T>) -> Self {
        for item in iter {
            item.write_be(&mut self.0);
        }
        self
    }

    /// Zero-pad to a multiple of `align` bytes
    pub fn align(mut self, align: usize) -> Self {
        while self.0.len() % align != 0 {
            self.0.push(0);
        }
        self
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl std::ops::Deref for BeBuffer {
    type Target = [u8];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Encode a simple glyph. Points are `(x, y, on_curve)` in font units.
///
/// Uses short vectors and the "same" bits wherever they apply. The result is
/// padded to an even length so it can sit behind a short `loca`.
pub fn simple_glyph(contours: &[&[(i16, i16, bool)]]) -> BeBuffer {
    let mut end_points = Vec::new();
    let mut total = 0u16;
    for contour in contours {
        total += contour.len() as u16;
        end_points.push(total - 1);
    }

    let points: Vec<(i16, i16, bool)> = contours.iter().flat_map(|c| c.iter().copied()).collect();
    let (mut flags, mut xs, mut ys) = (Vec::new(), BeBuffer::new(), BeBuffer::new());
    let (mut px, mut py) = (0i16, 0i16);
    for &(x, y, on) in &points {
        let mut flag = on as u8;
        let (dx, dy) = (x - px, y - py);
        (px, py) = (x, y);

        if dx == 0 {
            flag |= 0x10;
        } else if dx.unsigned_abs() <= 255 {
            flag |= 0x02 | if dx > 0 { 0x10 } else { 0 };
            xs = xs.push(dx.unsigned_abs() as u8);
        } else {
            xs = xs.push(dx);
        }

        if dy == 0 {
            flag |= 0x20;
        } else if dy.unsigned_abs() <= 255 {
            flag |= 0x04 | if dy > 0 { 0x20 } else { 0 };
            ys = ys.push(dy.unsigned_abs() as u8);
        } else {
            ys = ys.push(dy);
        }
        flags.push(flag);
    }

    BeBuffer::new()
        .push(contours.len() as u16)
        .extend([0i16; 4])
        .extend(end_points)
        .push(0u16)
        .extend(flags)
        .extend(xs.iter().copied())
        .extend(ys.iter().copied())
        .align(2)
}

/// One component for [`composite_glyph`]
#[derive(Debug, Clone)]
pub struct Component {
    pub glyph: u16,
    pub args: [i16; 2],
    pub xy: bool,
    pub scale: Vec<i16>,
}

impl Component {
    /// Offset component, arguments in font units
    pub fn xy(glyph: u16, dx: i16, dy: i16) -> Self {
        Self {
            glyph,
            args: [dx, dy],
            xy: true,
            scale: Vec::new(),
        }
    }

    /// Point-matching component
    pub fn anchored(glyph: u16, parent_point: i16, child_point: i16) -> Self {
        Self {
            glyph,
            args: [parent_point, child_point],
            xy: false,
            scale: Vec::new(),
        }
    }

    /// One value: uniform scale, two: x/y scale, four: 2×2 matrix (F2Dot14)
    pub fn with_scale(mut self, scale: &[i16]) -> Self {
        self.scale = scale.to_vec();
        self
    }
}

pub fn composite_glyph(components: &[Component]) -> BeBuffer {
    let mut buf = BeBuffer::new().push(-1i16).extend([0i16; 4]);
    for (i, component) in components.iter().enumerate() {
        let fits_byte = if component.xy {
            component.args.iter().all(|&a| (-128..=127).contains(&a))
        } else {
            component.args.iter().all(|&a| (0..=255).contains(&a))
        };

        let mut flags = 0u16;
        if !fits_byte {
            flags |= ARGS_ARE_WORDS;
        }
        if component.xy {
            flags |= ARGS_ARE_XY_VALUES;
        }
        flags |= match component.scale.len() {
            0 => 0,
            1 => HAVE_A_SCALE,
            2 => HAVE_X_AND_Y_SCALE,
            4 => HAVE_TWO_BY_TWO,
            n => panic!("unsupported scale length {n}"),
        };
        if i + 1 < components.len() {
            flags |= MORE_COMPONENTS;
        }

        buf = buf.push(flags).push(component.glyph);
        buf = if fits_byte {
            buf.extend(component.args.map(|a| a as u8))
        } else {
            buf.extend(component.args)
        };
        buf = buf.extend(component.scale.iter().copied());
    }
    buf.align(2)
}

/// One cmap format 4 segment
#[derive(Debug, Clone)]
pub struct Segment {
    pub start: u16,
    pub end: u16,
    pub delta: i16,
    pub glyphs: Option<Vec<u16>>,
}

impl Segment {
    pub fn delta(start: u16, end: u16, delta: i16) -> Self {
        Self {
            start,
            end,
            delta,
            glyphs: None,
        }
    }

    /// Segment resolved through the glyph id array
    pub fn glyphs(start: u16, end: u16, delta: i16, glyphs: &[u16]) -> Self {
        Self {
            start,
            end,
            delta,
            glyphs: Some(glyphs.to_vec()),
        }
    }
}

/// A format 4 subtable; the terminating `0xFFFF` segment is appended
pub fn format4_subtable(segments: &[Segment]) -> BeBuffer {
    let mut segments = segments.to_vec();
    segments.push(Segment::delta(0xFFFF, 0xFFFF, 1));
    let seg_count = segments.len();

    let mut range_offsets = Vec::new();
    let mut glyph_array = Vec::new();
    for (s, segment) in segments.iter().enumerate() {
        match &segment.glyphs {
            Some(glyphs) => {
                range_offsets.push((2 * (seg_count - s + glyph_array.len())) as u16);
                glyph_array.extend_from_slice(glyphs);
            }
            None => range_offsets.push(0),
        }
    }

    let search_range = 2 * (1u16 << (usize::BITS - 1 - seg_count.leading_zeros()));
    let entry_selector = (search_range / 2).trailing_zeros() as u16;
    let length = 16 + 8 * seg_count + 2 * glyph_array.len();

    BeBuffer::new()
        .push(4u16)
        .push(length as u16)
        .push(0u16)
        .push((seg_count * 2) as u16)
        .push(search_range)
        .push(entry_selector)
        .push((seg_count * 2) as u16 - search_range)
        .extend(segments.iter().map(|s| s.end))
        .push(0u16)
        .extend(segments.iter().map(|s| s.start))
        .extend(segments.iter().map(|s| s.delta))
        .extend(range_offsets)
        .extend(glyph_array)
}

/// Assembles a complete TrueType file from parts
#[derive(Debug, Clone)]
pub struct FontBuilder {
    units_per_em: u16,
    glyphs: Vec<(Option<BeBuffer>, u16, i16)>,
    segments: Vec<Segment>,
    line_metrics: (i16, i16, i16),
    num_h_metrics: Option<u16>,
    long_loca: bool,
    head_magic: u32,
    maxp_version: u32,
    omitted: Vec<Tag>,
    overrides: Vec<(Tag, Vec<u8>)>,
}

impl FontBuilder {
    pub fn new(units_per_em: u16) -> Self {
        Self {
            units_per_em,
            glyphs: Vec::new(),
            segments: Vec::new(),
            line_metrics: (800, -200, 0),
            num_h_metrics: None,
            long_loca: false,
            head_magic: 0x5F0F_3CF5,
            maxp_version: 0x0000_5000,
            omitted: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Append a glyph with its advance width and left side bearing
    pub fn glyph(mut self, data: BeBuffer, advance: u16, lsb: i16) -> Self {
        self.glyphs.push((Some(data), advance, lsb));
        self
    }

    /// Append a glyph with no outline
    pub fn empty_glyph(mut self, advance: u16, lsb: i16) -> Self {
        self.glyphs.push((None, advance, lsb));
        self
    }

    pub fn map(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn line_metrics(mut self, ascender: i16, descender: i16, line_gap: i16) -> Self {
        self.line_metrics = (ascender, descender, line_gap);
        self
    }

    /// Store only the first `count` metrics as long entries
    pub fn num_h_metrics(mut self, count: u16) -> Self {
        self.num_h_metrics = Some(count);
        self
    }

    pub fn long_loca(mut self) -> Self {
        self.long_loca = true;
        self
    }

    pub fn head_magic(mut self, magic: u32) -> Self {
        self.head_magic = magic;
        self
    }

    pub fn maxp_version(mut self, version: u32) -> Self {
        self.maxp_version = version;
        self
    }

    pub fn without_table(mut self, tag: Tag) -> Self {
        self.omitted.push(tag);
        self
    }

    /// Replace a table's bytes verbatim
    pub fn table(mut self, tag: Tag, data: Vec<u8>) -> Self {
        self.overrides.push((tag, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        self.build_at(0)
    }

    /// A `ttcf` collection holding this font
    pub fn build_collection(&self) -> Vec<u8> {
        let header = BeBuffer::new()
            .push(sfnt::TTCF.to_u32())
            .push(0x0001_0000u32)
            .push(1u32)
            .push(16u32);
        let mut bytes = header.into_vec();
        bytes.extend(self.build_at(16));
        bytes
    }

    fn tables(&self) -> Vec<(Tag, Vec<u8>)> {
        let num_glyphs = self.glyphs.len() as u16;

        let mut glyf = BeBuffer::new();
        let mut offsets = vec![0usize];
        for (data, _, _) in &self.glyphs {
            if let Some(data) = data {
                glyf = glyf.extend(data.iter().copied()).align(2);
            }
            offsets.push(glyf.len());
        }
        let loca = if self.long_loca {
            BeBuffer::new().extend(offsets.iter().map(|&o| o as u32))
        } else {
            BeBuffer::new().extend(offsets.iter().map(|&o| (o / 2) as u16))
        };

        let head = BeBuffer::new()
            .push(0x0001_0000u32)
            .push(0x0001_0000u32)
            .push(0u32)
            .push(self.head_magic)
            .push(0u16)
            .push(self.units_per_em)
            .push(0i64)
            .push(0i64)
            .extend([0i16; 4])
            .push(0u16)
            .push(8u16)
            .push(2i16)
            .push(self.long_loca as i16)
            .push(0i16);

        let mut maxp = BeBuffer::new().push(self.maxp_version).push(num_glyphs);
        if self.maxp_version == 0x0001_0000 {
            maxp = maxp.extend([0u16; 13]);
        }

        let num_h_metrics = self.num_h_metrics.unwrap_or(num_glyphs);
        let (ascender, descender, line_gap) = self.line_metrics;
        let hhea = BeBuffer::new()
            .push(0x0001_0000u32)
            .push(ascender)
            .push(descender)
            .push(line_gap)
            .push(0u16)
            .extend([0i16; 10])
            .push(0i16)
            .push(num_h_metrics);

        let mut hmtx = BeBuffer::new();
        for (i, &(_, advance, lsb)) in self.glyphs.iter().enumerate() {
            hmtx = if i < num_h_metrics as usize {
                hmtx.push(advance).push(lsb)
            } else {
                hmtx.push(lsb)
            };
        }

        let subtable = format4_subtable(&self.segments);
        let cmap = BeBuffer::new()
            .push(0u16)
            .push(1u16)
            .push(3u16)
            .push(1u16)
            .push(12u32)
            .extend(subtable.iter().copied());

        let mut tables = vec![
            (sfnt::HEAD, head.into_vec()),
            (sfnt::HHEA, hhea.into_vec()),
            (sfnt::MAXP, maxp.into_vec()),
            (sfnt::HMTX, hmtx.into_vec()),
            (sfnt::CMAP, cmap.into_vec()),
            (sfnt::LOCA, loca.into_vec()),
            (sfnt::GLYF, glyf.into_vec()),
        ];
        tables.retain(|(tag, _)| !self.omitted.contains(tag));
        for (tag, data) in &self.overrides {
            if let Some(entry) = tables.iter_mut().find(|(t, _)| t == tag) {
                entry.1 = data.clone();
            }
        }
        tables
    }

    fn build_at(&self, base: usize) -> Vec<u8> {
        let tables = self.tables();
        let header_len = 12 + 16 * tables.len();

        let mut directory = BeBuffer::new()
            .push(sfnt::SFNT_VERSION_TRUETYPE)
            .push(tables.len() as u16)
            .extend([0u16; 3]);
        let mut body = Vec::new();
        for (tag, data) in &tables {
            let offset = base + header_len + body.len();
            directory = directory
                .push(tag.to_u32())
                .push(sfnt::table_checksum(data, *tag == sfnt::HEAD))
                .push(offset as u32)
                .push(data.len() as u32);
            body.extend_from_slice(data);
            while body.len() % 4 != 0 {
                body.push(0);
            }
        }

        let mut bytes = directory.into_vec();
        bytes.extend(body);
        bytes
    }
}
