//! Big-endian byte cursor
//!
//! Every table parser reads through a [`Cursor`]. All reads are bounds
//! checked and fail with [`FontError::UnexpectedEof`] instead of panicking.

use crate::core::errors::{FontError, FontResult};
use crate::io::sfnt::Tag;

/// A read position inside a byte slice.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Cursor positioned at `offset`; fails if `offset` is past the end
    pub fn at(data: &'a [u8], offset: usize) -> FontResult<Self> {
        let mut cursor = Self::new(data);
        cursor.seek(offset)?;
        Ok(cursor)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn seek(&mut self, offset: usize) -> FontResult<()> {
        if offset > self.data.len() {
            return Err(FontError::UnexpectedEof);
        }
        self.pos = offset;
        Ok(())
    }

    pub fn skip(&mut self, count: usize) -> FontResult<()> {
        self.read_bytes(count).map(|_| ())
    }

    pub fn read_bytes(&mut self, count: usize) -> FontResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(count)
            .ok_or(FontError::UnexpectedEof)?;
        let bytes = self
            .data
            .get(self.pos..end)
            .ok_or(FontError::UnexpectedEof)?;
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> FontResult<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        let mut raw = [0u8; N];
        raw.copy_from_slice(bytes);
        Ok(raw)
    }

    pub fn read_u8(&mut self) -> FontResult<u8> {
        self.read_array::<1>().map(|b| b[0])
    }

    pub fn read_i8(&mut self) -> FontResult<i8> {
        self.read_array::<1>().map(|b| b[0] as i8)
    }

    pub fn read_u16(&mut self) -> FontResult<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_i16(&mut self) -> FontResult<i16> {
        self.read_array().map(i16::from_be_bytes)
    }

    pub fn read_u32(&mut self) -> FontResult<u32> {
        self.read_array().map(u32::from_be_bytes)
    }

    pub fn read_i64(&mut self) -> FontResult<i64> {
        self.read_array().map(i64::from_be_bytes)
    }

    pub fn read_tag(&mut self) -> FontResult<Tag> {
        self.read_array().map(Tag::from_be_bytes)
    }

    /// `count` consecutive `u16` values
    pub fn read_u16_array(&mut self, count: usize) -> FontResult<Vec<u16>> {
        let bytes = self.read_bytes(count.checked_mul(2).ok_or(FontError::UnexpectedEof)?)?;
        let mut values = Vec::new();
        values.try_reserve_exact(count)?;
        values.extend(
            bytes
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]])),
        );
        Ok(values)
    }
}

/// Read a `u16` at an absolute offset without a cursor
pub fn read_u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_big_endian_scalars() {
        let data = [0x12, 0x34, 0xFF, 0xFE, 0x00, 0x01, 0x00, 0x00, 0x80];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16().unwrap(), 0x1234);
        assert_eq!(cursor.read_i16().unwrap(), -2);
        assert_eq!(cursor.read_u32().unwrap(), 0x0001_0000);
        assert_eq!(cursor.read_i8().unwrap(), -128);
        assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn test_short_read_is_eof_and_does_not_advance() {
        let data = [0x00, 0x01, 0x02];
        let mut cursor = Cursor::at(&data, 2).unwrap();
        assert!(matches!(cursor.read_u16(), Err(FontError::UnexpectedEof)));
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.read_u8().unwrap(), 2);
    }

    #[test]
    fn test_seek_past_end_fails() {
        let data = [0u8; 4];
        assert!(Cursor::at(&data, 4).is_ok());
        assert!(matches!(Cursor::at(&data, 5), Err(FontError::UnexpectedEof)));
        let mut cursor = Cursor::new(&data);
        assert!(cursor.skip(5).is_err());
        assert!(cursor.skip(usize::MAX).is_err());
    }

    #[test]
    fn test_u16_arrays_and_absolute_reads() {
        let data = [0x00, 0x0A, 0x00, 0x0B, 0x00, 0x0C];
        let mut cursor = Cursor::new(&data);
        assert_eq!(cursor.read_u16_array(3).unwrap(), vec![10, 11, 12]);
        assert_eq!(read_u16_at(&data, 4), Some(12));
        assert_eq!(read_u16_at(&data, 5), None);
    }
}
