//! Byte order detection and fixed-layout field reading.
//!
//! NIFTI-1 has no byte-order marker. The order is inferred from `dim[0]`
//! at offset 40: a real file has between 1 and 7 populated axes, and the
//! byte-swapped reading of such a value is always at least 256.

use crate::error::{NiftiError, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};

/// Offset of `dim[0]`, the byte-order probe.
pub const DIM0_OFFSET: usize = 40;

/// Byte order of the multi-byte header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endianness {
    Little,
    Big,
}

impl Endianness {
    /// Detect the byte order from the `dim[0]` probe.
    ///
    /// Little-endian wins when both readings are in range.
    pub fn detect(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < DIM0_OFFSET + 2 {
            return Err(NiftiError::BufferTooSmall {
                needed: DIM0_OFFSET + 2,
                have: buffer.len(),
            });
        }

        let probe = &buffer[DIM0_OFFSET..DIM0_OFFSET + 2];
        let little = LittleEndian::read_u16(probe);
        if (1..=7).contains(&little) {
            return Ok(Self::Little);
        }
        let big = BigEndian::read_u16(probe);
        if (1..=7).contains(&big) {
            return Ok(Self::Big);
        }
        Err(NiftiError::UndeterminedByteOrder { little, big })
    }

    /// Short label, `"LE"` or `"BE"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Little => "LE",
            Self::Big => "BE",
        }
    }

    #[inline]
    fn read_i16(self, buf: &[u8]) -> i16 {
        match self {
            Self::Little => LittleEndian::read_i16(buf),
            Self::Big => BigEndian::read_i16(buf),
        }
    }

    #[inline]
    fn read_i32(self, buf: &[u8]) -> i32 {
        match self {
            Self::Little => LittleEndian::read_i32(buf),
            Self::Big => BigEndian::read_i32(buf),
        }
    }

    #[inline]
    fn read_f32(self, buf: &[u8]) -> f32 {
        match self {
            Self::Little => LittleEndian::read_f32(buf),
            Self::Big => BigEndian::read_f32(buf),
        }
    }
}

impl std::fmt::Display for Endianness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sequential reader over a fixed-layout buffer.
///
/// Every read advances the cursor; callers check the buffer length once
/// up front, so reads index directly.
pub struct FieldReader<'a> {
    data: &'a [u8],
    offset: usize,
    order: Endianness,
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8], order: Endianness) -> Self {
        Self {
            data,
            offset: 0,
            order,
        }
    }

    /// Current position from the start of the buffer.
    #[inline]
    pub fn position(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn skip(&mut self, count: usize) {
        self.offset += count;
    }

    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> &'a [u8] {
        let slice = &self.data[self.offset..self.offset + count];
        self.offset += count;
        slice
    }

    #[inline]
    pub fn read_u8(&mut self) -> u8 {
        let value = self.data[self.offset];
        self.offset += 1;
        value
    }

    #[inline]
    pub fn read_i16(&mut self) -> i16 {
        let value = self.order.read_i16(&self.data[self.offset..]);
        self.offset += 2;
        value
    }

    #[inline]
    pub fn read_i32(&mut self) -> i32 {
        let value = self.order.read_i32(&self.data[self.offset..]);
        self.offset += 4;
        value
    }

    #[inline]
    pub fn read_f32(&mut self) -> f32 {
        let value = self.order.read_f32(&self.data[self.offset..]);
        self.offset += 4;
        value
    }

    /// Read `N` consecutive 16-bit integers.
    pub fn read_i16_array<const N: usize>(&mut self) -> [i16; N] {
        let mut out = [0i16; N];
        for value in &mut out {
            *value = self.read_i16();
        }
        out
    }

    /// Read `N` consecutive 32-bit floats.
    pub fn read_f32_array<const N: usize>(&mut self) -> [f32; N] {
        let mut out = [0f32; N];
        for value in &mut out {
            *value = self.read_f32();
        }
        out
    }

    /// Read a fixed-width text run. Embedded NUL bytes are kept.
    pub fn read_text(&mut self, width: usize) -> String {
        String::from_utf8_lossy(self.read_bytes(width)).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(bytes: [u8; 2]) -> Vec<u8> {
        let mut buffer = vec![0u8; 64];
        buffer[DIM0_OFFSET..DIM0_OFFSET + 2].copy_from_slice(&bytes);
        buffer
    }

    #[test]
    fn test_detect_little_endian() {
        assert_eq!(Endianness::detect(&probe([3, 0])).unwrap(), Endianness::Little);
        assert_eq!(Endianness::detect(&probe([7, 0])).unwrap(), Endianness::Little);
    }

    #[test]
    fn test_detect_big_endian() {
        assert_eq!(Endianness::detect(&probe([0, 3])).unwrap(), Endianness::Big);
        assert_eq!(Endianness::detect(&probe([0, 1])).unwrap(), Endianness::Big);
    }

    #[test]
    fn test_detect_fails_on_both_readings() {
        match Endianness::detect(&probe([0, 0])) {
            Err(NiftiError::UndeterminedByteOrder { little, big }) => {
                assert_eq!(little, 0);
                assert_eq!(big, 0);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(matches!(
            Endianness::detect(&probe([8, 0])),
            Err(NiftiError::UndeterminedByteOrder { little: 8, big: 2048 })
        ));
    }

    #[test]
    fn test_detect_short_buffer() {
        assert!(matches!(
            Endianness::detect(&[0u8; 41]),
            Err(NiftiError::BufferTooSmall { needed: 42, have: 41 })
        ));
    }

    #[test]
    fn test_field_reader_sequence() {
        let data = [
            0x01, 0x00, 0x00, 0x00, // i32 = 1 (LE)
            0xFF, // u8
            0x02, 0x00, // i16 = 2
            0x00, 0x00, 0x80, 0x3F, // f32 = 1.0
            b'a', b'b', 0x00, // text
        ];
        let mut reader = FieldReader::new(&data, Endianness::Little);
        assert_eq!(reader.read_i32(), 1);
        assert_eq!(reader.read_u8(), 0xFF);
        assert_eq!(reader.read_i16(), 2);
        assert_eq!(reader.read_f32(), 1.0);
        assert_eq!(reader.read_text(3), "ab\0");
        assert_eq!(reader.position(), data.len());
    }

    #[test]
    fn test_field_reader_big_endian() {
        let data = [0x00, 0x05, 0x3F, 0x80, 0x00, 0x00];
        let mut reader = FieldReader::new(&data, Endianness::Big);
        assert_eq!(reader.read_i16(), 5);
        assert_eq!(reader.read_f32(), 1.0);
    }
}
