//! Random-access reader over an in-memory buffer

use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};
use std::io::{self, Cursor};

/// Maps an IO failure on the in-memory cursor to a positioned EOF error.
fn eof(err: io::Error, offset: u64) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::UnexpectedEof { offset }
    } else {
        Error::Io(err)
    }
}

macro_rules! endian_reads {
    ($($(#[$doc:meta])* $name:ident, $at:ident => $ty:ty, $method:ident;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&mut self) -> Result<$ty> {
                let offset = self.position();
                let value = if self.big_endian {
                    self.cursor.$method::<BigEndian>()
                } else {
                    self.cursor.$method::<LittleEndian>()
                };
                value.map_err(|e| eof(e, offset))
            }

            #[doc = concat!("Jump to `offset` and call [`Self::", stringify!($name), "`].")]
            pub fn $at(&mut self, offset: u64) -> Result<$ty> {
                self.jump_to(offset);
                self.$name()
            }
        )*
    };
}

/// Endian-aware cursor over a byte slice.
///
/// Seeking never fails; reads past the end return [`Error::UnexpectedEof`]
/// carrying the position of the failed read.
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    cursor: Cursor<&'a [u8]>,
    big_endian: bool,
}

impl<'a> BinaryReader<'a> {
    /// Create a little-endian reader positioned at 0.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_endianness(data, false)
    }

    #[must_use]
    pub fn with_endianness(data: &'a [u8], big_endian: bool) -> Self {
        Self {
            cursor: Cursor::new(data),
            big_endian,
        }
    }

    #[must_use]
    pub fn big_endian(&self) -> bool {
        self.big_endian
    }

    pub fn set_big_endian(&mut self, big_endian: bool) {
        self.big_endian = big_endian;
    }

    /// The full underlying buffer.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        *self.cursor.get_ref()
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.data().len() as u64
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    /// Bytes left between the position and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.len().saturating_sub(self.position())
    }

    pub fn jump_to(&mut self, offset: u64) {
        self.cursor.set_position(offset);
    }

    /// Move relative to the current position, clamping at 0.
    pub fn skip(&mut self, count: i64) {
        let position = self.position().saturating_add_signed(count);
        self.cursor.set_position(position);
    }

    /// Skip forward to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: u64) {
        let position = super::align_up(self.position(), alignment);
        self.cursor.set_position(position);
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let offset = self.position();
        self.cursor.read_u8().map_err(|e| eof(e, offset))
    }

    pub fn read_u8_at(&mut self, offset: u64) -> Result<u8> {
        self.jump_to(offset);
        self.read_u8()
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        let offset = self.position();
        self.cursor.read_i8().map_err(|e| eof(e, offset))
    }

    endian_reads! {
        read_u16, read_u16_at => u16, read_u16;
        read_i16, read_i16_at => i16, read_i16;
        /// Read a 3-byte unsigned integer.
        read_u24, read_u24_at => u32, read_u24;
        read_u32, read_u32_at => u32, read_u32;
        read_i32, read_i32_at => i32, read_i32;
        read_u64, read_u64_at => u64, read_u64;
        read_i64, read_i64_at => i64, read_i64;
        read_f32, read_f32_at => f32, read_f32;
        read_f64, read_f64_at => f64, read_f64;
    }

    /// Read `len` bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let offset = self.position();
        let data = self.data();
        let start = usize::try_from(offset).map_err(|_| Error::UnexpectedEof { offset })?;
        let end = start
            .checked_add(len)
            .filter(|&end| end <= data.len())
            .ok_or(Error::UnexpectedEof { offset })?;
        self.cursor.set_position(end as u64);
        Ok(&data[start..end])
    }

    pub fn read_bytes_at(&mut self, offset: u64, len: usize) -> Result<&'a [u8]> {
        self.jump_to(offset);
        self.read_bytes(len)
    }

    /// Compare the bytes at `offset` with `magic` without failing on short input.
    #[must_use]
    pub fn check_magic(&self, offset: usize, magic: &[u8]) -> bool {
        self.data()
            .get(offset..offset + magic.len())
            .is_some_and(|bytes| bytes == magic)
    }

    /// Read an unsigned integer stored in `len` bytes (at most 8), zero-extended.
    pub fn read_uint_sized(&mut self, len: usize) -> Result<u64> {
        let bytes = self.read_bytes(len.min(8))?;
        if bytes.is_empty() {
            return Ok(0);
        }
        Ok(if self.big_endian {
            BigEndian::read_uint(bytes, bytes.len())
        } else {
            LittleEndian::read_uint(bytes, bytes.len())
        })
    }

    /// Read a fixed-length string; trailing NULs are trimmed.
    pub fn read_string(&mut self, len: usize, encoding: TextEncoding) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(encoding.decode(bytes).trim_end_matches('\0').to_string())
    }

    pub fn read_string_at(
        &mut self,
        offset: u64,
        len: usize,
        encoding: TextEncoding,
    ) -> Result<String> {
        self.jump_to(offset);
        self.read_string(len, encoding)
    }

    /// Read a null-terminated string; the cursor ends after the terminator.
    pub fn read_terminated_string(&mut self, encoding: TextEncoding) -> Result<String> {
        let offset = self.position();
        let start = usize::try_from(offset).map_err(|_| Error::UnexpectedEof { offset })?;
        let (text, consumed) = decode_terminated(self.data(), start, encoding);
        self.cursor.set_position(offset + consumed as u64);
        Ok(text)
    }

    pub fn read_terminated_string_at(
        &mut self,
        offset: u64,
        encoding: TextEncoding,
    ) -> Result<String> {
        self.jump_to(offset);
        self.read_terminated_string(encoding)
    }

    /// Read a null-terminated string stored in a fixed field of `max_len` bytes.
    pub fn read_bounded_string_at(
        &mut self,
        offset: u64,
        max_len: usize,
        encoding: TextEncoding,
    ) -> Result<String> {
        let data = self.data();
        let start = usize::try_from(offset)
            .ok()
            .filter(|&start| start <= data.len())
            .ok_or(Error::UnexpectedEof { offset })?;
        let end = start.saturating_add(max_len).min(data.len());
        let (text, consumed) = decode_terminated(&data[..end], start, encoding);
        self.cursor.set_position(offset + consumed as u64);
        Ok(text)
    }

    /// Read `len` bytes as a number in file byte order, rendered as `0x` + uppercase hex.
    pub fn read_hex_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        let mut hex = String::with_capacity(2 + len * 2);
        hex.push_str("0x");
        if self.big_endian {
            bytes.iter().for_each(|b| push_hex(&mut hex, *b));
        } else {
            bytes.iter().rev().for_each(|b| push_hex(&mut hex, *b));
        }
        Ok(hex)
    }

    pub fn read_hex_string_at(&mut self, offset: u64, len: usize) -> Result<String> {
        self.jump_to(offset);
        self.read_hex_string(len)
    }
}

fn push_hex(out: &mut String, byte: u8) {
    use std::fmt::Write;
    let _ = write!(out, "{byte:02X}");
}

/// Decode a null-terminated string starting at `offset`.
///
/// Reads whole code units of the encoding's null width and stops at the
/// first all-zero unit. Returns the text and the number of bytes consumed,
/// terminator included. At the end of `data` the accumulated bytes are
/// returned without a terminator.
#[must_use]
pub fn decode_terminated(data: &[u8], offset: usize, encoding: TextEncoding) -> (String, usize) {
    let width = encoding.null_width();
    if offset >= data.len() {
        return (String::new(), 0);
    }

    let mut end = offset;
    while end + width <= data.len() {
        if data[end..end + width].iter().all(|&b| b == 0) {
            let text = encoding.decode(&data[offset..end]);
            return (text, end + width - offset);
        }
        end += width;
    }

    (encoding.decode(&data[offset..]), data.len() - offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_reads() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_u16().unwrap(), 0x3412);
        reader.set_big_endian(true);
        assert_eq!(reader.read_u16().unwrap(), 0x5678);
        assert_eq!(reader.read_u32_at(0).unwrap(), 0x12345678);
        assert_eq!(reader.read_u24_at(1).unwrap(), 0x345678);
    }

    #[test]
    fn test_eof_reports_offset() {
        let data = [0u8; 3];
        let mut reader = BinaryReader::new(&data);
        reader.jump_to(2);
        match reader.read_u16() {
            Err(Error::UnexpectedEof { offset }) => assert_eq!(offset, 2),
            other => panic!("expected EOF, got {other:?}"),
        }
        assert!(matches!(
            reader.read_bytes_at(1, 5),
            Err(Error::UnexpectedEof { offset: 1 })
        ));
    }

    #[test]
    fn test_skip_and_align() {
        let data = [0u8; 64];
        let mut reader = BinaryReader::new(&data);
        reader.skip(5);
        reader.align(16);
        assert_eq!(reader.position(), 16);
        reader.skip(-20);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_utf16_terminated() {
        let data = [0x41, 0x00, 0x00, 0x00];
        assert_eq!(
            decode_terminated(&data, 0, TextEncoding::Utf16Le),
            ("A".to_string(), 4)
        );
    }

    #[test]
    fn test_terminated_reads_whole_units() {
        // 0x0100 is a single UTF-16LE unit whose high byte is zero
        let data = [0x00, 0x01, 0x42, 0x00, 0x00, 0x00];
        let mut reader = BinaryReader::new(&data);
        let text = reader.read_terminated_string(TextEncoding::Utf16Le).unwrap();
        assert_eq!(text, "\u{100}B");
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_terminated_without_terminator() {
        let data = b"abc";
        assert_eq!(
            decode_terminated(data, 1, TextEncoding::Utf8),
            ("bc".to_string(), 2)
        );
        assert_eq!(decode_terminated(data, 3, TextEncoding::Utf8), (String::new(), 0));
    }

    #[test]
    fn test_bounded_string() {
        let data = b"abcdef\0";
        let mut reader = BinaryReader::new(data);
        assert_eq!(
            reader.read_bounded_string_at(1, 3, TextEncoding::Utf8).unwrap(),
            "bcd"
        );
    }

    #[test]
    fn test_hex_string() {
        let data = [0x01, 0x02, 0xAB, 0xCD];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_hex_string(4).unwrap(), "0xCDAB0201");
        reader.set_big_endian(true);
        assert_eq!(reader.read_hex_string_at(0, 4).unwrap(), "0x0102ABCD");
    }

    #[test]
    fn test_fixed_string_trims_nuls() {
        let data = b"SFAT\0\0";
        let mut reader = BinaryReader::new(data);
        assert_eq!(reader.read_string(6, TextEncoding::Utf8).unwrap(), "SFAT");
    }

    #[test]
    fn test_uint_sized() {
        let data = [0x01, 0x02];
        let mut reader = BinaryReader::new(&data);
        assert_eq!(reader.read_uint_sized(2).unwrap(), 0x0201);
        reader.set_big_endian(true);
        reader.jump_to(0);
        assert_eq!(reader.read_uint_sized(1).unwrap(), 0x01);
    }
}
