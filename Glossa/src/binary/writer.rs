//! Seekable writer with back-patching support

use crate::encoding::TextEncoding;
use crate::error::Result;
use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use std::io::{Seek, SeekFrom, Write};

macro_rules! endian_writes {
    ($($name:ident => $ty:ty, $method:ident, $size:expr;)*) => {
        $(
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                if self.big_endian {
                    self.inner.$method::<BigEndian>(value)?;
                } else {
                    self.inner.$method::<LittleEndian>(value)?;
                }
                self.position += $size;
                Ok(())
            }
        )*
    };
}

/// Endian-aware writer over any `Write + Seek` sink.
pub struct BinaryWriter<W: Write + Seek> {
    inner: W,
    big_endian: bool,
    position: u64,
}

impl<W: Write + Seek> BinaryWriter<W> {
    /// Create a little-endian writer. The sink is assumed to be positioned at 0.
    pub fn new(inner: W) -> Self {
        Self::with_endianness(inner, false)
    }

    pub fn with_endianness(inner: W, big_endian: bool) -> Self {
        Self {
            inner,
            big_endian,
            position: 0,
        }
    }

    #[must_use]
    pub fn big_endian(&self) -> bool {
        self.big_endian
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Seek to an absolute offset, typically to back-patch a size or offset field.
    pub fn jump_to(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        self.position += 1;
        Ok(())
    }

    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.inner.write_i8(value)?;
        self.position += 1;
        Ok(())
    }

    endian_writes! {
        write_u16 => u16, write_u16, 2;
        write_i16 => i16, write_i16, 2;
        write_u32 => u32, write_u32, 4;
        write_i32 => i32, write_i32, 4;
        write_u64 => u64, write_u64, 8;
        write_i64 => i64, write_i64, 8;
        write_f32 => f32, write_f32, 4;
        write_f64 => f64, write_f64, 8;
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.position += bytes.len() as u64;
        Ok(())
    }

    /// Write text in the given encoding, without a terminator.
    pub fn write_str(&mut self, text: &str, encoding: TextEncoding) -> Result<()> {
        let bytes = encoding.encode(text)?;
        self.write_bytes(&bytes)
    }

    /// Write one code unit of `width` bytes (1, 2 or 4).
    pub fn write_unit(&mut self, value: u32, width: usize) -> Result<()> {
        match width {
            1 => self.write_u8(value as u8),
            2 => self.write_u16(value as u16),
            _ => self.write_u32(value),
        }
    }

    /// Write `count` copies of `fill`.
    pub fn pad(&mut self, count: u64, fill: u8) -> Result<()> {
        let count = usize::try_from(count).map_err(|_| {
            crate::Error::InvalidFormat(format!("padding of {count} bytes is too large"))
        })?;
        self.write_bytes(&vec![fill; count])
    }

    /// Pad with `fill` up to the next multiple of `alignment`.
    pub fn align(&mut self, alignment: u64, fill: u8) -> Result<()> {
        let target = super::align_up(self.position, alignment);
        self.pad(target - self.position, fill)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_endianness() {
        let mut writer = BinaryWriter::with_endianness(Cursor::new(Vec::new()), true);
        writer.write_u16(0xFEFF).unwrap();
        writer.write_u32(1).unwrap();
        assert_eq!(writer.position(), 6);
        assert_eq!(writer.into_inner().into_inner(), vec![0xFE, 0xFF, 0, 0, 0, 1]);
    }

    #[test]
    fn test_align_and_patch() {
        let mut writer = BinaryWriter::new(Cursor::new(Vec::new()));
        writer.write_u32(0).unwrap();
        writer.write_u8(7).unwrap();
        writer.align(8, 0xAB).unwrap();
        assert_eq!(writer.position(), 8);
        let end = writer.position();
        writer.jump_to(0).unwrap();
        writer.write_u32(0x11223344).unwrap();
        writer.jump_to(end).unwrap();
        assert_eq!(
            writer.into_inner().into_inner(),
            vec![0x44, 0x33, 0x22, 0x11, 7, 0xAB, 0xAB, 0xAB]
        );
    }

    #[test]
    fn test_units_and_text() {
        let mut writer = BinaryWriter::new(Cursor::new(Vec::new()));
        writer.write_unit(0x0E, 2).unwrap();
        writer.write_str("A", TextEncoding::Utf16Le).unwrap();
        writer.write_unit(0, 1).unwrap();
        assert_eq!(writer.into_inner().into_inner(), vec![0x0E, 0, 0x41, 0, 0]);
    }
}
