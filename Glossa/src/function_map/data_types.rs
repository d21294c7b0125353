//! Primitive argument codecs of the function map language
//!
//! Every argument of a function call is stored with one of these types.
//! Each converts between the editable text form and the raw argument bytes.

use crate::binary::decode_terminated;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::fmt::Write;

/// An argument data type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataType {
    Bool,
    U8,
    S8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    F64,
    /// String with a u16 byte-length prefix.
    Str,
    /// Null-terminated string.
    NullStr,
    /// Remaining bytes as `0x` + hex.
    Hex,
    /// Fixed padding bytes; carries no value.
    Padding(Vec<u8>),
}

macro_rules! write_number {
    ($ty:ty, $len:expr, $write:ident, $self:expr, $value:expr, $big_endian:expr) => {{
        let parsed: $ty = $value.trim().parse().map_err(|_| $self.invalid($value))?;
        let mut buf = [0u8; $len];
        if $big_endian {
            BigEndian::$write(&mut buf, parsed);
        } else {
            LittleEndian::$write(&mut buf, parsed);
        }
        Ok(buf.to_vec())
    }};
}

macro_rules! read_number {
    ($ty:ty, $len:expr, $read:ident, $data:expr, $offset:expr, $big_endian:expr) => {{
        let bytes = fixed($data, $offset, $len)?;
        let value: $ty = if $big_endian {
            BigEndian::$read(bytes)
        } else {
            LittleEndian::$read(bytes)
        };
        Ok((value.to_string(), $len))
    }};
}

impl DataType {
    /// Resolve a type name used in function map source (case-insensitive).
    ///
    /// Padding literals (`0x..`) are handled by [`DataType::padding`].
    #[must_use]
    pub fn from_alias(alias: &str) -> Option<Self> {
        let data_type = match alias.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => Self::Bool,
            "u8" | "uint8" | "byte" => Self::U8,
            "s8" | "i8" | "int8" | "sbyte" => Self::S8,
            "s16" | "i16" | "int16" | "short" => Self::S16,
            "u16" | "uint16" | "ushort" => Self::U16,
            "s32" | "i32" | "int32" | "int" => Self::S32,
            "u32" | "uint32" | "uint" => Self::U32,
            "s64" | "i64" | "int64" | "long" => Self::S64,
            "u64" | "uint64" | "ulong" => Self::U64,
            "f32" | "single" | "float" => Self::F32,
            "f64" | "double" => Self::F64,
            "str" | "string" => Self::Str,
            "nstr" | "0str" | "nullstr" | "nstring" | "0string" | "nullstring" => Self::NullStr,
            "hex" | "hexstr" | "hexstring" => Self::Hex,
            _ => return None,
        };
        Some(data_type)
    }

    /// Build a padding type from a `0x..` literal with an even number of digits.
    #[must_use]
    pub fn padding(literal: &str) -> Option<Self> {
        parse_hex(literal).ok().map(Self::Padding)
    }

    /// Canonical name; padding types are named by their lowercase literal.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Bool => "bool".into(),
            Self::U8 => "u8".into(),
            Self::S8 => "s8".into(),
            Self::S16 => "s16".into(),
            Self::U16 => "u16".into(),
            Self::S32 => "s32".into(),
            Self::U32 => "u32".into(),
            Self::S64 => "s64".into(),
            Self::U64 => "u64".into(),
            Self::F32 => "f32".into(),
            Self::F64 => "f64".into(),
            Self::Str => "str".into(),
            Self::NullStr => "nstr".into(),
            Self::Hex => "hex".into(),
            Self::Padding(bytes) => to_hex(bytes).to_ascii_lowercase(),
        }
    }

    /// Fixed size in bytes, or `None` for variable-length types.
    #[must_use]
    pub fn fixed_len(&self) -> Option<usize> {
        match self {
            Self::Bool | Self::U8 | Self::S8 => Some(1),
            Self::S16 | Self::U16 => Some(2),
            Self::S32 | Self::U32 | Self::F32 => Some(4),
            Self::S64 | Self::U64 | Self::F64 => Some(8),
            Self::Str | Self::NullStr | Self::Hex => None,
            Self::Padding(bytes) => Some(bytes.len()),
        }
    }

    #[must_use]
    pub fn is_padding(&self) -> bool {
        matches!(self, Self::Padding(_))
    }

    /// Convert a text value to its binary form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidValue`] if the text is not a valid value of
    /// this type, or [`Error::Encoding`] if a string cannot be encoded.
    pub fn serialize(&self, value: &str, big_endian: bool, encoding: TextEncoding) -> Result<Vec<u8>> {
        match self {
            Self::Bool => Ok(vec![u8::from(value.trim().eq_ignore_ascii_case("true"))]),
            Self::U8 => {
                let parsed: u8 = value.trim().parse().map_err(|_| self.invalid(value))?;
                Ok(vec![parsed])
            }
            Self::S8 => {
                let parsed: i8 = value.trim().parse().map_err(|_| self.invalid(value))?;
                Ok(parsed.to_le_bytes().to_vec())
            }
            Self::S16 => write_number!(i16, 2, write_i16, self, value, big_endian),
            Self::U16 => write_number!(u16, 2, write_u16, self, value, big_endian),
            Self::S32 => write_number!(i32, 4, write_i32, self, value, big_endian),
            Self::U32 => write_number!(u32, 4, write_u32, self, value, big_endian),
            Self::S64 => write_number!(i64, 8, write_i64, self, value, big_endian),
            Self::U64 => write_number!(u64, 8, write_u64, self, value, big_endian),
            Self::F32 => write_number!(f32, 4, write_f32, self, value, big_endian),
            Self::F64 => write_number!(f64, 8, write_f64, self, value, big_endian),
            Self::Str => {
                let text = encoding.encode(value)?;
                let len = u16::try_from(text.len()).map_err(|_| self.invalid(value))?;
                let mut bytes = Vec::with_capacity(text.len() + 2);
                bytes.extend_from_slice(&if big_endian {
                    len.to_be_bytes()
                } else {
                    len.to_le_bytes()
                });
                bytes.extend_from_slice(&text);
                Ok(bytes)
            }
            Self::NullStr => {
                let mut bytes = encoding.encode(value)?;
                bytes.extend(std::iter::repeat_n(0u8, encoding.null_width()));
                Ok(bytes)
            }
            Self::Hex => parse_hex(value).map_err(|()| self.invalid(value)),
            Self::Padding(bytes) => Ok(bytes.clone()),
        }
    }

    /// Read a value starting at `offset`; returns the text and the bytes consumed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnexpectedEof`] if the data is too short for the type.
    pub fn deserialize(
        &self,
        data: &[u8],
        offset: usize,
        big_endian: bool,
        encoding: TextEncoding,
    ) -> Result<(String, usize)> {
        match self {
            Self::Bool => {
                let byte = fixed(data, offset, 1)?[0];
                Ok(((if byte == 1 { "true" } else { "false" }).to_string(), 1))
            }
            Self::U8 => Ok((fixed(data, offset, 1)?[0].to_string(), 1)),
            Self::S8 => Ok(((fixed(data, offset, 1)?[0] as i8).to_string(), 1)),
            Self::S16 => read_number!(i16, 2, read_i16, data, offset, big_endian),
            Self::U16 => read_number!(u16, 2, read_u16, data, offset, big_endian),
            Self::S32 => read_number!(i32, 4, read_i32, data, offset, big_endian),
            Self::U32 => read_number!(u32, 4, read_u32, data, offset, big_endian),
            Self::S64 => read_number!(i64, 8, read_i64, data, offset, big_endian),
            Self::U64 => read_number!(u64, 8, read_u64, data, offset, big_endian),
            Self::F32 => read_number!(f32, 4, read_f32, data, offset, big_endian),
            Self::F64 => read_number!(f64, 8, read_f64, data, offset, big_endian),
            Self::Str => {
                let prefix = fixed(data, offset, 2)?;
                let len = if big_endian {
                    BigEndian::read_u16(prefix)
                } else {
                    LittleEndian::read_u16(prefix)
                } as usize;
                let text = fixed(data, offset + 2, len)?;
                Ok((encoding.decode(text), len + 2))
            }
            Self::NullStr => Ok(decode_terminated(data, offset, encoding)),
            Self::Hex => {
                let rest = data.get(offset..).unwrap_or_default();
                Ok((to_hex(rest), rest.len()))
            }
            Self::Padding(bytes) => Ok((String::new(), bytes.len())),
        }
    }

    fn invalid(&self, value: &str) -> Error {
        Error::InvalidValue {
            data_type: self.name(),
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name())
    }
}

fn fixed(data: &[u8], offset: usize, len: usize) -> Result<&[u8]> {
    data.get(offset..offset.saturating_add(len))
        .ok_or(Error::UnexpectedEof {
            offset: offset as u64,
        })
}

/// Render bytes as `0x` + uppercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(2 + bytes.len() * 2);
    hex.push_str("0x");
    for byte in bytes {
        let _ = write!(hex, "{byte:02X}");
    }
    hex
}

/// Parse a `0x`-prefixed hex string with an even number of digits.
pub(crate) fn parse_hex(value: &str) -> std::result::Result<Vec<u8>, ()> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .ok_or(())?;
    if digits.len() % 2 != 0 {
        return Err(());
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or(())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LE: bool = false;
    const BE: bool = true;
    const UTF16: TextEncoding = TextEncoding::Utf16Le;

    #[test]
    fn test_aliases() {
        assert_eq!(DataType::from_alias("Int"), Some(DataType::S32));
        assert_eq!(DataType::from_alias("nullString"), Some(DataType::NullStr));
        assert_eq!(DataType::from_alias("hexStr"), Some(DataType::Hex));
        assert_eq!(DataType::from_alias("ushort"), Some(DataType::U16));
        assert_eq!(DataType::from_alias("vec3"), None);
    }

    #[test]
    fn test_numbers() {
        assert_eq!(DataType::U16.serialize("258", BE, UTF16).unwrap(), vec![1, 2]);
        assert_eq!(DataType::U16.serialize("258", LE, UTF16).unwrap(), vec![2, 1]);
        assert_eq!(
            DataType::S32.deserialize(&[0xFF, 0xFF, 0xFF, 0xFF], 0, LE, UTF16).unwrap(),
            ("-1".to_string(), 4)
        );
        assert_eq!(
            DataType::U64.deserialize(&[0xFF; 8], 0, BE, UTF16).unwrap(),
            (u64::MAX.to_string(), 8)
        );
        assert!(DataType::U8.serialize("256", LE, UTF16).is_err());
        assert!(DataType::S16.deserialize(&[1], 0, LE, UTF16).is_err());
    }

    #[test]
    fn test_floats() {
        let bytes = DataType::F32.serialize("1.5", BE, UTF16).unwrap();
        assert_eq!(bytes, vec![0x3F, 0xC0, 0, 0]);
        assert_eq!(
            DataType::F32.deserialize(&bytes, 0, BE, UTF16).unwrap(),
            ("1.5".to_string(), 4)
        );
    }

    #[test]
    fn test_bool() {
        assert_eq!(DataType::Bool.serialize("TRUE", LE, UTF16).unwrap(), vec![1]);
        assert_eq!(DataType::Bool.serialize("yes", LE, UTF16).unwrap(), vec![0]);
        assert_eq!(
            DataType::Bool.deserialize(&[2], 0, LE, UTF16).unwrap(),
            ("false".to_string(), 1)
        );
    }

    #[test]
    fn test_strings() {
        let bytes = DataType::Str.serialize("Hi", BE, UTF16).unwrap();
        assert_eq!(bytes, vec![0, 4, b'H', 0, b'i', 0]);
        assert_eq!(
            DataType::Str.deserialize(&bytes, 0, BE, UTF16).unwrap(),
            ("Hi".to_string(), 6)
        );

        let bytes = DataType::NullStr.serialize("A", LE, UTF16).unwrap();
        assert_eq!(bytes, vec![0x41, 0, 0, 0]);
        assert_eq!(
            DataType::NullStr.deserialize(&bytes, 0, LE, UTF16).unwrap(),
            ("A".to_string(), 4)
        );
    }

    #[test]
    fn test_hex() {
        assert_eq!(DataType::Hex.serialize("0x0aFF", LE, UTF16).unwrap(), vec![0x0A, 0xFF]);
        assert!(DataType::Hex.serialize("0x123", LE, UTF16).is_err());
        assert!(DataType::Hex.serialize("12", LE, UTF16).is_err());
        assert_eq!(
            DataType::Hex.deserialize(&[1, 2, 0xAB], 1, LE, UTF16).unwrap(),
            ("0x02AB".to_string(), 2)
        );
    }

    #[test]
    fn test_padding() {
        let padding = DataType::padding("0xCDcd").unwrap();
        assert_eq!(padding.name(), "0xcdcd");
        assert_eq!(padding.fixed_len(), Some(2));
        assert_eq!(padding.serialize("ignored", LE, UTF16).unwrap(), vec![0xCD, 0xCD]);
        assert_eq!(
            padding.deserialize(&[], 0, LE, UTF16).unwrap(),
            (String::new(), 2)
        );
        assert!(DataType::padding("0xABC").is_none());
    }
}
