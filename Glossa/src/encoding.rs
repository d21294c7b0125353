//! Text encodings used by the message formats
//!
//! Every format stores text in one of a small closed set of encodings. The
//! null width (the size of one code unit) drives terminator handling in the
//! binary readers and in function argument padding.

use crate::error::{Error, Result};

/// A text encoding used by MSBT, BMG, SARC names and the data types of function maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Utf32Le,
    Utf32Be,
    Windows1252,
    ShiftJis,
}

impl TextEncoding {
    /// Size in bytes of one code unit (and of the string terminator).
    #[must_use]
    pub fn null_width(self) -> usize {
        match self {
            Self::Utf8 | Self::Windows1252 | Self::ShiftJis => 1,
            Self::Utf16Le | Self::Utf16Be => 2,
            Self::Utf32Le | Self::Utf32Be => 4,
        }
    }

    /// Returns the same encoding family with the requested byte order.
    ///
    /// Single-byte encodings are returned unchanged.
    #[must_use]
    pub fn with_endianness(self, big_endian: bool) -> Self {
        match (self, big_endian) {
            (Self::Utf16Le | Self::Utf16Be, false) => Self::Utf16Le,
            (Self::Utf16Le | Self::Utf16Be, true) => Self::Utf16Be,
            (Self::Utf32Le | Self::Utf32Be, false) => Self::Utf32Le,
            (Self::Utf32Le | Self::Utf32Be, true) => Self::Utf32Be,
            (other, _) => other,
        }
    }

    /// The WHATWG-style name written to round-trip text headers.
    #[must_use]
    pub fn web_name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16",
            Self::Utf16Be => "utf-16BE",
            Self::Utf32Le => "utf-32",
            Self::Utf32Be => "utf-32BE",
            Self::Windows1252 => "Windows-1252",
            Self::ShiftJis => "shift_jis",
        }
    }

    /// Resolve an encoding from its web name (case-insensitive, common aliases accepted).
    #[must_use]
    pub fn from_web_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "utf-8" | "utf8" => Some(Self::Utf8),
            "utf-16" | "utf16" | "utf-16le" | "unicode" => Some(Self::Utf16Le),
            "utf-16be" | "unicodefffe" => Some(Self::Utf16Be),
            "utf-32" | "utf32" | "utf-32le" => Some(Self::Utf32Le),
            "utf-32be" => Some(Self::Utf32Be),
            "windows-1252" | "cp1252" | "latin1" | "iso-8859-1" => Some(Self::Windows1252),
            "shift_jis" | "shift-jis" | "sjis" | "cp932" => Some(Self::ShiftJis),
            _ => None,
        }
    }

    /// Encode text into bytes without a terminator or byte-order mark.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Encoding`] if the text contains characters that the
    /// encoding cannot represent.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16Le => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            Self::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Self::Utf32Le => Ok(text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect()),
            Self::Utf32Be => Ok(text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect()),
            Self::Windows1252 => encode_legacy(encoding_rs::WINDOWS_1252, self, text),
            Self::ShiftJis => encode_legacy(encoding_rs::SHIFT_JIS, self, text),
        }
    }

    /// Decode bytes into text. Malformed sequences become U+FFFD.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Self::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Self::Utf16Le => encoding_rs::UTF_16LE
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
            Self::Utf16Be => encoding_rs::UTF_16BE
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
            Self::Utf32Le => decode_utf32(bytes, u32::from_le_bytes),
            Self::Utf32Be => decode_utf32(bytes, u32::from_be_bytes),
            Self::Windows1252 => encoding_rs::WINDOWS_1252
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
            Self::ShiftJis => encoding_rs::SHIFT_JIS
                .decode_without_bom_handling(bytes)
                .0
                .into_owned(),
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.web_name())
    }
}

fn encode_legacy(
    codec: &'static encoding_rs::Encoding,
    encoding: TextEncoding,
    text: &str,
) -> Result<Vec<u8>> {
    let (bytes, _, had_errors) = codec.encode(text);
    if had_errors {
        return Err(Error::Encoding {
            encoding: encoding.web_name(),
            text: text.to_string(),
        });
    }
    Ok(bytes.into_owned())
}

fn decode_utf32(bytes: &[u8], read: fn([u8; 4]) -> u32) -> String {
    bytes
        .chunks_exact(4)
        .map(|unit| {
            let code = read([unit[0], unit[1], unit[2], unit[3]]);
            char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
        })
        .collect()
}
