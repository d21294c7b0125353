//! BMG message files
//!
//! `MESGbmg1` files store message attributes in `INF1`, text in `DAT1` and
//! optional numeric message ids in `MID1`. Sections are aligned to 32 bytes.

mod reader;
mod writer;

pub use reader::{parse_bmg_bytes, read_bmg};
pub use writer::{compile_bmg, write_bmg, write_bmg_to};

use crate::encoding::TextEncoding;
use crate::formats::Message;

/// File magic
pub const BMG_MAGIC: &[u8; 8] = b"MESGbmg1";

/// Control unit starting a function call in `DAT1`
pub const FUNCTION_START: u32 = 0x1A;

/// A parsed BMG file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmgFile {
    pub big_endian: bool,
    pub encoding: TextEncoding,
    pub file_id: u16,
    pub default_color: u8,
    pub has_mid1: bool,
    /// The two format bytes of `MID1`.
    pub mid1_format: Vec<u8>,
    /// Caller-supplied language tag; not stored in the file.
    pub language: Option<String>,
    pub messages: Vec<Message>,
}

impl Default for BmgFile {
    fn default() -> Self {
        Self {
            big_endian: false,
            encoding: TextEncoding::Windows1252,
            file_id: 0,
            default_color: 0,
            has_mid1: false,
            mid1_format: vec![0; 2],
            language: None,
            messages: Vec::new(),
        }
    }
}

impl BmgFile {
    /// Check for the `MESGbmg1` magic.
    #[must_use]
    pub fn can_parse(data: &[u8]) -> bool {
        data.starts_with(BMG_MAGIC)
    }

    /// Find a message by label
    #[must_use]
    pub fn get_message(&self, label: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.label == label)
    }
}

/// Encoding byte stored at 0x10.
pub(crate) fn encoding_code(encoding: TextEncoding) -> Option<u8> {
    match encoding {
        TextEncoding::Windows1252 => Some(1),
        TextEncoding::Utf16Le | TextEncoding::Utf16Be => Some(2),
        TextEncoding::ShiftJis => Some(3),
        TextEncoding::Utf8 => Some(4),
        TextEncoding::Utf32Le | TextEncoding::Utf32Be => None,
    }
}

/// Encoding for the byte at 0x10. Unknown values fall back to UTF-16.
pub(crate) fn encoding_from_code(code: u8, big_endian: bool) -> TextEncoding {
    match code {
        0 | 1 => TextEncoding::Windows1252,
        3 => TextEncoding::ShiftJis,
        4 => TextEncoding::Utf8,
        _ => TextEncoding::Utf16Le.with_endianness(big_endian),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FunctionCall;
    use pretty_assertions::assert_eq;

    fn sample(encoding: TextEncoding, big_endian: bool) -> BmgFile {
        BmgFile {
            big_endian,
            encoding: encoding.with_endianness(big_endian),
            file_id: 7,
            default_color: 2,
            has_mid1: true,
            mid1_format: vec![0x10, 0x00],
            messages: vec![
                Message {
                    label: "100".into(),
                    attribute: Some(vec![1, 2, 3, 4]),
                    text: "Caf\u{e9} {{0}}time".into(),
                    functions: vec![FunctionCall {
                        group: 255,
                        type_id: 0x0102,
                        args: vec![9, 8],
                    }],
                    ..Message::default()
                },
                Message {
                    label: "205".into(),
                    attribute: Some(vec![0; 4]),
                    text: "{{0}}".into(),
                    functions: vec![FunctionCall {
                        group: 1,
                        type_id: 0,
                        args: Vec::new(),
                    }],
                    ..Message::default()
                },
            ],
            ..BmgFile::default()
        }
    }

    #[test]
    fn test_round_trip_single_byte() {
        let file = sample(TextEncoding::Windows1252, false);
        let bytes = compile_bmg(&file).unwrap();
        assert_eq!(bytes.len() % 32, 0);
        assert_eq!(&bytes[8..12], &(bytes.len() as u32).to_le_bytes());
        let parsed = parse_bmg_bytes(&bytes, None).unwrap();
        assert_eq!(parsed, file);
        assert_eq!(compile_bmg(&parsed).unwrap(), bytes);
    }

    #[test]
    fn test_round_trip_double_byte() {
        let file = sample(TextEncoding::Utf16Le, false);
        let bytes = compile_bmg(&file).unwrap();
        let parsed = parse_bmg_bytes(&bytes, Some("JPja")).unwrap();
        assert_eq!(parsed.language.as_deref(), Some("JPja"));
        assert_eq!(parsed.messages, file.messages);
        assert_eq!(compile_bmg(&parsed).unwrap(), bytes);
    }

    #[test]
    fn test_big_endian_matches_little_endian() {
        let le = parse_bmg_bytes(&compile_bmg(&sample(TextEncoding::Utf16Le, false)).unwrap(), None).unwrap();
        let be = parse_bmg_bytes(&compile_bmg(&sample(TextEncoding::Utf16Le, true)).unwrap(), None).unwrap();
        assert!(be.big_endian);
        assert_eq!(be.encoding, TextEncoding::Utf16Be);
        assert_eq!(be.messages, le.messages);
    }

    #[test]
    fn test_layout() {
        let file = BmgFile {
            messages: vec![Message {
                label: "0".into(),
                text: "Hi".into(),
                ..Message::default()
            }],
            ..BmgFile::default()
        };
        let bytes = compile_bmg(&file).unwrap();
        assert_eq!(&bytes[..8], BMG_MAGIC);
        assert_eq!(&bytes[12..17], &[2, 0, 0, 0, 1]);
        assert_eq!(&bytes[0x20..0x24], b"INF1");
        // count, entry size, file id, colour, pad, then the DAT1 offset
        assert_eq!(&bytes[0x28..0x34], &[1, 0, 4, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(&bytes[0x40..0x44], b"DAT1");
        assert_eq!(&bytes[0x48..0x4C], &[0, b'H', b'i', 0]);

        let parsed = parse_bmg_bytes(&bytes, None).unwrap();
        assert_eq!(parsed.messages[0].attribute, None);
        assert_eq!(parsed.messages[0].text, "Hi");
    }

    #[test]
    fn test_invalid_labels_and_encodings() {
        let mut file = sample(TextEncoding::Utf8, false);
        file.messages[0].label = "greeting".into();
        assert!(matches!(
            compile_bmg(&file),
            Err(crate::Error::InvalidBmgLabel(label)) if label == "greeting"
        ));

        let file = sample(TextEncoding::Utf32Le, false);
        assert!(matches!(
            compile_bmg(&file),
            Err(crate::Error::UnsupportedEncoding { .. })
        ));
        assert!(!BmgFile::can_parse(b"MESGbmg2"));
    }
}
