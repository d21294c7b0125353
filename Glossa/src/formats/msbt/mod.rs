//! MSBT message studio binary text
//!
//! A `MsgStdBn` file holds a list of messages in a `TXT2` section, with
//! optional labels (`LBL1`), numeric ids (`NLI1`), attributes (`ATR1`),
//! styles (`TSY1`) and an opaque `ATO1` block.

mod reader;
mod writer;

pub use reader::{parse_msbt_bytes, read_msbt};
pub use writer::{compile_msbt, write_msbt, write_msbt_to};

use crate::encoding::TextEncoding;
use crate::formats::Message;

/// File magic
pub const MSBT_MAGIC: &[u8; 8] = b"MsgStdBn";

/// Size of the file header; sections start here
pub const HEADER_SIZE: u64 = 0x20;

/// Largest `LBL1` hash group count accepted when writing
pub const MAX_LABEL_GROUPS: u32 = 0xFFFF;

/// Control unit starting a function call in `TXT2`
pub const FUNCTION_START: u32 = 0x0E;

/// Control unit of a closing tag in `TXT2`
pub const FUNCTION_END: u32 = 0x0F;

/// A parsed MSBT file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MsbtFile {
    pub big_endian: bool,
    pub version: u8,
    /// Text encoding, with the file's byte order applied.
    pub encoding: TextEncoding,
    pub has_nli1: bool,
    /// `NLI1` as `(id, message index)` pairs in file order. Only set when the
    /// table is not the one [`Message::index`] gives in message order, such
    /// as an unsorted table or several ids for one message.
    pub nli1_entries: Vec<(u32, u32)>,
    pub has_lbl1: bool,
    /// Number of hash buckets in `LBL1`.
    pub label_groups: u32,
    pub has_atr1: bool,
    /// `ATR1` stores one string per message instead of raw attribute bytes.
    pub has_attribute_text: bool,
    /// Bytes between the attribute table and the end of `ATR1`.
    pub additional_attribute_data: Vec<u8>,
    pub has_ato1: bool,
    pub ato1_data: Vec<u8>,
    pub has_tsy1: bool,
    /// Caller-supplied language tag; not stored in the file.
    pub language: Option<String>,
    pub messages: Vec<Message>,
}

impl Default for MsbtFile {
    fn default() -> Self {
        Self {
            big_endian: false,
            version: 3,
            encoding: TextEncoding::Utf16Le,
            has_nli1: false,
            nli1_entries: Vec::new(),
            has_lbl1: false,
            label_groups: 0,
            has_atr1: false,
            has_attribute_text: false,
            additional_attribute_data: Vec::new(),
            has_ato1: false,
            ato1_data: Vec::new(),
            has_tsy1: false,
            language: None,
            messages: Vec::new(),
        }
    }
}

impl MsbtFile {
    /// Check for the `MsgStdBn` magic.
    #[must_use]
    pub fn can_parse(data: &[u8]) -> bool {
        data.starts_with(MSBT_MAGIC)
    }

    /// Find a message by label
    #[must_use]
    pub fn get_message(&self, label: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.label == label)
    }

    pub fn get_message_mut(&mut self, label: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.label == label)
    }

    /// `NLI1` pairs built from the message ids, in message order
    #[must_use]
    pub fn derived_nli1_entries(&self) -> Vec<(u32, u32)> {
        self.messages
            .iter()
            .enumerate()
            .filter_map(|(i, m)| m.index.map(|id| (id, i as u32)))
            .collect()
    }

    /// `NLI1` pairs the file will be written with.
    ///
    /// [`nli1_entries`](Self::nli1_entries) wins while the last id it gives
    /// each message still equals that message's index; after an edit the
    /// table is rebuilt from the messages.
    #[must_use]
    pub fn nli1_table(&self) -> Vec<(u32, u32)> {
        if !self.nli1_entries.is_empty() && self.nli1_entries_match_messages() {
            self.nli1_entries.clone()
        } else {
            self.derived_nli1_entries()
        }
    }

    fn nli1_entries_match_messages(&self) -> bool {
        let mut ids = vec![None; self.messages.len()];
        for &(id, index) in &self.nli1_entries {
            match ids.get_mut(index as usize) {
                Some(slot) => *slot = Some(id),
                None => return false,
            }
        }
        ids.iter().zip(&self.messages).all(|(id, m)| *id == m.index)
    }

    /// Number of sections the file will be written with
    #[must_use]
    pub fn section_count(&self) -> u16 {
        1 + [
            self.has_lbl1,
            self.has_nli1,
            self.has_ato1,
            self.has_atr1,
            self.has_tsy1,
        ]
        .iter()
        .filter(|&&present| present)
        .count() as u16
    }
}

/// Encoding byte stored at 0x0C.
pub(crate) fn encoding_code(encoding: TextEncoding) -> Option<u8> {
    match encoding {
        TextEncoding::Utf8 => Some(0),
        TextEncoding::Utf16Le | TextEncoding::Utf16Be => Some(1),
        TextEncoding::Utf32Le | TextEncoding::Utf32Be => Some(2),
        TextEncoding::Windows1252 | TextEncoding::ShiftJis => None,
    }
}

/// Encoding for the byte at 0x0C. Unknown values fall back to UTF-16.
pub(crate) fn encoding_from_code(code: u8, big_endian: bool) -> TextEncoding {
    let encoding = match code {
        0 => TextEncoding::Utf8,
        2 => TextEncoding::Utf32Le,
        _ => TextEncoding::Utf16Le,
    };
    encoding.with_endianness(big_endian)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::FunctionCall;
    use pretty_assertions::assert_eq;

    fn sample(big_endian: bool) -> MsbtFile {
        let messages = vec![
            Message {
                label: "greeting".into(),
                index: Some(10),
                attribute_text: Some("npc".into()),
                style_index: Some(1),
                text: "Hello {{0}}world{{1}}!".into(),
                functions: vec![
                    FunctionCall {
                        group: 0,
                        type_id: 3,
                        args: vec![1, 0],
                    },
                    FunctionCall {
                        group: 0x0F,
                        type_id: 0,
                        args: vec![0, 0, 3, 0],
                    },
                ],
                ..Message::default()
            },
            Message {
                label: "farewell".into(),
                index: Some(11),
                attribute_text: Some(String::new()),
                style_index: Some(0),
                text: "Bye\nnow".into(),
                ..Message::default()
            },
        ];

        MsbtFile {
            big_endian,
            encoding: TextEncoding::Utf16Le.with_endianness(big_endian),
            has_nli1: true,
            has_lbl1: true,
            label_groups: 101,
            has_atr1: true,
            has_attribute_text: true,
            has_ato1: true,
            ato1_data: vec![1, 2, 3, 4, 5],
            has_tsy1: true,
            messages,
            ..MsbtFile::default()
        }
    }

    #[test]
    fn test_round_trip() {
        let file = sample(false);
        let bytes = compile_msbt(&file).unwrap();
        let parsed = parse_msbt_bytes(&bytes, None).unwrap();
        assert_eq!(parsed, file);
        assert_eq!(compile_msbt(&parsed).unwrap(), bytes);
    }

    #[test]
    fn test_big_endian_matches_little_endian() {
        let le = parse_msbt_bytes(&compile_msbt(&sample(false)).unwrap(), None).unwrap();
        let be_bytes = compile_msbt(&sample(true)).unwrap();
        assert_eq!(&be_bytes[8..10], &[0xFE, 0xFF]);
        let be = parse_msbt_bytes(&be_bytes, None).unwrap();
        assert!(be.big_endian);
        assert_eq!(be.messages, le.messages);
    }

    #[test]
    fn test_minimal_layout() {
        let file = MsbtFile {
            messages: vec![Message {
                text: "A".into(),
                ..Message::default()
            }],
            ..MsbtFile::default()
        };
        let bytes = compile_msbt(&file).unwrap();
        assert_eq!(&bytes[..8], MSBT_MAGIC);
        assert_eq!(&bytes[8..14], &[0xFF, 0xFE, 0, 0, 1, 3]);
        assert_eq!(&bytes[14..16], &[1, 0]);
        assert_eq!(&bytes[0x12..0x16], &[0x40, 0, 0, 0]);
        assert_eq!(&bytes[0x20..0x24], b"TXT2");
        assert_eq!(&bytes[0x24..0x28], &[12, 0, 0, 0]);
        assert_eq!(&bytes[0x30..0x3C], &[1, 0, 0, 0, 8, 0, 0, 0, 0x41, 0, 0, 0]);
        assert_eq!(&bytes[0x3C..], &[0xAB; 4]);

        let parsed = parse_msbt_bytes(&bytes, Some("USen")).unwrap();
        assert_eq!(parsed.language.as_deref(), Some("USen"));
        assert_eq!(parsed.messages[0].label, "0");
        assert_eq!(parsed.messages[0].text, "A");
    }

    #[test]
    fn test_index_labels_are_zero_padded() {
        let file = MsbtFile {
            encoding: TextEncoding::Utf8,
            messages: (0..12)
                .map(|i| Message {
                    text: format!("m{i}"),
                    ..Message::default()
                })
                .collect(),
            ..MsbtFile::default()
        };
        let parsed = parse_msbt_bytes(&compile_msbt(&file).unwrap(), None).unwrap();
        assert_eq!(parsed.messages[0].label, "00");
        assert_eq!(parsed.messages[11].label, "11");
        assert_eq!(parsed.messages[11].text, "m11");
    }

    #[test]
    fn test_attribute_bytes() {
        let mut file = MsbtFile {
            has_atr1: true,
            additional_attribute_data: vec![0xAA, 0xBB],
            messages: vec![
                Message {
                    attribute: Some(vec![1, 2, 3]),
                    text: "x".into(),
                    ..Message::default()
                },
                Message {
                    attribute: Some(vec![4, 5, 6]),
                    text: "y".into(),
                    ..Message::default()
                },
            ],
            ..MsbtFile::default()
        };
        let parsed = parse_msbt_bytes(&compile_msbt(&file).unwrap(), None).unwrap();
        assert!(!parsed.has_attribute_text);
        assert_eq!(parsed.additional_attribute_data, vec![0xAA, 0xBB]);
        assert_eq!(parsed.messages[1].attribute, Some(vec![4, 5, 6]));

        file.messages[1].attribute = Some(vec![1]);
        assert!(compile_msbt(&file).is_err());
    }

    /// Byte offset of the first entry of the `NLI1` table in `bytes`.
    fn nli1_entries_offset(bytes: &[u8]) -> usize {
        let section = bytes.windows(4).position(|w| w == b"NLI1").unwrap();
        section + 0x10 + 4
    }

    #[test]
    fn test_unsorted_nli1_table_round_trips() {
        let bytes = compile_msbt(&sample(false)).unwrap();
        let entries = nli1_entries_offset(&bytes);
        assert_eq!(&bytes[entries..entries + 8], &[10, 0, 0, 0, 0, 0, 0, 0]);

        let mut swapped = bytes.clone();
        swapped[entries..entries + 8].copy_from_slice(&bytes[entries + 8..entries + 16]);
        swapped[entries + 8..entries + 16].copy_from_slice(&bytes[entries..entries + 8]);

        let parsed = parse_msbt_bytes(&swapped, None).unwrap();
        assert_eq!(parsed.messages[0].index, Some(10));
        assert_eq!(parsed.messages[1].index, Some(11));
        assert_eq!(parsed.nli1_entries, vec![(11, 1), (10, 0)]);
        assert_eq!(compile_msbt(&parsed).unwrap(), swapped);

        let sorted = parse_msbt_bytes(&bytes, None).unwrap();
        assert!(sorted.nli1_entries.is_empty());
    }

    #[test]
    fn test_nli1_keeps_every_id_of_a_message() {
        let mut file = sample(false);
        file.nli1_entries = vec![(7, 0), (11, 1), (10, 0)];
        let bytes = compile_msbt(&file).unwrap();
        let entries = nli1_entries_offset(&bytes);
        assert_eq!(&bytes[entries - 4..entries], &[3, 0, 0, 0]);

        let parsed = parse_msbt_bytes(&bytes, None).unwrap();
        assert_eq!(parsed, file);
        assert_eq!(compile_msbt(&parsed).unwrap(), bytes);

        // an edited id no longer matches the stored table
        file.messages[0].index = Some(99);
        assert_eq!(file.nli1_table(), vec![(99, 0), (11, 1)]);
    }

    #[test]
    fn test_label_group_count_is_bounded() {
        let mut file = sample(false);
        file.label_groups = u32::MAX;
        assert!(matches!(compile_msbt(&file), Err(crate::Error::InvalidFormat(_))));

        file.label_groups = MAX_LABEL_GROUPS + 1;
        assert!(matches!(compile_msbt(&file), Err(crate::Error::InvalidFormat(_))));

        file.label_groups = MAX_LABEL_GROUPS;
        assert!(compile_msbt(&file).is_ok());
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert!(!MsbtFile::can_parse(b"MsgPrjBn"));
        assert!(matches!(
            parse_msbt_bytes(b"MsgPrjBn", None),
            Err(crate::Error::InvalidMsbtMagic)
        ));

        let mut file = sample(false);
        file.label_groups = 0;
        assert!(compile_msbt(&file).is_err());

        file = sample(false);
        file.encoding = TextEncoding::ShiftJis;
        assert!(matches!(
            compile_msbt(&file),
            Err(crate::Error::UnsupportedEncoding { .. })
        ));
    }
}
