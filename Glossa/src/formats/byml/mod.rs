//! BYML binary YAML documents (read-only)
//!
//! A tree of dictionaries, arrays and scalars. Keys and string values are
//! stored once in two string tables and referenced by index.

mod reader;

pub use reader::{parse_byml_bytes, read_byml};

use indexmap::IndexMap;

/// Big-endian magic
pub const BYML_MAGIC_BE: &[u8; 2] = b"BY";

/// Little-endian magic
pub const BYML_MAGIC_LE: &[u8; 2] = b"YB";

/// Node type ids
pub mod node_type {
    pub const HASH_DICTIONARY: u8 = 0x20;
    pub const HASH_VALUE_DICTIONARY: u8 = 0x21;
    pub const STRING: u8 = 0xA0;
    pub const BINARY: u8 = 0xA1;
    pub const ALIGNED_BINARY: u8 = 0xA2;
    pub const ARRAY: u8 = 0xC0;
    pub const DICTIONARY: u8 = 0xC1;
    pub const STRING_TABLE: u8 = 0xC2;
    pub const PATH_TABLE: u8 = 0xC3;
    pub const TYPED_ARRAY: u8 = 0xC8;
    pub const BOOL: u8 = 0xD0;
    pub const I32: u8 = 0xD1;
    pub const F32: u8 = 0xD2;
    pub const U32: u8 = 0xD3;
    pub const I64: u8 = 0xD4;
    pub const U64: u8 = 0xD5;
    pub const F64: u8 = 0xD6;
    pub const NULL: u8 = 0xFF;

    /// Whether values of this type are stored as an offset to the node.
    #[must_use]
    pub fn is_container(node_type: u8) -> bool {
        matches!(
            node_type,
            HASH_DICTIONARY | HASH_VALUE_DICTIONARY | ARRAY | DICTIONARY | TYPED_ARRAY
        )
    }
}

/// A path table entry
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PathPoint {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// A BYML value
#[derive(Debug, Clone, PartialEq)]
pub enum BymlNode {
    /// Dictionary keyed by a 32-bit hash, rendered as `0x` + hex
    HashDictionary(IndexMap<String, BymlNode>),
    HashValueDictionary(IndexMap<String, BymlNode>),
    String(String),
    Binary(Vec<u8>),
    AlignedBinary { alignment: u32, data: Vec<u8> },
    /// Path table entry, in place of binary data when the document has a path table
    Path(PathPoint),
    Array(Vec<BymlNode>),
    Dictionary(IndexMap<String, BymlNode>),
    Bool(bool),
    I32(i32),
    F32(f32),
    U32(u32),
    I64(i64),
    U64(u64),
    F64(f64),
    Null,
}

impl BymlNode {
    /// Browse the tree with a `/`-separated path.
    ///
    /// Dictionary segments are keys, array segments are indices. Returns
    /// `None` when a segment is missing or a scalar is reached early.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&BymlNode> {
        path.split('/').try_fold(self, |node, segment| match node {
            Self::Dictionary(map) | Self::HashDictionary(map) | Self::HashValueDictionary(map) => {
                map.get(segment)
            }
            Self::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
    }

    /// Short name of the node kind
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::HashDictionary(_) => "hash dictionary",
            Self::HashValueDictionary(_) => "hash value dictionary",
            Self::String(_) => "string",
            Self::Binary(_) => "binary",
            Self::AlignedBinary { .. } => "aligned binary",
            Self::Path(_) => "path",
            Self::Array(_) => "array",
            Self::Dictionary(_) => "dictionary",
            Self::Bool(_) => "bool",
            Self::I32(_) => "i32",
            Self::F32(_) => "f32",
            Self::U32(_) => "u32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F64(_) => "f64",
            Self::Null => "null",
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number of direct children; 0 for scalars
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Dictionary(map) | Self::HashDictionary(map) | Self::HashValueDictionary(map) => {
                map.len()
            }
            Self::Array(items) => items.len(),
            _ => 0,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A parsed BYML document
#[derive(Debug, Clone, PartialEq)]
pub struct BymlFile {
    pub big_endian: bool,
    pub version: u16,
    pub root: BymlNode,
}

impl BymlFile {
    /// Check for the `BY` or `YB` magic.
    #[must_use]
    pub fn can_parse(data: &[u8]) -> bool {
        data.starts_with(BYML_MAGIC_BE) || data.starts_with(BYML_MAGIC_LE)
    }

    /// Browse the root node; see [`BymlNode::find`].
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&BymlNode> {
        self.root.find(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn u24(value: u32, be: bool) -> Vec<u8> {
        let bytes = value.to_le_bytes();
        if be {
            vec![bytes[2], bytes[1], bytes[0]]
        } else {
            bytes[..3].to_vec()
        }
    }

    fn u32b(value: u32, be: bool) -> [u8; 4] {
        if be { value.to_be_bytes() } else { value.to_le_bytes() }
    }

    fn put(buf: &mut Vec<u8>, offset: usize, bytes: &[u8]) {
        if buf.len() < offset + bytes.len() {
            buf.resize(offset + bytes.len(), 0);
        }
        buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn node_header(node_type: u8, count: u32, be: bool) -> Vec<u8> {
        let mut header = vec![node_type];
        header.extend(u24(count, be));
        header
    }

    /// `{ big: u64, list: [5, true, { x: 1.5 }], name: "hello" }`
    fn sample(be: bool) -> Vec<u8> {
        let mut buf = Vec::new();
        put(&mut buf, 0, if be { b"BY\x00\x02" } else { b"YB\x02\x00" });
        put(&mut buf, 0x04, &u32b(0x10, be));
        put(&mut buf, 0x08, &u32b(0x38, be));
        put(&mut buf, 0x0C, &u32b(0x4C, be));

        // key table
        put(&mut buf, 0x10, &node_header(node_type::STRING_TABLE, 4, be));
        for (i, offset) in [24u32, 28, 33, 38, 40].iter().enumerate() {
            put(&mut buf, 0x14 + i * 4, &u32b(*offset, be));
        }
        put(&mut buf, 0x28, b"big\0list\0name\0x\0");

        // value string table
        put(&mut buf, 0x38, &node_header(node_type::STRING_TABLE, 1, be));
        put(&mut buf, 0x3C, &u32b(12, be));
        put(&mut buf, 0x40, &u32b(18, be));
        put(&mut buf, 0x44, b"hello\0");

        // root dictionary
        put(&mut buf, 0x4C, &node_header(node_type::DICTIONARY, 3, be));
        let entries = [
            (0, node_type::U64, 0x88),
            (1, node_type::ARRAY, 0x68),
            (2, node_type::STRING, 0),
        ];
        for (i, (key, kind, value)) in entries.iter().enumerate() {
            let offset = 0x50 + i * 8;
            put(&mut buf, offset, &u24(*key, be));
            put(&mut buf, offset + 3, &[*kind]);
            put(&mut buf, offset + 4, &u32b(*value, be));
        }

        // array
        put(&mut buf, 0x68, &node_header(node_type::ARRAY, 3, be));
        put(&mut buf, 0x6C, &[node_type::I32, node_type::BOOL, node_type::DICTIONARY]);
        put(&mut buf, 0x70, &u32b(5, be));
        put(&mut buf, 0x74, &u32b(1, be));
        put(&mut buf, 0x78, &u32b(0x7C, be));

        // inner dictionary
        put(&mut buf, 0x7C, &node_header(node_type::DICTIONARY, 1, be));
        put(&mut buf, 0x80, &u24(3, be));
        put(&mut buf, 0x83, &[node_type::F32]);
        put(&mut buf, 0x84, &u32b(1.5f32.to_bits(), be));

        let big = 0x0102_0304_0506_0708u64;
        put(&mut buf, 0x88, &if be { big.to_be_bytes() } else { big.to_le_bytes() });
        buf
    }

    #[test]
    fn test_parse_document() {
        let file = parse_byml_bytes(&sample(false)).unwrap();
        assert!(!file.big_endian);
        assert_eq!(file.version, 2);
        assert_eq!(file.root.len(), 3);
        assert_eq!(file.find("name").and_then(BymlNode::as_str), Some("hello"));
        assert_eq!(file.find("big"), Some(&BymlNode::U64(0x0102_0304_0506_0708)));
        assert_eq!(file.find("list/0"), Some(&BymlNode::I32(5)));
        assert_eq!(file.find("list/1"), Some(&BymlNode::Bool(true)));
        assert_eq!(file.find("list/2/x"), Some(&BymlNode::F32(1.5)));
        assert_eq!(file.find("list/9"), None);
        assert_eq!(file.find("name/x"), None);

        let BymlNode::Dictionary(root) = &file.root else {
            panic!("root is not a dictionary");
        };
        let keys: Vec<&str> = root.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["big", "list", "name"]);
    }

    #[test]
    fn test_big_endian_matches_little_endian() {
        let be = parse_byml_bytes(&sample(true)).unwrap();
        let le = parse_byml_bytes(&sample(false)).unwrap();
        assert!(be.big_endian);
        assert_eq!(be.root, le.root);
    }

    #[test]
    fn test_null_root() {
        let file = parse_byml_bytes(b"YB\x03\x00\0\0\0\0\0\0\0\0\0\0\0\0").unwrap();
        assert_eq!(file.root, BymlNode::Null);
        assert_eq!(file.version, 3);
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse_byml_bytes(b"XX\x02\x00"),
            Err(crate::Error::InvalidBymlMagic([b'X', b'X']))
        ));

        let mut data = sample(false);
        data[0x6C] = 0x99;
        assert!(matches!(
            parse_byml_bytes(&data),
            Err(crate::Error::UnknownBymlNode(0x99))
        ));
    }
}
