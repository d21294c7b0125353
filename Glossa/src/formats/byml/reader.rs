//! BYML document reading

#![allow(clippy::cast_possible_truncation)]

use super::{BymlFile, BymlNode, PathPoint, node_type};
use crate::binary::BinaryReader;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::NodeBudget;
use indexmap::IndexMap;
use std::path::Path;

/// Deepest container nesting accepted before the document is treated as cyclic
const MAX_DEPTH: usize = 256;

/// Read a BYML document from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
/// Returns [`Error::InvalidBymlMagic`] if the file does not start with `BY` or `YB`.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidBymlMagic`]: crate::Error::InvalidBymlMagic
pub fn read_byml<P: AsRef<Path>>(path: P) -> Result<BymlFile> {
    let data = std::fs::read(path)?;
    parse_byml_bytes(&data)
}

/// Parse a BYML document from bytes
///
/// # Errors
///
/// Returns [`Error::InvalidBymlMagic`] if the data does not start with `BY` or `YB`.
/// Returns [`Error::UnknownBymlNode`] for an unsupported node type.
/// Returns [`Error::InvalidFormat`] for string indices out of range or cyclic nodes.
///
/// [`Error::InvalidBymlMagic`]: crate::Error::InvalidBymlMagic
/// [`Error::UnknownBymlNode`]: crate::Error::UnknownBymlNode
/// [`Error::InvalidFormat`]: crate::Error::InvalidFormat
pub fn parse_byml_bytes(data: &[u8]) -> Result<BymlFile> {
    if !BymlFile::can_parse(data) {
        let mut magic = [0u8; 2];
        for (slot, byte) in magic.iter_mut().zip(data) {
            *slot = *byte;
        }
        return Err(Error::InvalidBymlMagic(magic));
    }

    let big_endian = data.starts_with(super::BYML_MAGIC_BE);
    let mut reader = BinaryReader::with_endianness(data, big_endian);
    let version = reader.read_u16_at(0x02)?;

    let keys = read_string_table(&mut reader, 0x04)?;
    let strings = read_string_table(&mut reader, 0x08)?;
    let paths = read_path_table(&mut reader)?;

    let root_offset = reader.read_u32_at(if paths.is_some() { 0x10 } else { 0x0C })?;
    let mut parser = NodeParser {
        reader,
        budget: NodeBudget::for_data("BYML", data),
        keys,
        strings,
        paths,
    };

    let root = if root_offset == 0 {
        BymlNode::Null
    } else {
        let offset = u64::from(root_offset);
        let kind = parser.reader.read_u8_at(offset)?;
        parser.read_node(kind, offset, 0)?
    };

    tracing::debug!("Parsed BYML v{version} with a {} root", root.type_name());
    Ok(BymlFile {
        big_endian,
        version,
        root,
    })
}

/// Read the string table whose offset is stored at `header_field`.
fn read_string_table(reader: &mut BinaryReader<'_>, header_field: u64) -> Result<Vec<String>> {
    let table = u64::from(reader.read_u32_at(header_field)?);
    if table == 0 {
        return Ok(Vec::new());
    }

    let count = reader.read_u24_at(table + 1)? as usize;
    let offsets = (0..=count)
        .map(|_| reader.read_u32().map(u64::from))
        .collect::<Result<Vec<_>>>()?;

    offsets
        .windows(2)
        .map(|pair| {
            let len = pair[1].saturating_sub(pair[0]) as usize;
            reader.read_string_at(table + pair[0], len, TextEncoding::Utf8)
        })
        .collect()
}

/// Read the optional path table referenced at 0x0C.
fn read_path_table(reader: &mut BinaryReader<'_>) -> Result<Option<Vec<PathPoint>>> {
    let table = u64::from(reader.read_u32_at(0x0C)?);
    if table == 0 || reader.read_u8_at(table).ok() != Some(node_type::PATH_TABLE) {
        return Ok(None);
    }

    let count = reader.read_u24_at(table + 1)? as usize;
    let offsets = (0..=count)
        .map(|_| reader.read_u32().map(u64::from))
        .collect::<Result<Vec<_>>>()?;

    let mut points = Vec::with_capacity(count);
    for offset in &offsets[..count] {
        reader.jump_to(*offset);
        let mut values = [0f32; 6];
        for value in &mut values {
            *value = reader.read_f32()?;
        }
        points.push(PathPoint {
            position: [values[0], values[1], values[2]],
            normal: [values[3], values[4], values[5]],
        });
    }
    Ok(Some(points))
}

struct NodeParser<'a> {
    reader: BinaryReader<'a>,
    budget: NodeBudget,
    keys: Vec<String>,
    strings: Vec<String>,
    paths: Option<Vec<PathPoint>>,
}

impl NodeParser<'_> {
    /// Read a node of type `kind` whose data is at `offset`.
    fn read_node(&mut self, kind: u8, offset: u64, depth: usize) -> Result<BymlNode> {
        if depth > MAX_DEPTH {
            return Err(Error::InvalidFormat(format!(
                "BYML nodes nested deeper than {MAX_DEPTH} levels at 0x{offset:X}"
            )));
        }
        self.budget.take(offset)?;

        Ok(match kind {
            node_type::HASH_DICTIONARY => {
                BymlNode::HashDictionary(self.read_hash_dictionary(offset, depth)?)
            }
            node_type::HASH_VALUE_DICTIONARY => {
                BymlNode::HashValueDictionary(self.read_hash_value_dictionary(offset, depth)?)
            }
            node_type::STRING => {
                let index = self.reader.read_u32_at(offset)?;
                BymlNode::String(lookup(&self.strings, index, "string")?.to_string())
            }
            node_type::BINARY => match &self.paths {
                Some(paths) => {
                    let index = self.reader.read_u32_at(offset)?;
                    let point = paths.get(index as usize).copied().ok_or_else(|| {
                        Error::InvalidFormat(format!("BYML path index {index} out of range"))
                    })?;
                    BymlNode::Path(point)
                }
                None => {
                    let start = u64::from(self.reader.read_u32_at(offset)?);
                    let size = self.reader.read_u32_at(start)? as usize;
                    BymlNode::Binary(self.reader.read_bytes(size)?.to_vec())
                }
            },
            node_type::ALIGNED_BINARY => {
                let start = u64::from(self.reader.read_u32_at(offset)?);
                let size = self.reader.read_u32_at(start)? as usize;
                let alignment = self.reader.read_u32()?;
                BymlNode::AlignedBinary {
                    alignment,
                    data: self.reader.read_bytes(size)?.to_vec(),
                }
            }
            node_type::ARRAY | node_type::TYPED_ARRAY => {
                BymlNode::Array(self.read_array(offset, depth)?)
            }
            node_type::DICTIONARY => BymlNode::Dictionary(self.read_dictionary(offset, depth)?),
            node_type::BOOL => BymlNode::Bool(self.reader.read_u32_at(offset)? == 1),
            node_type::I32 => BymlNode::I32(self.reader.read_i32_at(offset)?),
            node_type::F32 => BymlNode::F32(self.reader.read_f32_at(offset)?),
            node_type::U32 => BymlNode::U32(self.reader.read_u32_at(offset)?),
            node_type::I64 => {
                let at = self.value_offset(offset)?;
                BymlNode::I64(self.reader.read_i64_at(at)?)
            }
            node_type::U64 => {
                let at = self.value_offset(offset)?;
                BymlNode::U64(self.reader.read_u64_at(at)?)
            }
            node_type::F64 => {
                let at = self.value_offset(offset)?;
                BymlNode::F64(self.reader.read_f64_at(at)?)
            }
            node_type::NULL => BymlNode::Null,
            other => return Err(Error::UnknownBymlNode(other)),
        })
    }

    /// Follow the 32-bit offset stored at `slot`.
    fn value_offset(&mut self, slot: u64) -> Result<u64> {
        Ok(u64::from(self.reader.read_u32_at(slot)?))
    }

    /// Read a value slot: containers store an offset, scalars are inline.
    fn read_slot(&mut self, kind: u8, slot: u64, depth: usize) -> Result<BymlNode> {
        let offset = if node_type::is_container(kind) {
            self.value_offset(slot)?
        } else {
            slot
        };
        self.read_node(kind, offset, depth + 1)
    }

    fn read_array(&mut self, offset: u64, depth: usize) -> Result<Vec<BymlNode>> {
        let count = self.reader.read_u24_at(offset + 1)? as usize;
        let types = self.reader.read_bytes(count)?;
        let values = crate::binary::align_up(offset + 4 + count as u64, 4);

        types
            .iter()
            .enumerate()
            .map(|(i, kind)| self.read_slot(*kind, values + i as u64 * 4, depth))
            .collect()
    }

    fn read_dictionary(&mut self, offset: u64, depth: usize) -> Result<IndexMap<String, BymlNode>> {
        let count = u64::from(self.reader.read_u24_at(offset + 1)?);
        let mut map = IndexMap::with_capacity(count as usize);

        for i in 0..count {
            let entry = offset + 4 + i * 8;
            let key = self.reader.read_u24_at(entry)?;
            let kind = self.reader.read_u8()?;
            let name = lookup(&self.keys, key, "key")?.to_string();
            let value = self.read_slot(kind, entry + 4, depth)?;
            map.insert(name, value);
        }
        Ok(map)
    }

    fn read_hash_dictionary(
        &mut self,
        offset: u64,
        depth: usize,
    ) -> Result<IndexMap<String, BymlNode>> {
        let count = u64::from(self.reader.read_u24_at(offset + 1)?);
        let types = self.reader.read_bytes_at(offset + 4 + 8 * count, count as usize)?;
        let mut map = IndexMap::with_capacity(count as usize);

        for (i, kind) in types.iter().enumerate() {
            let entry = offset + 4 + i as u64 * 8;
            let name = self.reader.read_hex_string_at(entry, 4)?;
            let value = self.read_slot(*kind, entry + 4, depth)?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Entries are a value slot followed by the hash; the trailing word is unused.
    fn read_hash_value_dictionary(
        &mut self,
        offset: u64,
        depth: usize,
    ) -> Result<IndexMap<String, BymlNode>> {
        let count = u64::from(self.reader.read_u24_at(offset + 1)?);
        let types = self.reader.read_bytes_at(offset + 4 + 12 * count, count as usize)?;
        let mut map = IndexMap::with_capacity(count as usize);

        for (i, kind) in types.iter().enumerate() {
            let entry = offset + 4 + i as u64 * 12;
            let name = self.reader.read_hex_string_at(entry + 4, 4)?;
            let value = self.read_slot(*kind, entry, depth)?;
            map.insert(name, value);
        }
        Ok(map)
    }
}

fn lookup<'t>(table: &'t [String], index: u32, what: &str) -> Result<&'t str> {
    table
        .get(index as usize)
        .map(String::as_str)
        .ok_or_else(|| Error::InvalidFormat(format!("BYML {what} index {index} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_hash_dictionary() {
        // root at 0x10: { 0x12345678: i32 7 }
        let mut data = b"YB\x02\x00\0\0\0\0\0\0\0\0\x10\0\0\0".to_vec();
        data.extend([node_type::HASH_DICTIONARY, 1, 0, 0]);
        data.extend(0x1234_5678u32.to_le_bytes());
        data.extend(7i32.to_le_bytes());
        data.extend([node_type::I32, 0, 0, 0]);

        let file = parse_byml_bytes(&data).unwrap();
        assert_eq!(file.find("0x12345678"), Some(&BymlNode::I32(7)));
    }

    #[test]
    fn test_binary_node() {
        // root array with one binary value stored at 0x18
        let mut data = b"YB\x02\x00\0\0\0\0\0\0\0\0\x10\0\0\0".to_vec();
        data.extend([node_type::ARRAY, 1, 0, 0, node_type::BINARY, 0, 0, 0]);
        data.extend(0x1Cu32.to_le_bytes());
        data.extend(3u32.to_le_bytes());
        data.extend([9, 8, 7]);

        let file = parse_byml_bytes(&data).unwrap();
        assert_eq!(file.find("0"), Some(&BymlNode::Binary(vec![9, 8, 7])));
    }

    #[test]
    fn test_shared_arrays_hit_node_limit() {
        let mut data = b"YB\x02\x00\0\0\0\0\0\0\0\0\x10\0\0\0".to_vec();

        // each array holds its successor twice
        let layers = 40u32;
        for layer in 0..layers {
            let next = 0x10 + (layer + 1) * 16;
            data.extend([node_type::ARRAY, 2, 0, 0, node_type::ARRAY, node_type::ARRAY, 0, 0]);
            data.extend(next.to_le_bytes());
            data.extend(next.to_le_bytes());
        }
        data.extend([node_type::ARRAY, 0, 0, 0]);

        assert!(matches!(
            parse_byml_bytes(&data),
            Err(Error::InvalidFormat(_))
        ));
    }
}
