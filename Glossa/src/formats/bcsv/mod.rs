//! BCSV tables (read-only)
//!
//! Fixed-width rows of little-endian data. Columns are named by hash and
//! carry no type information, so each cell is decoded by the width of its
//! column.

mod reader;

pub use reader::{parse_bcsv_bytes, read_bcsv};

use std::fmt;

/// Signature at 0x0C
pub const BCSV_MAGIC: &[u8; 4] = b"VSCB";

/// Size of the table header before the column definitions
pub const HEADER_SIZE: u64 = 28;

/// One column definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BcsvColumn {
    /// Header hash as `0x` + uppercase hex
    pub name: String,
    /// Offset of the column inside a row
    pub offset: u32,
    /// Width in bytes, derived from the next column or the row size
    pub size: usize,
}

/// A decoded cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BcsvValue {
    /// Zero-width column
    Empty,
    /// 1 or 2 byte column
    Int(i32),
    /// 4, 5 or 16 byte column, as `0x` + uppercase hex
    Hash(String),
    Text(String),
}

impl fmt::Display for BcsvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Int(value) => write!(f, "{value}"),
            Self::Hash(text) | Self::Text(text) => f.write_str(text),
        }
    }
}

/// A parsed BCSV table
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BcsvFile {
    pub columns: Vec<BcsvColumn>,
    pub rows: Vec<Vec<BcsvValue>>,
}

impl BcsvFile {
    /// Check for the `VSCB` signature at 0x0C.
    #[must_use]
    pub fn can_parse(data: &[u8]) -> bool {
        data.get(12..16).is_some_and(|magic| magic == BCSV_MAGIC)
    }

    /// Index of the column with the given header hash
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Get a cell by row index and header hash
    #[must_use]
    pub fn get(&self, row: usize, column: &str) -> Option<&BcsvValue> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Vec<u8> {
        let mut data = Vec::new();
        data.extend(2i32.to_le_bytes());
        data.extend(16i32.to_le_bytes());
        data.extend(4i16.to_le_bytes());
        data.extend([0, 0]);
        data.extend(BCSV_MAGIC);
        data.resize(HEADER_SIZE as usize, 0);

        for (hash, offset) in [(0xAABB_CCDDu32, 0i32), (1, 4), (2, 6), (3, 6)] {
            data.extend(hash.to_le_bytes());
            data.extend(offset.to_le_bytes());
        }

        data.extend([0x78, 0x56, 0x34, 0x12, 5, 0]);
        data.extend(b"apple\0\0\0\0\0");
        data.extend([1, 0, 0, 0, 0xFF, 0]);
        data.extend(b"pear\0\0\0\0\0\0");
        data
    }

    #[test]
    fn test_parse_table() {
        let file = parse_bcsv_bytes(&sample()).unwrap();
        let names: Vec<&str> = file.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["0xAABBCCDD", "0x00000001", "0x00000002", "0x00000003"]);
        let sizes: Vec<usize> = file.columns.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![4, 2, 0, 10]);

        assert_eq!(
            file.rows[0],
            vec![
                BcsvValue::Hash("0x12345678".to_string()),
                BcsvValue::Int(5),
                BcsvValue::Empty,
                BcsvValue::Text("apple".to_string()),
            ]
        );
        assert_eq!(file.get(1, "0x00000001"), Some(&BcsvValue::Int(255)));
        assert_eq!(file.get(1, "0xaabbccdd").map(ToString::to_string).as_deref(), Some("0x00000001"));
        assert_eq!(file.get(1, "0x00000003").map(ToString::to_string).as_deref(), Some("pear"));
        assert_eq!(file.get(2, "0x00000003"), None);
    }

    #[test]
    fn test_magic() {
        assert!(BcsvFile::can_parse(&sample()));
        assert!(!BcsvFile::can_parse(b"VSCB"));
        assert!(matches!(
            parse_bcsv_bytes(b"too short"),
            Err(crate::Error::InvalidBcsvMagic)
        ));
    }
}
