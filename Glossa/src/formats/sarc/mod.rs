//! SARC archives
//!
//! A flat archive of named (or hash-only) files. Entries are looked up by a
//! multiplicative name hash stored in the `SFAT` table; names live in the
//! optional `SFNT` table.

mod reader;
mod writer;

pub use reader::{parse_sarc_bytes, read_sarc};
pub use writer::{compile_sarc, write_sarc, write_sarc_to};

use crate::utils::{SARC_HASH_KEY, sarc_hash};

/// File magic
pub const SARC_MAGIC: &[u8; 4] = b"SARC";

/// Size of the archive header
pub const HEADER_SIZE: u16 = 0x14;

/// Size of the `SFAT` header
pub const SFAT_HEADER_SIZE: u16 = 0x0C;

/// Size of the `SFNT` header
pub const SFNT_HEADER_SIZE: u16 = 0x08;

/// Size of one `SFAT` node
pub const NODE_SIZE: u64 = 0x10;

/// Flag in the node name attributes marking a named entry
pub const NAME_FLAG: u32 = 0x0100_0000;

/// One archive member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarcEntry {
    /// File name, or `0x` + the hash in uppercase hex for unnamed entries.
    pub name: String,
    pub data: Vec<u8>,
}

impl SarcEntry {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Whether the entry has a real name rather than a hash placeholder.
    #[must_use]
    pub fn has_name(&self) -> bool {
        !self.name.starts_with("0x") || self.name.contains('.')
    }
}

/// A parsed SARC archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SarcFile {
    pub big_endian: bool,
    pub version: u16,
    /// Multiplier of the name hash
    pub hash_key: u32,
    pub files: Vec<SarcEntry>,
}

impl Default for SarcFile {
    fn default() -> Self {
        Self {
            big_endian: false,
            version: 0x0100,
            hash_key: SARC_HASH_KEY,
            files: Vec::new(),
        }
    }
}

impl SarcFile {
    /// Check for the `SARC` magic.
    #[must_use]
    pub fn can_parse(data: &[u8]) -> bool {
        data.starts_with(SARC_MAGIC)
    }

    /// Get a file by name
    #[must_use]
    pub fn get_file(&self, name: &str) -> Option<&SarcEntry> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn get_file_mut(&mut self, name: &str) -> Option<&mut SarcEntry> {
        self.files.iter_mut().find(|f| f.name == name)
    }

    /// Add a file, replacing the data of an existing entry with the same name
    ///
    /// # Returns
    /// `true` if a new entry was added, `false` if an existing entry was replaced
    pub fn add_file(&mut self, name: impl Into<String>, data: Vec<u8>) -> bool {
        let name = name.into();
        if let Some(entry) = self.get_file_mut(&name) {
            entry.data = data;
            false
        } else {
            self.files.push(SarcEntry { name, data });
            true
        }
    }

    /// Remove a file by name
    pub fn remove_file(&mut self, name: &str) -> Option<SarcEntry> {
        let position = self.files.iter().position(|f| f.name == name)?;
        Some(self.files.remove(position))
    }

    /// Hash of a name with this archive's key
    #[must_use]
    pub fn hash_name(&self, name: &str) -> u32 {
        sarc_hash(name, self.hash_key)
    }

    /// Number of files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> SarcFile {
        SarcFile {
            files: vec![
                SarcEntry::new("abcdef.x", vec![1, 2, 3]),
                SarcEntry::new("0x00000010", vec![4]),
                SarcEntry::new("ab", vec![5, 6]),
            ],
            ..SarcFile::default()
        }
    }

    #[test]
    fn test_layout() {
        let bytes = compile_sarc(&sample()).unwrap();
        assert_eq!(&bytes[..8], b"SARC\x14\x00\xFF\xFE");
        assert_eq!(&bytes[0x08..0x10], &[0x7B, 0, 0, 0, 0x68, 0, 0, 0]);
        assert_eq!(&bytes[0x14..0x20], b"SFAT\x0C\x00\x03\x00\x65\x00\x00\x00");

        // nodes sorted by hash: 0x10, "ab", "abcdef.x"
        assert_eq!(&bytes[0x20..0x30], &[0x10, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0]);
        assert_eq!(&bytes[0x30..0x40], &[0xA7, 0x26, 0, 0, 0, 0, 0, 1, 8, 0, 0, 0, 10, 0, 0, 0]);
        assert_eq!(&bytes[0x44..0x48], &[1, 0, 0, 1]);

        assert_eq!(&bytes[0x50..0x58], b"SFNT\x08\x00\x00\x00");
        assert_eq!(&bytes[0x58..0x68], b"ab\0\0abcdef.x\0\0\0\0");
        assert_eq!(
            &bytes[0x68..],
            &[4, 0, 0, 0, 0, 0, 0, 0, 5, 6, 0, 0, 0, 0, 0, 0, 1, 2, 3]
        );
    }

    #[test]
    fn test_round_trip() {
        let bytes = compile_sarc(&sample()).unwrap();
        let parsed = parse_sarc_bytes(&bytes).unwrap();
        let names: Vec<&str> = parsed.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["0x00000010", "ab", "abcdef.x"]);
        assert_eq!(parsed.get_file("abcdef.x").unwrap().data, vec![1, 2, 3]);
        assert_eq!(compile_sarc(&parsed).unwrap(), bytes);
    }

    #[test]
    fn test_big_endian() {
        let mut file = sample();
        file.big_endian = true;
        let bytes = compile_sarc(&file).unwrap();
        assert_eq!(&bytes[6..8], &[0xFE, 0xFF]);
        let parsed = parse_sarc_bytes(&bytes).unwrap();
        assert!(parsed.big_endian);
        assert_eq!(parsed.files, parse_sarc_bytes(&compile_sarc(&sample()).unwrap()).unwrap().files);
    }

    #[test]
    fn test_unnamed_archive_has_no_sfnt() {
        let file = SarcFile {
            files: vec![SarcEntry::new("0x0000ABCD", vec![7; 3])],
            ..SarcFile::default()
        };
        let bytes = compile_sarc(&file).unwrap();
        assert_eq!(&bytes[0x24..0x28], &[0, 0, 0, 0]);
        assert_eq!(&bytes[0x0C..0x10], &[0x30, 0, 0, 0]);
        assert_eq!(parse_sarc_bytes(&bytes).unwrap(), file);
    }

    #[test]
    fn test_editing() {
        let mut file = sample();
        assert!(!file.add_file("ab", vec![9]));
        assert_eq!(file.get_file("ab").unwrap().data, vec![9]);
        assert!(file.add_file("new.bin", Vec::new()));
        assert_eq!(file.len(), 4);
        assert!(file.remove_file("abcdef.x").is_some());
        assert!(file.remove_file("abcdef.x").is_none());
        assert!(SarcEntry::new("0x1234.bin", Vec::new()).has_name());
        assert!(!SarcEntry::new("0x00001234", Vec::new()).has_name());
    }

    #[test]
    fn test_invalid_placeholder() {
        let file = SarcFile {
            files: vec![SarcEntry::new("0xNOTHEX", Vec::new())],
            ..SarcFile::default()
        };
        assert!(matches!(
            compile_sarc(&file),
            Err(crate::Error::InvalidSarcName(name)) if name == "0xNOTHEX"
        ));
    }
}
