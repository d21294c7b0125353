//! Zstandard layer (`.zs` files)

use super::Compressor;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Zstandard frame magic
pub const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Default compression level
pub const DEFAULT_LEVEL: i32 = 19;

/// Zstandard compressor with an optional shared dictionary.
#[derive(Debug, Clone)]
pub struct ZstdCompressor {
    level: i32,
    dictionary: Option<Vec<u8>>,
}

impl Default for ZstdCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_LEVEL)
    }
}

impl ZstdCompressor {
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self {
            level,
            dictionary: None,
        }
    }

    /// Use a raw dictionary for both directions.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: Vec<u8>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    /// Build a compressor from a level and an optional dictionary file.
    ///
    /// # Errors
    /// Returns [`Error::Io`] if the dictionary cannot be read.
    ///
    /// [`Error::Io`]: crate::Error::Io
    pub fn from_settings(level: i32, dictionary: Option<&Path>) -> Result<Self> {
        let compressor = Self::new(level);
        match dictionary {
            Some(path) => Ok(compressor.with_dictionary(std::fs::read(path)?)),
            None => Ok(compressor),
        }
    }

    #[must_use]
    pub fn level(&self) -> i32 {
        self.level
    }
}

impl Compressor for ZstdCompressor {
    fn name(&self) -> &'static str {
        "Zstandard"
    }

    fn can_decompress(&self, data: &[u8]) -> bool {
        data.starts_with(&ZSTD_MAGIC)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let result = match &self.dictionary {
            Some(dictionary) => {
                let mut decoder = zstd::Decoder::with_dictionary(data, dictionary)
                    .map_err(|e| Error::Decompression(format!("Zstandard: {e}")))?;
                let mut out = Vec::new();
                std::io::copy(&mut decoder, &mut out).map(|_| out)
            }
            None => zstd::decode_all(data),
        };
        result.map_err(|e| Error::Decompression(format!("Zstandard: {e}")))
    }

    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let result = match &self.dictionary {
            Some(dictionary) => zstd::bulk::Compressor::with_dictionary(self.level, dictionary)
                .and_then(|mut compressor| compressor.compress(data)),
            None => zstd::encode_all(data, self.level),
        };
        result.map_err(|e| Error::Compression(format!("Zstandard: {e}")))
    }
}

/// Path with a trailing `.zs` removed, if present.
#[must_use]
pub fn strip_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("zs")) {
        path.with_extension("")
    } else {
        path.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_round_trip() {
        let data = b"SARC archive contents ".repeat(32);
        let zstd = ZstdCompressor::new(3);
        let packed = zstd.compress(&data).unwrap();
        assert!(zstd.can_decompress(&packed));
        assert!(packed.len() < data.len());
        assert_eq!(zstd.decompress(&packed).unwrap(), data);
    }

    #[test]
    fn test_dictionary_round_trip() {
        let zstd = ZstdCompressor::new(3).with_dictionary(b"MsgStdBnLBL1ATR1TXT2".repeat(8));
        let packed = zstd.compress(b"MsgStdBn TXT2 hello").unwrap();
        assert_eq!(zstd.decompress(&packed).unwrap(), b"MsgStdBn TXT2 hello");
    }

    #[test]
    fn test_rejects_garbage() {
        let zstd = ZstdCompressor::default();
        assert_eq!(zstd.level(), DEFAULT_LEVEL);
        assert!(!zstd.can_decompress(b"SARC"));
        assert!(matches!(
            zstd.decompress(&[0x28, 0xB5, 0x2F, 0xFD, 0xFF]),
            Err(Error::Decompression(_))
        ));
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension(Path::new("a/Msg.sarc.zs")), PathBuf::from("a/Msg.sarc"));
        assert_eq!(strip_extension(Path::new("a/Msg.sarc")), PathBuf::from("a/Msg.sarc"));
    }
}
