//! Compression layers around message containers
//!
//! Switch titles ship most SARC, BYML and MSBT data inside a Zstandard
//! frame (`.zs`). A [`Compressor`] recognises its layer by magic so callers
//! can strip it before format sniffing with [`maybe_decompress`].

pub mod zstd;

pub use self::zstd::ZstdCompressor;

use crate::error::Result;
use std::borrow::Cow;

/// A compression layer that can be detected, removed and re-applied.
pub trait Compressor: Send + Sync {
    /// Display name used in logs.
    fn name(&self) -> &'static str;

    /// Whether `data` starts with this layer's magic.
    fn can_decompress(&self, data: &[u8]) -> bool;

    /// Remove the compression layer.
    ///
    /// # Errors
    /// Returns an error if the stream is malformed.
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// Apply the compression layer.
    ///
    /// # Errors
    /// Returns an error if compression fails.
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// Strip the first compression layer in `compressors` that recognises `data`.
///
/// Data without a known layer is returned borrowed.
///
/// # Errors
/// Returns an error if a recognised layer fails to decompress.
pub fn maybe_decompress<'a>(
    data: &'a [u8],
    compressors: &[&dyn Compressor],
) -> Result<Cow<'a, [u8]>> {
    match compressors.iter().find(|c| c.can_decompress(data)) {
        Some(compressor) => {
            tracing::debug!("Removing {} layer from {} bytes", compressor.name(), data.len());
            Ok(Cow::Owned(compressor.decompress(data)?))
        }
        None => Ok(Cow::Borrowed(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maybe_decompress() {
        let zstd = ZstdCompressor::default();
        let packed = zstd.compress(b"MsgStdBn").unwrap();

        let plain = maybe_decompress(&packed, &[&zstd]).unwrap();
        assert!(matches!(plain, Cow::Owned(_)));
        assert_eq!(plain.as_ref(), b"MsgStdBn");

        let untouched = maybe_decompress(b"MESGbmg1", &[&zstd]).unwrap();
        assert!(matches!(untouched, Cow::Borrowed(_)));
        assert!(maybe_decompress(b"MESGbmg1", &[]).is_ok());
    }
}
