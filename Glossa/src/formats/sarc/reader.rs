//! SARC archive reading and parsing

#![allow(clippy::cast_possible_truncation)]

use super::{NAME_FLAG, NODE_SIZE, SarcEntry, SarcFile};
use crate::binary::BinaryReader;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use std::path::Path;

/// Read a SARC archive from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
/// Returns [`Error::InvalidSarcMagic`] if the file does not have a valid SARC header.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidSarcMagic`]: crate::Error::InvalidSarcMagic
pub fn read_sarc<P: AsRef<Path>>(path: P) -> Result<SarcFile> {
    let data = std::fs::read(path)?;
    parse_sarc_bytes(&data)
}

/// Parse a SARC archive from bytes
///
/// Entries keep the order of the `SFAT` table. Entries without a name are
/// named after their hash.
///
/// # Errors
///
/// Returns [`Error::InvalidSarcMagic`] if the data does not start with `SARC`.
/// Returns [`Error::InvalidOffset`] if an entry points outside the data.
///
/// [`Error::InvalidSarcMagic`]: crate::Error::InvalidSarcMagic
/// [`Error::InvalidOffset`]: crate::Error::InvalidOffset
pub fn parse_sarc_bytes(data: &[u8]) -> Result<SarcFile> {
    if !SarcFile::can_parse(data) {
        return Err(Error::InvalidSarcMagic);
    }

    let mut reader = BinaryReader::new(data);
    let big_endian = reader.read_u8_at(6)? == 0xFE;
    reader.set_big_endian(big_endian);

    let sfat = u64::from(reader.read_u16_at(4)?);
    let data_offset = u64::from(reader.read_u32_at(0x0C)?);
    let version = reader.read_u16()?;

    let mut file = SarcFile {
        big_endian,
        version,
        ..SarcFile::default()
    };

    let mut nodes = Vec::new();
    let mut position = sfat;
    if reader.check_magic(sfat as usize, b"SFAT") {
        let header_len = u64::from(reader.read_u16_at(sfat + 4)?);
        let count = u64::from(reader.read_u16()?);
        file.hash_key = reader.read_u32()?;

        for i in 0..count {
            reader.jump_to(sfat + header_len + i * NODE_SIZE);
            let hash = reader.read_u32()?;
            let attributes = reader.read_u32()?;
            let start = reader.read_u32()?;
            let end = reader.read_u32()?;

            let name_offset = (attributes & NAME_FLAG != 0).then(|| u64::from(attributes & 0x00FF_FFFF) * 4);
            nodes.push((hash, name_offset, start, end));
        }
        position = sfat + header_len + count * NODE_SIZE;
    }

    let names_base = if reader.check_magic(position as usize, b"SFNT") {
        Some(position + u64::from(reader.read_u16_at(position + 4)?))
    } else {
        None
    };

    for (hash, name_offset, start, end) in nodes {
        let name = match (names_base, name_offset) {
            (Some(base), Some(offset)) => {
                reader.read_terminated_string_at(base + offset, TextEncoding::Utf8)?
            }
            _ => format!("0x{hash:08X}"),
        };

        let len = end.checked_sub(start).ok_or(Error::InvalidOffset {
            offset: u64::from(end),
            len: reader.len(),
        })?;
        let data = reader
            .read_bytes_at(data_offset + u64::from(start), len as usize)
            .map_err(|_| Error::InvalidOffset {
                offset: data_offset + u64::from(start),
                len: reader.len(),
            })?;

        file.files.push(SarcEntry {
            name,
            data: data.to_vec(),
        });
    }

    tracing::debug!("Parsed SARC with {} files", file.files.len());
    Ok(file)
}
