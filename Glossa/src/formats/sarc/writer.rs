//! SARC archive writing

#![allow(clippy::cast_possible_truncation)]

use super::{HEADER_SIZE, NAME_FLAG, SARC_MAGIC, SFAT_HEADER_SIZE, SFNT_HEADER_SIZE, SarcEntry, SarcFile};
use crate::binary::{BinaryWriter, align_up};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Write a SARC archive to disk
///
/// # Errors
/// Returns an error if the file cannot be written or an entry name is invalid.
pub fn write_sarc<P: AsRef<Path>>(path: P, file: &SarcFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_sarc_to(&mut writer, file)?;
    writer.flush()?;
    Ok(())
}

/// Compile a SARC archive into a byte vector
///
/// # Errors
/// Returns an error if an entry name is invalid.
pub fn compile_sarc(file: &SarcFile) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_sarc_to(&mut cursor, file)?;
    Ok(cursor.into_inner())
}

/// Write a SARC archive to a seekable sink positioned at 0
///
/// Nodes are sorted by hash. Only named entries are written to `SFNT`.
///
/// # Errors
///
/// Returns [`Error::InvalidSarcName`] if a hash placeholder is not valid hex.
///
/// [`Error::InvalidSarcName`]: crate::Error::InvalidSarcName
pub fn write_sarc_to<W: Write + Seek>(sink: W, file: &SarcFile) -> Result<()> {
    let mut entries = file
        .files
        .iter()
        .map(|entry| Ok((entry_hash(file, entry)?, entry)))
        .collect::<Result<Vec<(u32, &SarcEntry)>>>()?;
    entries.sort_by_key(|(hash, _)| *hash);

    let count = u16::try_from(entries.len())
        .map_err(|_| Error::InvalidFormat(format!("{} files exceed the SFAT limit", entries.len())))?;
    let mut writer = BinaryWriter::with_endianness(sink, file.big_endian);

    // Header; size and data offset are patched at the end
    writer.write_bytes(SARC_MAGIC)?;
    writer.write_u16(HEADER_SIZE)?;
    writer.write_u16(0xFEFF)?;
    writer.pad(8, 0)?;
    writer.write_u16(file.version)?;
    writer.pad(2, 0)?;

    writer.write_bytes(b"SFAT")?;
    writer.write_u16(SFAT_HEADER_SIZE)?;
    writer.write_u16(count)?;
    writer.write_u32(file.hash_key)?;

    let mut name_offset = 0u64;
    let mut data_offset = 0u64;
    for (hash, entry) in &entries {
        writer.write_u32(*hash)?;
        if entry.has_name() {
            writer.write_u32(NAME_FLAG | (name_offset / 4) as u32)?;
            name_offset = align_up(name_offset + entry.name.len() as u64 + 1, 4);
        } else {
            writer.write_u32(0)?;
        }
        writer.write_u32(data_offset as u32)?;
        writer.write_u32((data_offset + entry.data.len() as u64) as u32)?;
        data_offset = align_up(data_offset + entry.data.len() as u64, 8);
    }

    if entries.iter().any(|(_, entry)| entry.has_name()) {
        writer.write_bytes(b"SFNT")?;
        writer.write_u16(SFNT_HEADER_SIZE)?;
        writer.pad(2, 0)?;

        for (_, entry) in entries.iter().filter(|(_, entry)| entry.has_name()) {
            writer.write_bytes(entry.name.as_bytes())?;
            writer.write_u8(0)?;
            writer.align(4, 0)?;
        }
    }

    writer.align(8, 0)?;
    let data_start = writer.position();
    for (i, (_, entry)) in entries.iter().enumerate() {
        writer.write_bytes(&entry.data)?;
        if i + 1 < entries.len() {
            writer.align(8, 0)?;
        }
    }

    let size = writer.position();
    writer.jump_to(0x08)?;
    writer.write_u32(size as u32)?;
    writer.write_u32(data_start as u32)?;
    writer.jump_to(size)?;
    writer.flush()?;

    tracing::debug!("Compiled SARC with {} files ({size} bytes)", entries.len());
    Ok(())
}

fn entry_hash(file: &SarcFile, entry: &SarcEntry) -> Result<u32> {
    if entry.has_name() {
        return Ok(file.hash_name(&entry.name));
    }
    u32::from_str_radix(&entry.name[2..], 16).map_err(|_| Error::InvalidSarcName(entry.name.clone()))
}
