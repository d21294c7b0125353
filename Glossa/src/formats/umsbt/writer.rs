//! UMSBT bundle writing

#![allow(clippy::cast_possible_truncation)]

use crate::binary::BinaryWriter;
use crate::error::Result;
use crate::formats::{MsbtFile, compile_msbt};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Write a UMSBT bundle to disk
///
/// # Errors
/// Returns an error if the file cannot be written or a slot cannot be compiled.
pub fn write_umsbt<P: AsRef<Path>>(path: P, files: &[MsbtFile]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_umsbt_to(&mut writer, files)?;
    writer.flush()?;
    Ok(())
}

/// Compile a UMSBT bundle into a byte vector
///
/// # Errors
/// Returns an error if a slot cannot be compiled.
pub fn compile_umsbt(files: &[MsbtFile]) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_umsbt_to(&mut cursor, files)?;
    Ok(cursor.into_inner())
}

/// Write a UMSBT bundle to a seekable sink positioned at 0
///
/// The slot table is followed by 16-byte alignment and 16 zero bytes.
///
/// # Errors
/// Returns an error if a slot cannot be compiled or written.
pub fn write_umsbt_to<W: Write + Seek>(sink: W, files: &[MsbtFile]) -> Result<()> {
    let mut writer = BinaryWriter::new(sink);
    writer.pad(files.len() as u64 * 8, 0)?;
    writer.align(16, 0)?;
    writer.pad(16, 0)?;

    for (i, file) in files.iter().enumerate() {
        let data = compile_msbt(file)?;
        let start = writer.position();
        writer.write_bytes(&data)?;
        let end = writer.position();

        writer.jump_to(i as u64 * 8)?;
        writer.write_u32(start as u32)?;
        writer.write_u32(data.len() as u32)?;
        writer.jump_to(end)?;
    }

    writer.flush()
}
