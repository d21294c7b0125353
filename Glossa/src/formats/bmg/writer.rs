//! BMG file writing

#![allow(clippy::cast_possible_truncation)]

use super::{BMG_MAGIC, BmgFile, FUNCTION_START, encoding_code};
use crate::binary::BinaryWriter;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::{Message, Segment};
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Offset of the first `INF1` entry
const INF1_ENTRIES: u64 = 0x30;

/// Write a BMG file to disk
///
/// # Errors
/// Returns an error if the file cannot be written or the model cannot be encoded.
pub fn write_bmg<P: AsRef<Path>>(path: P, file: &BmgFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_bmg_to(&mut writer, file)?;
    writer.flush()?;
    Ok(())
}

/// Compile a BMG file into a byte vector
///
/// # Errors
/// Returns an error if the model cannot be encoded.
pub fn compile_bmg(file: &BmgFile) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_bmg_to(&mut cursor, file)?;
    Ok(cursor.into_inner())
}

/// Write a BMG file to a seekable sink positioned at 0
///
/// `INF1` entries are sized for the longest attribute; shorter attributes
/// are zero-padded.
///
/// # Errors
///
/// Returns [`Error::UnsupportedEncoding`] for UTF-32.
/// Returns [`Error::InvalidBmgLabel`] if `MID1` is enabled and a label is not a `u32`.
/// Returns [`Error::InvalidFormat`] if a function does not fit the `DAT1` layout.
///
/// [`Error::UnsupportedEncoding`]: crate::Error::UnsupportedEncoding
/// [`Error::InvalidBmgLabel`]: crate::Error::InvalidBmgLabel
/// [`Error::InvalidFormat`]: crate::Error::InvalidFormat
pub fn write_bmg_to<W: Write + Seek>(sink: W, file: &BmgFile) -> Result<()> {
    let code = encoding_code(file.encoding).ok_or_else(|| Error::UnsupportedEncoding {
        format: "BMG",
        encoding: file.encoding.web_name().to_string(),
    })?;
    let encoding = file.encoding.with_endianness(file.big_endian);
    let mut writer = BinaryWriter::with_endianness(sink, file.big_endian);

    // Header
    writer.write_bytes(BMG_MAGIC)?;
    writer.pad(4, 0)?;
    writer.write_u32(if file.has_mid1 { 3 } else { 2 })?;
    writer.write_u8(code)?;
    writer.align(16, 0)?;

    let attribute_len = file
        .messages
        .iter()
        .filter_map(|m| m.attribute.as_ref().map(Vec::len))
        .max()
        .unwrap_or(0);
    let entry_size = u16::try_from(attribute_len + 4)
        .map_err(|_| Error::InvalidFormat(format!("attributes of {attribute_len} bytes are too long")))?;

    write_section(&mut writer, b"INF1", |w| {
        w.write_u16(file.messages.len() as u16)?;
        w.write_u16(entry_size)?;
        w.write_u16(file.file_id)?;
        w.write_u8(file.default_color)?;
        w.pad(1, 0)?;
        w.pad(file.messages.len() as u64 * u64::from(entry_size), 0)
    })?;

    let mut offsets = Vec::with_capacity(file.messages.len());
    write_section(&mut writer, b"DAT1", |w| {
        let body = w.position();
        w.pad(encoding.null_width() as u64, 0)?;
        for message in &file.messages {
            offsets.push((w.position() - body) as u32);
            write_message(w, message, encoding)?;
        }
        Ok(())
    })?;

    let end = writer.position();
    writer.jump_to(INF1_ENTRIES)?;
    for (offset, message) in offsets.iter().zip(&file.messages) {
        let attribute = message.attribute.as_deref().unwrap_or_default();
        writer.write_u32(*offset)?;
        writer.write_bytes(attribute)?;
        writer.pad((attribute_len - attribute.len()) as u64, 0)?;
    }
    writer.jump_to(end)?;

    if file.has_mid1 {
        let ids = file
            .messages
            .iter()
            .map(|m| {
                m.label
                    .parse::<u32>()
                    .map_err(|_| Error::InvalidBmgLabel(m.label.clone()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut format = file.mid1_format.clone();
        format.resize(2, 0);
        write_section(&mut writer, b"MID1", |w| {
            w.write_u16(ids.len() as u16)?;
            w.write_bytes(&format)?;
            w.pad(4, 0)?;
            for id in &ids {
                w.write_u32(*id)?;
            }
            Ok(())
        })?;
    }

    let size = writer.position();
    writer.jump_to(0x08)?;
    writer.write_u32(size as u32)?;
    writer.jump_to(size)?;
    writer.flush()?;

    tracing::debug!("Compiled BMG with {} messages ({size} bytes)", file.messages.len());
    Ok(())
}

/// Write a section whose size field covers its header and trailing padding.
fn write_section<W, F>(writer: &mut BinaryWriter<W>, tag: &[u8; 4], body: F) -> Result<()>
where
    W: Write + Seek,
    F: FnOnce(&mut BinaryWriter<W>) -> Result<()>,
{
    let start = writer.position();
    writer.write_bytes(tag)?;
    writer.pad(4, 0)?;

    body(writer)?;
    writer.align(32, 0)?;

    let end = writer.position();
    writer.jump_to(start + 4)?;
    writer.write_u32((end - start) as u32)?;
    writer.jump_to(end)
}

fn write_message<W: Write + Seek>(
    writer: &mut BinaryWriter<W>,
    message: &Message,
    encoding: TextEncoding,
) -> Result<()> {
    let width = encoding.null_width();

    for segment in message.segments()? {
        match segment {
            Segment::Text(text) => writer.write_str(text, encoding)?,
            Segment::Function(call) => {
                let group = u8::try_from(call.group).map_err(|_| {
                    Error::InvalidFormat(format!(
                        "function group {} in \"{}\" does not fit in a byte",
                        call.group, message.label
                    ))
                })?;
                let len = u8::try_from(call.args.len() + width + 4).map_err(|_| {
                    Error::InvalidFormat(format!(
                        "function arguments in \"{}\" exceed 255 bytes",
                        message.label
                    ))
                })?;
                writer.write_unit(FUNCTION_START, width)?;
                writer.write_u8(len)?;
                writer.write_u8(group)?;
                writer.write_u16(call.type_id)?;
                writer.write_bytes(&call.args)?;
            }
        }
    }

    writer.write_unit(0, width)
}
