//! MSBT file writing

#![allow(clippy::cast_possible_truncation)]

use super::{
    FUNCTION_END, FUNCTION_START, HEADER_SIZE, MAX_LABEL_GROUPS, MSBT_MAGIC, MsbtFile, encoding_code,
};
use crate::binary::BinaryWriter;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::{Message, Segment};
use crate::utils::label_group;
use std::fs::File;
use std::io::{BufWriter, Cursor, Seek, Write};
use std::path::Path;

/// Fill byte between sections
const SECTION_PADDING: u8 = 0xAB;

/// Write an MSBT file to disk
///
/// # Errors
/// Returns an error if the file cannot be written or the model cannot be encoded.
pub fn write_msbt<P: AsRef<Path>>(path: P, file: &MsbtFile) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_msbt_to(&mut writer, file)?;
    writer.flush()?;
    Ok(())
}

/// Compile an MSBT file into a byte vector
///
/// # Errors
/// Returns an error if the model cannot be encoded.
pub fn compile_msbt(file: &MsbtFile) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    write_msbt_to(&mut cursor, file)?;
    Ok(cursor.into_inner())
}

/// Write an MSBT file to a seekable sink positioned at 0
///
/// # Errors
///
/// Returns [`Error::UnsupportedEncoding`] for encodings other than UTF-8/16/32.
/// Returns [`Error::InvalidFormat`] if the `LBL1` group count is 0 or above
/// [`MAX_LABEL_GROUPS`], attributes differ
/// in size or a label is longer than 255 bytes.
/// Returns [`Error::MissingPlaceholder`] if a message text lacks a function placeholder.
///
/// [`Error::UnsupportedEncoding`]: crate::Error::UnsupportedEncoding
/// [`Error::InvalidFormat`]: crate::Error::InvalidFormat
/// [`Error::MissingPlaceholder`]: crate::Error::MissingPlaceholder
pub fn write_msbt_to<W: Write + Seek>(sink: W, file: &MsbtFile) -> Result<()> {
    let code = encoding_code(file.encoding).ok_or_else(|| Error::UnsupportedEncoding {
        format: "MSBT",
        encoding: file.encoding.web_name().to_string(),
    })?;
    let encoding = file.encoding.with_endianness(file.big_endian);
    let mut writer = BinaryWriter::with_endianness(sink, file.big_endian);

    // Header
    writer.write_bytes(MSBT_MAGIC)?;
    writer.write_u16(0xFEFF)?;
    writer.pad(2, 0)?;
    writer.write_u8(code)?;
    writer.write_u8(file.version)?;
    writer.write_u16(file.section_count())?;
    writer.pad(HEADER_SIZE - writer.position(), 0)?;

    if file.has_lbl1 {
        write_section(&mut writer, b"LBL1", |w| write_lbl1(w, file))?;
    }
    if file.has_nli1 {
        write_section(&mut writer, b"NLI1", |w| write_nli1(w, &file.nli1_table()))?;
    }
    if file.has_ato1 {
        write_section(&mut writer, b"ATO1", |w| w.write_bytes(&file.ato1_data))?;
    }
    if file.has_atr1 {
        write_section(&mut writer, b"ATR1", |w| write_atr1(w, file, encoding))?;
    }
    if file.has_tsy1 {
        write_section(&mut writer, b"TSY1", |w| {
            for message in &file.messages {
                w.write_u32(message.style_index.unwrap_or(0))?;
            }
            Ok(())
        })?;
    }
    write_section(&mut writer, b"TXT2", |w| write_txt2(w, &file.messages, encoding))?;

    let size = writer.position();
    writer.jump_to(0x12)?;
    writer.write_u32(size as u32)?;
    writer.jump_to(size)?;
    writer.flush()?;

    tracing::debug!("Compiled MSBT with {} messages ({size} bytes)", file.messages.len());
    Ok(())
}

/// Write a section header, its body and the trailing alignment.
fn write_section<W, F>(writer: &mut BinaryWriter<W>, tag: &[u8; 4], body: F) -> Result<()>
where
    W: Write + Seek,
    F: FnOnce(&mut BinaryWriter<W>) -> Result<()>,
{
    let start = writer.position();
    writer.write_bytes(tag)?;
    writer.pad(12, 0)?;

    body(writer)?;

    let end = writer.position();
    writer.jump_to(start + 4)?;
    writer.write_u32((end - start - 0x10) as u32)?;
    writer.jump_to(end)?;
    writer.align(16, SECTION_PADDING)
}

fn write_lbl1<W: Write + Seek>(writer: &mut BinaryWriter<W>, file: &MsbtFile) -> Result<()> {
    if file.label_groups == 0 || file.label_groups > MAX_LABEL_GROUPS {
        return Err(Error::InvalidFormat(format!(
            "LBL1 label group count {} is outside 1..={MAX_LABEL_GROUPS}",
            file.label_groups
        )));
    }

    let mut groups: Vec<Vec<(&str, u32)>> = vec![Vec::new(); file.label_groups as usize];
    for (index, message) in file.messages.iter().enumerate() {
        if message.label.len() > usize::from(u8::MAX) {
            return Err(Error::InvalidFormat(format!(
                "label \"{}\" is longer than 255 bytes",
                message.label
            )));
        }
        let group = label_group(&message.label, file.label_groups) as usize;
        groups[group].push((message.label.as_str(), index as u32));
    }

    let overflow = || Error::InvalidFormat("LBL1 section exceeds 4 GiB".to_string());
    writer.write_u32(file.label_groups)?;
    let mut offset = file
        .label_groups
        .checked_mul(8)
        .and_then(|table| table.checked_add(4))
        .ok_or_else(overflow)?;
    for group in &groups {
        writer.write_u32(group.len() as u32)?;
        writer.write_u32(offset)?;
        offset = group
            .iter()
            .try_fold(offset, |end, (label, _)| end.checked_add(5 + label.len() as u32))
            .ok_or_else(overflow)?;
    }

    for (label, index) in groups.iter().flatten() {
        writer.write_u8(label.len() as u8)?;
        writer.write_bytes(label.as_bytes())?;
        writer.write_u32(*index)?;
    }
    Ok(())
}

fn write_nli1<W: Write + Seek>(writer: &mut BinaryWriter<W>, entries: &[(u32, u32)]) -> Result<()> {
    writer.write_u32(entries.len() as u32)?;
    for &(id, index) in entries {
        writer.write_u32(id)?;
        writer.write_u32(index)?;
    }
    Ok(())
}

fn write_atr1<W: Write + Seek>(
    writer: &mut BinaryWriter<W>,
    file: &MsbtFile,
    encoding: TextEncoding,
) -> Result<()> {
    let count = file.messages.len() as u32;
    writer.write_u32(count)?;

    if file.has_attribute_text {
        writer.write_u32(4)?;
        let mut offset = 8 + count * 4;
        let texts = file
            .messages
            .iter()
            .map(|m| {
                let mut bytes = encoding.encode(m.attribute_text.as_deref().unwrap_or_default())?;
                bytes.resize(bytes.len() + encoding.null_width(), 0);
                Ok(bytes)
            })
            .collect::<Result<Vec<_>>>()?;

        for text in &texts {
            writer.write_u32(offset)?;
            offset += text.len() as u32;
        }
        for text in &texts {
            writer.write_bytes(text)?;
        }
    } else {
        let size = file
            .messages
            .first()
            .and_then(|m| m.attribute.as_ref())
            .map_or(0, Vec::len);
        writer.write_u32(size as u32)?;

        for message in &file.messages {
            match &message.attribute {
                Some(attribute) if attribute.len() != size => {
                    return Err(Error::InvalidFormat(format!(
                        "attribute of \"{}\" has {} bytes, expected {size}",
                        message.label,
                        attribute.len()
                    )));
                }
                Some(attribute) => writer.write_bytes(attribute)?,
                None => writer.pad(size as u64, 0)?,
            }
        }
    }

    writer.write_bytes(&file.additional_attribute_data)
}

fn write_txt2<W: Write + Seek>(
    writer: &mut BinaryWriter<W>,
    messages: &[Message],
    encoding: TextEncoding,
) -> Result<()> {
    let width = encoding.null_width();
    let table = writer.position();
    writer.write_u32(messages.len() as u32)?;
    writer.pad(messages.len() as u64 * 4, 0)?;

    for (i, message) in messages.iter().enumerate() {
        let start = writer.position();
        writer.jump_to(table + 4 + i as u64 * 4)?;
        writer.write_u32((start - table) as u32)?;
        writer.jump_to(start)?;

        for segment in message.segments()? {
            match segment {
                Segment::Text(text) => writer.write_str(text, encoding)?,
                Segment::Function(call) if call.group == 0x0F && call.type_id == 0 => {
                    writer.write_unit(FUNCTION_END, width)?;
                    writer.write_bytes(&call.args)?;
                }
                Segment::Function(call) => {
                    let len = u16::try_from(call.args.len()).map_err(|_| {
                        Error::InvalidFormat(format!(
                            "function arguments in \"{}\" exceed 65535 bytes",
                            message.label
                        ))
                    })?;
                    writer.write_unit(FUNCTION_START, width)?;
                    writer.write_u16(call.group)?;
                    writer.write_u16(call.type_id)?;
                    writer.write_u16(len)?;
                    writer.write_bytes(&call.args)?;
                }
            }
        }
        writer.write_unit(0, width)?;
    }
    Ok(())
}
