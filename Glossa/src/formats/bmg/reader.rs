//! BMG file reading and parsing

#![allow(clippy::cast_possible_truncation)]

use super::{BmgFile, FUNCTION_START, encoding_from_code};
use crate::binary::BinaryReader;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::{FunctionCall, Message, placeholder};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::path::Path;

/// Read a BMG file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
/// Returns [`Error::InvalidBmgMagic`] if the file does not have a valid BMG header.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidBmgMagic`]: crate::Error::InvalidBmgMagic
pub fn read_bmg<P: AsRef<Path>>(path: P, language: Option<&str>) -> Result<BmgFile> {
    let data = std::fs::read(path)?;
    parse_bmg_bytes(&data, language)
}

/// Parse BMG data from bytes
///
/// The byte order is inferred from the size field at 0x08: a value that
/// does not match the data length in little-endian means big-endian.
///
/// # Errors
///
/// Returns [`Error::InvalidBmgMagic`] if the data does not start with `MESGbmg1`.
/// Returns [`Error::InvalidFormat`] if `INF1` declares entries shorter than 4 bytes.
/// Returns [`Error::UnexpectedEof`] if a section is truncated.
///
/// [`Error::InvalidBmgMagic`]: crate::Error::InvalidBmgMagic
/// [`Error::InvalidFormat`]: crate::Error::InvalidFormat
/// [`Error::UnexpectedEof`]: crate::Error::UnexpectedEof
pub fn parse_bmg_bytes(data: &[u8], language: Option<&str>) -> Result<BmgFile> {
    if !BmgFile::can_parse(data) {
        return Err(Error::InvalidBmgMagic);
    }

    let mut reader = BinaryReader::new(data);
    let big_endian = u64::from(reader.read_u32_at(0x08)?) != reader.len();
    reader.set_big_endian(big_endian);

    let section_count = reader.read_u32_at(0x0C)?;
    let encoding = encoding_from_code(reader.read_u8_at(0x10)?, big_endian);

    let mut file = BmgFile {
        big_endian,
        encoding,
        language: language.map(str::to_string),
        ..BmgFile::default()
    };
    let mut entries: Vec<(u32, Vec<u8>)> = Vec::new();
    let mut texts = Vec::new();
    let mut ids = Vec::new();

    let mut section_offset = 0x20;
    for _ in 0..section_count {
        reader.jump_to(section_offset);
        reader.align(32);
        let start = reader.position();
        let tag = reader.read_bytes(4)?;
        let size = reader.read_u32()?;
        section_offset = start + u64::from(size);

        tracing::debug!(
            "BMG section {} at 0x{start:X} ({size} bytes)",
            String::from_utf8_lossy(tag)
        );

        match tag {
            b"INF1" => {
                let count = reader.read_u16()?;
                let entry_size = reader.read_u16()?;
                file.file_id = reader.read_u16()?;
                file.default_color = reader.read_u8()?;
                reader.skip(1);

                let attribute_len = usize::from(entry_size).checked_sub(4).ok_or_else(|| {
                    Error::InvalidFormat(format!("INF1 entry size {entry_size} is below 4"))
                })?;
                for _ in 0..count {
                    let offset = reader.read_u32()?;
                    let attribute = reader.read_bytes(attribute_len)?.to_vec();
                    entries.push((offset, attribute));
                }
            }
            b"DAT1" => {
                texts = read_dat1(&mut reader, start + 8, section_offset, &entries, encoding)?;
            }
            b"MID1" => {
                file.has_mid1 = true;
                let count = reader.read_u16()?;
                file.mid1_format = reader.read_bytes(2)?.to_vec();
                reader.skip(4);
                ids = (0..count)
                    .map(|_| reader.read_u32())
                    .collect::<Result<Vec<_>>>()?;
            }
            _ => tracing::debug!("Skipping unknown BMG section"),
        }
    }

    let width = texts.len().saturating_sub(1).to_string().len();
    file.messages = texts
        .into_iter()
        .zip(entries)
        .enumerate()
        .map(|(i, ((text, functions), (_, attribute)))| Message {
            label: ids
                .get(i)
                .map_or_else(|| format!("{i:0width$}"), u32::to_string),
            attribute: (!attribute.is_empty()).then_some(attribute),
            text,
            functions,
            ..Message::default()
        })
        .collect();

    Ok(file)
}

/// Read the messages of `DAT1`, one per `INF1` entry.
fn read_dat1(
    reader: &mut BinaryReader<'_>,
    body: u64,
    section_end: u64,
    entries: &[(u32, Vec<u8>)],
    encoding: TextEncoding,
) -> Result<Vec<(String, Vec<FunctionCall>)>> {
    let width = encoding.null_width();
    let mut messages = Vec::with_capacity(entries.len());

    for (i, (offset, _)) in entries.iter().enumerate() {
        let end = entries
            .get(i + 1)
            .map_or(section_end, |(next, _)| body + u64::from(*next));
        reader.jump_to(body + u64::from(*offset));

        let mut text = String::new();
        let mut pending = Vec::new();
        let mut functions = Vec::new();

        while reader.position() < end {
            let unit = reader.read_bytes(width)?;
            let value = if reader.big_endian() {
                BigEndian::read_uint(unit, width)
            } else {
                LittleEndian::read_uint(unit, width)
            } as u32;

            if value == 0 {
                break;
            }
            if value != FUNCTION_START && !(width == 2 && value == FUNCTION_START << 8) {
                pending.extend_from_slice(unit);
                continue;
            }

            text.push_str(&encoding.decode(&pending));
            pending.clear();
            text.push_str(&placeholder(functions.len()));

            let len = reader.read_u8()?;
            let group = reader.read_u8()?;
            let type_id = reader.read_u16()?;
            let arg_len = usize::from(len).saturating_sub(width + 4);
            functions.push(FunctionCall {
                group: u16::from(group),
                type_id,
                args: reader.read_bytes(arg_len)?.to_vec(),
            });
        }

        text.push_str(&encoding.decode(&pending));
        messages.push((text, functions));
    }

    Ok(messages)
}
