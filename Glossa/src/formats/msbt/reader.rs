//! MSBT file reading and parsing

#![allow(clippy::cast_possible_truncation)]

use super::{FUNCTION_END, FUNCTION_START, HEADER_SIZE, MsbtFile, encoding_from_code};
use crate::binary::{BinaryReader, align_up};
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::{FunctionCall, Message, placeholder};
use byteorder::{BigEndian, ByteOrder, LittleEndian};
use std::path::Path;

/// Sections collected before messages are assembled
#[derive(Default)]
struct Sections {
    labels: Vec<(String, u32)>,
    ids: Vec<(u32, u32)>,
    attributes: Vec<Vec<u8>>,
    attribute_texts: Vec<String>,
    styles: Vec<u32>,
    texts: Vec<(String, Vec<FunctionCall>)>,
}

/// Read an MSBT file from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
/// Returns [`Error::InvalidMsbtMagic`] if the file does not have a valid MSBT header.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidMsbtMagic`]: crate::Error::InvalidMsbtMagic
pub fn read_msbt<P: AsRef<Path>>(path: P, language: Option<&str>) -> Result<MsbtFile> {
    let data = std::fs::read(path)?;
    parse_msbt_bytes(&data, language)
}

/// Parse MSBT data from bytes
///
/// `language` is attached to the result unchanged.
///
/// # Errors
///
/// Returns [`Error::InvalidMsbtMagic`] if the data does not start with `MsgStdBn`.
/// Returns [`Error::UnexpectedEof`] if a section is truncated.
/// Returns [`Error::InvalidFormat`] if a label or id references a missing message.
///
/// [`Error::InvalidMsbtMagic`]: crate::Error::InvalidMsbtMagic
/// [`Error::UnexpectedEof`]: crate::Error::UnexpectedEof
/// [`Error::InvalidFormat`]: crate::Error::InvalidFormat
pub fn parse_msbt_bytes(data: &[u8], language: Option<&str>) -> Result<MsbtFile> {
    if !MsbtFile::can_parse(data) {
        return Err(Error::InvalidMsbtMagic);
    }

    let mut reader = BinaryReader::new(data);
    let big_endian = reader.read_u8_at(8)? == 0xFE;
    reader.set_big_endian(big_endian);

    let encoding = encoding_from_code(reader.read_u8_at(0x0C)?, big_endian);
    let version = reader.read_u8_at(0x0D)?;
    let section_count = reader.read_u16_at(0x0E)?;

    let mut file = MsbtFile {
        big_endian,
        version,
        encoding,
        language: language.map(str::to_string),
        ..MsbtFile::default()
    };
    let mut sections = Sections::default();

    let mut section_offset = HEADER_SIZE;
    for _ in 0..section_count {
        reader.jump_to(section_offset);
        let tag = reader.read_bytes(4)?;
        let size = reader.read_u32()?;
        reader.skip(8);
        let body = reader.position();
        section_offset = body + align_up(u64::from(size), 16);

        tracing::debug!(
            "MSBT section {} at 0x{:X} ({size} bytes)",
            String::from_utf8_lossy(tag),
            body
        );

        match tag {
            b"LBL1" => {
                file.has_lbl1 = true;
                file.label_groups = read_lbl1(&mut reader, body, &mut sections.labels)?;
            }
            b"NLI1" => {
                file.has_nli1 = true;
                read_nli1(&mut reader, &mut sections.ids)?;
            }
            b"ATO1" => {
                file.has_ato1 = true;
                file.ato1_data = reader.read_bytes(size as usize)?.to_vec();
            }
            b"ATR1" => {
                file.has_atr1 = true;
                let (has_text, trailing) =
                    read_atr1(&mut reader, body, size, encoding, &mut sections)?;
                file.has_attribute_text = has_text;
                file.additional_attribute_data = trailing;
            }
            b"TSY1" => {
                file.has_tsy1 = true;
                sections.styles = (0..size / 4)
                    .map(|_| reader.read_u32())
                    .collect::<Result<_>>()?;
            }
            b"TXT2" => {
                sections.texts = read_txt2(&mut reader, body, size, encoding)?;
            }
            _ => tracing::debug!("Skipping unknown MSBT section"),
        }
    }

    let ids = sections.ids.clone();
    file.messages = assemble_messages(sections, file.has_attribute_text)?;
    if ids != file.derived_nli1_entries() {
        tracing::debug!("Keeping NLI1 table of {} entries in file order", ids.len());
        file.nli1_entries = ids;
    }
    Ok(file)
}

/// Read `LBL1`; returns the number of hash groups.
fn read_lbl1(reader: &mut BinaryReader<'_>, body: u64, labels: &mut Vec<(String, u32)>) -> Result<u32> {
    let group_count = reader.read_u32()?;

    for group in 0..u64::from(group_count) {
        let label_count = reader.read_u32_at(body + 4 + group * 8)?;
        let offset = reader.read_u32()?;

        reader.jump_to(body + u64::from(offset));
        for _ in 0..label_count {
            let len = reader.read_u8()?;
            let label = reader.read_string(len as usize, TextEncoding::Utf8)?;
            let index = reader.read_u32()?;
            labels.push((label, index));
        }
    }

    Ok(group_count)
}

fn read_nli1(reader: &mut BinaryReader<'_>, ids: &mut Vec<(u32, u32)>) -> Result<()> {
    let count = reader.read_u32()?;
    for _ in 0..count {
        let id = reader.read_u32()?;
        let index = reader.read_u32()?;
        ids.push((id, index));
    }
    Ok(())
}

/// Read `ATR1`; returns whether attributes are strings and the bytes
/// trailing the attribute table.
///
/// Attributes are strings when every entry is a 4-byte offset into the
/// section past the table. Otherwise they are kept as raw bytes.
fn read_atr1(
    reader: &mut BinaryReader<'_>,
    body: u64,
    size: u32,
    encoding: TextEncoding,
    sections: &mut Sections,
) -> Result<(bool, Vec<u8>)> {
    let count = reader.read_u32()?;
    let attribute_size = reader.read_u32()?;

    let table_len = u64::from(count) * u64::from(attribute_size) + 8;
    let section_size = u64::from(size);
    let width = encoding.null_width() as u64;
    let mut has_text = attribute_size == 4 && section_size >= table_len + u64::from(count) * width;

    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        attributes.push(reader.read_bytes(attribute_size as usize)?);
    }
    let table_end = reader.position();

    let mut texts = Vec::new();
    if has_text {
        for attribute in &attributes {
            let offset = u64::from(if reader.big_endian() {
                BigEndian::read_u32(attribute)
            } else {
                LittleEndian::read_u32(attribute)
            });
            if offset < table_len || offset > section_size {
                has_text = false;
                texts.clear();
                break;
            }
            texts.push(reader.read_terminated_string_at(body + offset, encoding)?);
        }
    }

    if has_text {
        sections.attribute_texts = texts;
        return Ok((true, Vec::new()));
    }

    sections.attributes = attributes.into_iter().map(<[u8]>::to_vec).collect();
    let trailing = (body + section_size).saturating_sub(table_end);
    let trailing = reader.read_bytes_at(table_end, trailing as usize)?.to_vec();
    Ok((false, trailing))
}

/// Read `TXT2` into texts with `{{n}}` placeholders and their function calls.
fn read_txt2(
    reader: &mut BinaryReader<'_>,
    body: u64,
    size: u32,
    encoding: TextEncoding,
) -> Result<Vec<(String, Vec<FunctionCall>)>> {
    let count = reader.read_u32()? as usize;
    let offsets = (0..count)
        .map(|_| reader.read_u32())
        .collect::<Result<Vec<_>>>()?;

    let width = encoding.null_width();
    let mut messages = Vec::with_capacity(count);

    for (i, &offset) in offsets.iter().enumerate() {
        let start = body + u64::from(offset);
        let end = body + u64::from(offsets.get(i + 1).copied().unwrap_or(size));

        let mut text = String::new();
        let mut pending = Vec::new();
        let mut functions = Vec::new();
        reader.jump_to(start);

        while reader.position() < end {
            let unit = reader.read_bytes(width)?;
            let value = if reader.big_endian() {
                BigEndian::read_uint(unit, width)
            } else {
                LittleEndian::read_uint(unit, width)
            } as u32;

            match value {
                FUNCTION_START => {
                    text.push_str(&encoding.decode(&pending));
                    pending.clear();
                    text.push_str(&placeholder(functions.len()));

                    let group = reader.read_u16()?;
                    let type_id = reader.read_u16()?;
                    let len = reader.read_u16()?;
                    let args = reader.read_bytes(len as usize)?.to_vec();
                    functions.push(FunctionCall {
                        group,
                        type_id,
                        args,
                    });
                }
                FUNCTION_END => {
                    text.push_str(&encoding.decode(&pending));
                    pending.clear();
                    text.push_str(&placeholder(functions.len()));
                    functions.push(FunctionCall {
                        group: 0x0F,
                        type_id: 0,
                        args: reader.read_bytes(4)?.to_vec(),
                    });
                }
                0 => {}
                _ => pending.extend_from_slice(unit),
            }
        }

        text.push_str(&encoding.decode(&pending));
        messages.push((text, functions));
    }

    Ok(messages)
}

fn assemble_messages(sections: Sections, has_attribute_text: bool) -> Result<Vec<Message>> {
    let count = sections.texts.len();
    let width = count.saturating_sub(1).to_string().len();

    let mut labels: Vec<Option<String>> = vec![None; count];
    for (label, index) in sections.labels {
        let slot = labels.get_mut(index as usize).ok_or_else(|| {
            Error::InvalidFormat(format!(
                "LBL1 label \"{label}\" references message {index} of {count}"
            ))
        })?;
        *slot = Some(label);
    }

    let mut ids = vec![None; count];
    for (id, index) in sections.ids {
        let slot = ids.get_mut(index as usize).ok_or_else(|| {
            Error::InvalidFormat(format!("NLI1 id {id} references message {index} of {count}"))
        })?;
        *slot = Some(id);
    }

    let messages = sections
        .texts
        .into_iter()
        .enumerate()
        .map(|(i, (text, functions))| Message {
            label: labels[i].take().unwrap_or_else(|| format!("{i:0width$}")),
            index: ids[i],
            attribute: if has_attribute_text {
                None
            } else {
                sections.attributes.get(i).cloned()
            },
            attribute_text: sections.attribute_texts.get(i).cloned(),
            style_index: sections.styles.get(i).copied(),
            text,
            functions,
        })
        .collect();

    Ok(messages)
}
