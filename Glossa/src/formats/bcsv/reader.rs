//! BCSV table reading

#![allow(clippy::cast_possible_truncation)]

use super::{BcsvColumn, BcsvFile, BcsvValue, HEADER_SIZE};
use crate::binary::BinaryReader;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use std::path::Path;

/// Read a BCSV table from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
/// Returns [`Error::InvalidBcsvMagic`] if the `VSCB` signature is missing.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidBcsvMagic`]: crate::Error::InvalidBcsvMagic
pub fn read_bcsv<P: AsRef<Path>>(path: P) -> Result<BcsvFile> {
    let data = std::fs::read(path)?;
    parse_bcsv_bytes(&data)
}

/// Parse a BCSV table from bytes
///
/// Cells are typed by column width: 1-2 bytes as an integer, 4, 5 or 16
/// bytes as a hash, any other non-zero width as text.
///
/// # Errors
///
/// Returns [`Error::InvalidBcsvMagic`] if the `VSCB` signature is missing.
/// Returns [`Error::InvalidFormat`] if column offsets are not ascending.
/// Returns [`Error::UnexpectedEof`] if a row is truncated.
///
/// [`Error::InvalidBcsvMagic`]: crate::Error::InvalidBcsvMagic
/// [`Error::InvalidFormat`]: crate::Error::InvalidFormat
/// [`Error::UnexpectedEof`]: crate::Error::UnexpectedEof
pub fn parse_bcsv_bytes(data: &[u8]) -> Result<BcsvFile> {
    if !BcsvFile::can_parse(data) {
        return Err(Error::InvalidBcsvMagic);
    }

    let mut reader = BinaryReader::new(data);
    let row_count = u64::from(reader.read_u32_at(0)?);
    let row_size = reader.read_u32_at(4)?;
    let column_count = u64::from(reader.read_u16_at(8)?);

    let mut definitions = Vec::with_capacity(column_count as usize);
    for i in 0..column_count {
        let name = reader.read_hex_string_at(HEADER_SIZE + i * 8, 4)?;
        let offset = reader.read_u32()?;
        definitions.push((name, offset));
    }

    let mut columns = Vec::with_capacity(definitions.len());
    for (i, (name, offset)) in definitions.iter().enumerate() {
        let end = definitions.get(i + 1).map_or(row_size, |(_, next)| *next);
        let size = end.checked_sub(*offset).ok_or_else(|| {
            Error::InvalidFormat(format!("BCSV column {name} ends before it starts"))
        })?;
        columns.push(BcsvColumn {
            name: name.clone(),
            offset: *offset,
            size: size as usize,
        });
    }

    let rows_start = HEADER_SIZE + column_count * 8;
    let rows = (0..row_count)
        .map(|row| {
            let start = rows_start + row * u64::from(row_size);
            columns
                .iter()
                .map(|column| read_cell(&mut reader, start + u64::from(column.offset), column.size))
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!("Parsed BCSV with {} columns and {} rows", columns.len(), rows.len());
    Ok(BcsvFile { columns, rows })
}

fn read_cell(reader: &mut BinaryReader<'_>, offset: u64, size: usize) -> Result<BcsvValue> {
    Ok(match size {
        0 => BcsvValue::Empty,
        1 | 2 => {
            reader.jump_to(offset);
            BcsvValue::Int(reader.read_uint_sized(size)? as i32)
        }
        4 | 5 | 16 => BcsvValue::Hash(reader.read_hex_string_at(offset, size)?),
        _ => BcsvValue::Text(reader.read_string_at(offset, size, TextEncoding::Utf8)?),
    })
}
