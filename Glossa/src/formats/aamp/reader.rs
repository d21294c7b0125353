//! AAMP parameter archive reading

#![allow(clippy::cast_possible_truncation)]

use super::{
    AampFile, Curve, HEADER_SIZE, ParamValue, Parameter, ParameterList, ParameterObject, param_type,
};
use crate::binary::BinaryReader;
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::NodeBudget;
use std::path::Path;

/// Size of a list node
const LIST_SIZE: u64 = 12;

/// Size of an object or parameter node
const NODE_SIZE: u64 = 8;

/// Read an AAMP archive from disk
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read.
/// Returns [`Error::InvalidAampMagic`] if the file does not start with `AAMP`.
///
/// [`Error::Io`]: crate::Error::Io
/// [`Error::InvalidAampMagic`]: crate::Error::InvalidAampMagic
pub fn read_aamp<P: AsRef<Path>>(path: P) -> Result<AampFile> {
    let data = std::fs::read(path)?;
    parse_aamp_bytes(&data)
}

/// Parse an AAMP archive from bytes
///
/// Bit 0 of the flags at 0x08 marks little-endian data, bit 1 UTF-8 strings.
///
/// # Errors
///
/// Returns [`Error::InvalidAampMagic`] if the data does not start with `AAMP`.
/// Returns [`Error::UnexpectedEof`] if a node points outside the data.
///
/// [`Error::InvalidAampMagic`]: crate::Error::InvalidAampMagic
/// [`Error::UnexpectedEof`]: crate::Error::UnexpectedEof
pub fn parse_aamp_bytes(data: &[u8]) -> Result<AampFile> {
    if !AampFile::can_parse(data) {
        return Err(Error::InvalidAampMagic);
    }

    let mut reader = BinaryReader::new(data);
    let flags = reader.read_u32_at(0x08)?;
    let big_endian = flags & 1 == 0;
    let utf8 = flags & 2 != 0;
    reader.set_big_endian(big_endian);

    let version = reader.read_u32_at(0x04)?;
    let root_offset = u64::from(reader.read_u32_at(0x14)?);
    let data_type = reader.read_bounded_string_at(HEADER_SIZE, root_offset as usize, TextEncoding::Utf8)?;

    let mut budget = NodeBudget::for_data("AAMP", data);
    let root = read_list(&mut reader, &mut budget, HEADER_SIZE + root_offset, 0)?;

    tracing::debug!(
        "Parsed AAMP v{version} ({data_type}) with {} lists and {} objects at the root",
        root.lists.len(),
        root.objects.len()
    );
    Ok(AampFile {
        big_endian,
        version,
        utf8,
        data_type,
        root,
    })
}

fn read_list(
    reader: &mut BinaryReader<'_>,
    budget: &mut NodeBudget,
    offset: u64,
    depth: usize,
) -> Result<ParameterList> {
    if depth > 64 {
        return Err(Error::InvalidFormat(format!(
            "AAMP lists nested too deeply at 0x{offset:X}"
        )));
    }
    budget.take(offset)?;

    let name = reader.read_hex_string_at(offset, 4)?;
    let lists_offset = u64::from(reader.read_u16()?) * 4;
    let list_count = u64::from(reader.read_u16()?);
    let objects_offset = u64::from(reader.read_u16()?) * 4;
    let object_count = u64::from(reader.read_u16()?);

    let lists = (0..list_count)
        .map(|i| read_list(reader, budget, offset + lists_offset + i * LIST_SIZE, depth + 1))
        .collect::<Result<Vec<_>>>()?;
    let objects = (0..object_count)
        .map(|i| read_object(reader, budget, offset + objects_offset + i * NODE_SIZE))
        .collect::<Result<Vec<_>>>()?;

    Ok(ParameterList {
        name,
        lists,
        objects,
    })
}

fn read_object(
    reader: &mut BinaryReader<'_>,
    budget: &mut NodeBudget,
    offset: u64,
) -> Result<ParameterObject> {
    budget.take(offset)?;
    let name = reader.read_hex_string_at(offset, 4)?;
    let params_offset = u64::from(reader.read_u16()?) * 4;
    let count = u64::from(reader.read_u16()?);

    let parameters = (0..count)
        .map(|i| {
            let param = offset + params_offset + i * NODE_SIZE;
            budget.take(param)?;
            read_parameter(reader, param)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ParameterObject { name, parameters })
}

fn read_parameter(reader: &mut BinaryReader<'_>, offset: u64) -> Result<Parameter> {
    let name = reader.read_hex_string_at(offset, 4)?;
    let data = offset + u64::from(reader.read_u24()?) * 4;
    let kind = reader.read_u8()?;

    let value = match kind {
        param_type::BOOL => ParamValue::Bool(reader.read_u32_at(data)? != 0),
        param_type::F32 => ParamValue::F32(reader.read_f32_at(data)?),
        param_type::I32 => ParamValue::I32(reader.read_i32_at(data)?),
        param_type::U32 => ParamValue::U32(reader.read_u32_at(data)?),
        param_type::VEC2 => ParamValue::Vec2(read_floats(reader, data)?),
        param_type::VEC3 => ParamValue::Vec3(read_floats(reader, data)?),
        param_type::VEC4 => ParamValue::Vec4(read_floats(reader, data)?),
        param_type::QUAT => ParamValue::Quat(read_floats(reader, data)?),
        param_type::COLOR => ParamValue::Color(read_floats(reader, data)?),
        param_type::STRING32 => ParamValue::String32(read_string(reader, data, 32)?),
        param_type::STRING64 => ParamValue::String64(read_string(reader, data, 64)?),
        param_type::STRING256 => ParamValue::String256(read_string(reader, data, 256)?),
        param_type::STRING_REF => {
            ParamValue::StringRef(reader.read_terminated_string_at(data, TextEncoding::Utf8)?)
        }
        param_type::CURVE1..=param_type::CURVE4 => {
            let count = usize::from(kind - param_type::CURVE1 + 1);
            reader.jump_to(data);
            let curves = (0..count)
                .map(|_| read_curve(reader))
                .collect::<Result<Vec<_>>>()?;
            ParamValue::Curves(curves)
        }
        param_type::BUFFER_I32 => {
            let count = buffer_len(reader, data)?;
            ParamValue::I32Buffer((0..count).map(|_| reader.read_i32()).collect::<Result<_>>()?)
        }
        param_type::BUFFER_U32 => {
            let count = buffer_len(reader, data)?;
            ParamValue::U32Buffer((0..count).map(|_| reader.read_u32()).collect::<Result<_>>()?)
        }
        param_type::BUFFER_F32 => {
            let count = buffer_len(reader, data)?;
            ParamValue::F32Buffer((0..count).map(|_| reader.read_f32()).collect::<Result<_>>()?)
        }
        param_type::BUFFER_BINARY => {
            let count = buffer_len(reader, data)?;
            ParamValue::BinaryBuffer(reader.read_bytes(count)?.to_vec())
        }
        other => ParamValue::Unknown(other),
    };

    Ok(Parameter { name, value })
}

fn read_floats<const N: usize>(reader: &mut BinaryReader<'_>, offset: u64) -> Result<[f32; N]> {
    reader.jump_to(offset);
    let mut values = [0f32; N];
    for value in &mut values {
        *value = reader.read_f32()?;
    }
    Ok(values)
}

fn read_string(reader: &mut BinaryReader<'_>, offset: u64, max_len: usize) -> Result<String> {
    reader.read_bounded_string_at(offset, max_len, TextEncoding::Utf8)
}

fn read_curve(reader: &mut BinaryReader<'_>) -> Result<Curve> {
    let ints = [reader.read_u32()?, reader.read_u32()?];
    let mut floats = [0f32; 30];
    for value in &mut floats {
        *value = reader.read_f32()?;
    }
    Ok(Curve { ints, floats })
}

/// Element count stored in the word before a buffer; leaves the cursor at the buffer.
fn buffer_len(reader: &mut BinaryReader<'_>, data: u64) -> Result<usize> {
    let offset = data.checked_sub(4).ok_or(Error::InvalidOffset {
        offset: data,
        len: reader.len(),
    })?;
    Ok(reader.read_u32_at(offset)? as usize)
}
