//! Model to round-trip text

use super::{DefaultFormatProvider, FormatProvider};
use crate::error::Result;
use crate::formats::{BmgFile, Message, MsbtFile};
use crate::function_map::{FunctionMap, to_hex};
use crate::function_table::FunctionTable;
use std::fmt::Display;

/// Render an MSBT file as round-trip text with the default function syntax.
///
/// # Errors
/// Returns an error if a function's arguments cannot be decoded with `map`.
pub fn serialize_msbt(file: &MsbtFile, map: &FunctionMap) -> Result<String> {
    serialize_msbt_with(file, map, &DefaultFormatProvider)
}

/// Render an MSBT file as round-trip text.
///
/// # Errors
/// Returns an error if a function's arguments cannot be decoded with `map`.
pub fn serialize_msbt_with(
    file: &MsbtFile,
    map: &FunctionMap,
    provider: &dyn FormatProvider,
) -> Result<String> {
    let table = FunctionTable::new(map, file.big_endian, file.encoding.with_endianness(file.big_endian));
    let mut out = String::new();

    out.push_str("%%%\n");
    field(&mut out, "bigEndian", file.big_endian);
    field(&mut out, "version", file.version);
    field(&mut out, "encoding", file.encoding.web_name());
    field(&mut out, "hasNLI1", file.has_nli1);
    field(&mut out, "hasLBL1", file.has_lbl1);
    if file.has_lbl1 {
        field(&mut out, "labelGroups", file.label_groups);
    }
    field(&mut out, "hasATR1", file.has_atr1);
    if file.has_atr1 {
        field(&mut out, "hasAttributeText", file.has_attribute_text);
    }
    if !file.additional_attribute_data.is_empty() {
        field(&mut out, "additionalAttributeData", to_hex(&file.additional_attribute_data));
    }
    field(&mut out, "hasATO1", file.has_ato1);
    if file.has_ato1 {
        field(&mut out, "ATO1Data", to_hex(&file.ato1_data));
    }
    field(&mut out, "hasTSY1", file.has_tsy1);
    out.push_str("%%%\n");

    for message in &file.messages {
        out.push_str("\n---\n");
        field(&mut out, "label", &message.label);
        if let Some(index) = message.index.filter(|_| file.has_nli1) {
            field(&mut out, "index", index);
        }
        if file.has_atr1 {
            if file.has_attribute_text {
                field(&mut out, "attributeText", message.attribute_text.as_deref().unwrap_or_default());
            } else {
                field(&mut out, "attribute", to_hex(message.attribute.as_deref().unwrap_or_default()));
            }
        }
        if let Some(style) = message.style_index.filter(|_| file.has_tsy1) {
            field(&mut out, "styleIndex", style);
        }
        out.push_str("---\n");
        body(&mut out, message, &table, provider)?;
    }

    tracing::debug!("Serialized {} MSBT messages", file.messages.len());
    Ok(out)
}

/// Render a BMG file as round-trip text with the default function syntax.
///
/// # Errors
/// Returns an error if a function's arguments cannot be decoded with `map`.
pub fn serialize_bmg(file: &BmgFile, map: &FunctionMap) -> Result<String> {
    serialize_bmg_with(file, map, &DefaultFormatProvider)
}

/// Render a BMG file as round-trip text.
///
/// # Errors
/// Returns an error if a function's arguments cannot be decoded with `map`.
pub fn serialize_bmg_with(
    file: &BmgFile,
    map: &FunctionMap,
    provider: &dyn FormatProvider,
) -> Result<String> {
    let table = FunctionTable::new(map, file.big_endian, file.encoding.with_endianness(file.big_endian));
    let mut out = String::new();

    out.push_str("%%%\n");
    field(&mut out, "bigEndian", file.big_endian);
    field(&mut out, "encoding", file.encoding.web_name());
    field(&mut out, "fileId", file.file_id);
    field(&mut out, "defaultColor", file.default_color);
    field(&mut out, "hasMID1", file.has_mid1);
    if file.has_mid1 {
        field(&mut out, "MID1Format", to_hex(&file.mid1_format));
    }
    out.push_str("%%%\n");

    for message in &file.messages {
        out.push_str("\n---\n");
        field(&mut out, "label", &message.label);
        if let Some(attribute) = message.attribute.as_deref().filter(|a| !a.is_empty()) {
            field(&mut out, "attribute", to_hex(attribute));
        }
        out.push_str("---\n");
        body(&mut out, message, &table, provider)?;
    }

    tracing::debug!("Serialized {} BMG messages", file.messages.len());
    Ok(out)
}

fn field(out: &mut String, key: &str, value: impl Display) {
    out.push_str(&format!("{key}: {value}\n"));
}

fn body(
    out: &mut String,
    message: &Message,
    table: &FunctionTable<'_>,
    provider: &dyn FormatProvider,
) -> Result<()> {
    out.push_str(&message.to_compiled_string(table, provider)?);
    out.push('\n');
    Ok(())
}
