//! Round-trip text to model

use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::{BmgFile, Message, MsbtFile, placeholder};
use crate::function_map::{FunctionMap, parse_hex};
use crate::function_table::FunctionTable;
use regex::Regex;
use std::str::FromStr;

lazy_static::lazy_static! {
    static ref HEADER_DELIMITER: Regex = Regex::new(r"^%%%+").expect("header delimiter pattern is valid");
    static ref MESSAGE_DELIMITER: Regex = Regex::new(r"^---+").expect("message delimiter pattern is valid");
    static ref FIELD_REGEX: Regex =
        Regex::new(r"^\s*([A-Za-z0-9_]+)\s*:\s*(.*?)\s*$").expect("field pattern is valid");
    static ref FUNCTION_REGEX: Regex = Regex::new(
        r#"\{\{\s*([A-Za-z0-9_]+:[A-Za-z0-9_]+|[A-Za-z0-9_]+)\s*((?:[A-Za-z0-9_]+="[^"]*"\s*)*)\}\}"#
    )
    .expect("function pattern is valid");
    static ref ARGUMENT_REGEX: Regex =
        Regex::new(r#"([A-Za-z0-9_]+)="([^"]*)"\s*"#).expect("argument pattern is valid");
}

/// A `key: value` line of a header block.
struct Field<'a> {
    key: &'a str,
    value: &'a str,
    /// 1-based
    line: usize,
}

impl Field<'_> {
    fn is(&self, key: &str) -> bool {
        self.key.eq_ignore_ascii_case(key)
    }

    fn bool(&self) -> Result<bool> {
        if self.value.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if self.value.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(Error::text(self.line, format!("Invalid boolean value for \"{}\".", self.key)))
        }
    }

    fn number<T: FromStr>(&self) -> Result<T> {
        self.value
            .parse()
            .map_err(|_| Error::text(self.line, format!("Invalid integer value for \"{}\".", self.key)))
    }

    fn encoding(&self) -> Result<TextEncoding> {
        TextEncoding::from_web_name(self.value)
            .ok_or_else(|| Error::text(self.line, format!("Invalid encoding value for \"{}\".", self.key)))
    }

    fn hex(&self) -> Result<Vec<u8>> {
        parse_hex(self.value)
            .map_err(|()| Error::text(self.line, format!("Invalid hex string value for \"{}\".", self.key)))
    }
}

/// Line cursor over a round-trip document.
struct Document<'a> {
    lines: Vec<&'a str>,
    position: usize,
}

impl<'a> Document<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            lines: content.split('\n').collect(),
            position: 0,
        }
    }

    /// Read the fields between the next two `delimiter` lines.
    ///
    /// Lines before the opening delimiter are skipped. Returns `None` and
    /// leaves the cursor in place if no opening delimiter follows.
    fn read_block(&mut self, delimiter: &Regex) -> Option<Vec<Field<'a>>> {
        let start = self.position;
        let mut fields = None;

        while let Some(raw) = self.lines.get(self.position) {
            let line = raw.trim_end_matches('\r');
            self.position += 1;

            if delimiter.is_match(line) {
                if fields.is_some() {
                    break;
                }
                fields = Some(Vec::new());
                continue;
            }

            let Some(fields) = fields.as_mut() else {
                continue;
            };
            if let Some(captures) = FIELD_REGEX.captures(line) {
                if let (Some(key), Some(value)) = (captures.get(1), captures.get(2)) {
                    fields.push(Field {
                        key: key.as_str(),
                        value: value.as_str(),
                        line: self.position,
                    });
                }
            }
        }

        if fields.is_none() {
            self.position = start;
        }
        fields
    }

    /// Read message blocks until the end of the document.
    fn read_messages(&mut self, table: &FunctionTable<'_>) -> Result<Vec<Message>> {
        let mut messages = Vec::new();

        while let Some(fields) = self.read_block(&MESSAGE_DELIMITER) {
            let mut message = Message::default();
            for field in &fields {
                apply_message_field(&mut message, field)?;
            }
            if message.label.is_empty() {
                return Err(Error::text(self.position, "Message is missing a label value."));
            }

            self.read_body(&mut message, table)?;
            messages.push(message);
        }

        Ok(messages)
    }

    /// Read body lines up to the next message delimiter, encoding every function.
    fn read_body(&mut self, message: &mut Message, table: &FunctionTable<'_>) -> Result<()> {
        let mut text = String::new();

        while let Some(line) = self.lines.get(self.position) {
            if MESSAGE_DELIMITER.is_match(line) {
                break;
            }
            self.position += 1;

            let mut last = 0;
            for captures in FUNCTION_REGEX.captures_iter(line) {
                let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                    continue;
                };
                let args: Vec<(String, String)> = captures
                    .get(2)
                    .map(|args| {
                        ARGUMENT_REGEX
                            .captures_iter(args.as_str())
                            .map(|arg| (arg[1].to_string(), arg[2].to_string()))
                            .collect()
                    })
                    .unwrap_or_default();

                let call = table.encode(name.as_str(), &args, self.position)?;
                text.push_str(&line[last..whole.start()]);
                text.push_str(&placeholder(message.functions.len()));
                message.functions.push(call);
                last = whole.end();
            }
            text.push_str(&line[last..]);
            text.push('\n');
        }

        let trailing = if text.ends_with("\n\n") { 2 } else { 1 };
        text.truncate(text.len().saturating_sub(trailing));
        message.text = text;
        Ok(())
    }
}

fn apply_message_field(message: &mut Message, field: &Field<'_>) -> Result<()> {
    if field.is("label") {
        message.label = field.value.to_string();
    } else if field.is("index") {
        message.index = Some(field.number()?);
    } else if field.is("attribute") {
        message.attribute = Some(field.hex()?);
    } else if field.is("attributeText") {
        message.attribute_text = Some(field.value.to_string());
    } else if field.is("styleIndex") {
        message.style_index = Some(field.number()?);
    }
    Ok(())
}

/// Parse round-trip text into an MSBT file.
///
/// Header fields that are absent keep their defaults (UTF-16, version 3).
///
/// # Errors
///
/// Returns [`Error::TextFormat`] with the 1-based line of the first
/// malformed field, message or function.
///
/// [`Error::TextFormat`]: crate::Error::TextFormat
pub fn deserialize_msbt(content: &str, map: &FunctionMap) -> Result<MsbtFile> {
    let mut document = Document::new(content);
    let mut file = MsbtFile::default();

    for field in document.read_block(&HEADER_DELIMITER).unwrap_or_default() {
        if field.is("bigEndian") {
            file.big_endian = field.bool()?;
        } else if field.is("version") {
            file.version = field.number()?;
        } else if field.is("encoding") {
            file.encoding = field.encoding()?;
        } else if field.is("hasNLI1") {
            file.has_nli1 = field.bool()?;
        } else if field.is("hasLBL1") {
            file.has_lbl1 = field.bool()?;
        } else if field.is("labelGroups") {
            file.label_groups = field.number()?;
        } else if field.is("hasATR1") {
            file.has_atr1 = field.bool()?;
        } else if field.is("hasAttributeText") {
            file.has_attribute_text = field.bool()?;
        } else if field.is("additionalAttributeData") {
            file.additional_attribute_data = field.hex()?;
        } else if field.is("hasATO1") {
            file.has_ato1 = field.bool()?;
        } else if field.is("ATO1Data") {
            file.ato1_data = field.hex()?;
        } else if field.is("hasTSY1") {
            file.has_tsy1 = field.bool()?;
        }
    }
    file.encoding = file.encoding.with_endianness(file.big_endian);

    let table = FunctionTable::new(map, file.big_endian, file.encoding);
    file.messages = document.read_messages(&table)?;

    tracing::debug!("Deserialized {} MSBT messages", file.messages.len());
    Ok(file)
}

/// Parse round-trip text into a BMG file.
///
/// Header fields that are absent keep their defaults (Windows-1252).
///
/// # Errors
///
/// Returns [`Error::TextFormat`] with the 1-based line of the first
/// malformed field, message or function.
///
/// [`Error::TextFormat`]: crate::Error::TextFormat
pub fn deserialize_bmg(content: &str, map: &FunctionMap) -> Result<BmgFile> {
    let mut document = Document::new(content);
    let mut file = BmgFile::default();

    for field in document.read_block(&HEADER_DELIMITER).unwrap_or_default() {
        if field.is("bigEndian") {
            file.big_endian = field.bool()?;
        } else if field.is("encoding") {
            file.encoding = field.encoding()?;
        } else if field.is("fileId") {
            file.file_id = field.number()?;
        } else if field.is("defaultColor") {
            file.default_color = field.number()?;
        } else if field.is("hasMID1") {
            file.has_mid1 = field.bool()?;
        } else if field.is("MID1Format") {
            file.mid1_format = field.hex()?;
        }
    }
    file.encoding = file.encoding.with_endianness(file.big_endian);

    let table = FunctionTable::new(map, file.big_endian, file.encoding);
    file.messages = document.read_messages(&table)?;

    tracing::debug!("Deserialized {} BMG messages", file.messages.len());
    Ok(file)
}
