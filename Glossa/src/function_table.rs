//! Conversion between raw function calls and named, typed arguments
//!
//! A [`FunctionTable`] binds a [`FunctionMap`] to the byte order and text
//! encoding of one file. Decoding turns a [`FunctionCall`] into a display
//! name plus argument values; encoding turns parsed text back into a call.

use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use crate::formats::FunctionCall;
use crate::function_map::{DataType, FunctionArg, FunctionInfo, FunctionMap, FunctionType, parse_hex, to_hex};

/// Value of one decoded argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    Single(String),
    Array(Vec<String>),
}

impl std::fmt::Display for ArgumentValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Single(value) => f.write_str(value),
            Self::Array(values) => write!(f, "[{}]", values.join(",")),
        }
    }
}

/// A function call with its display name and decoded arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFunction {
    pub name: String,
    pub args: Vec<(String, ArgumentValue)>,
}

/// Function map bound to the byte order and encoding of one file.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTable<'a> {
    map: &'a FunctionMap,
    big_endian: bool,
    encoding: TextEncoding,
}

impl<'a> FunctionTable<'a> {
    #[must_use]
    pub fn new(map: &'a FunctionMap, big_endian: bool, encoding: TextEncoding) -> Self {
        Self {
            map,
            big_endian,
            encoding,
        }
    }

    #[must_use]
    pub fn map(&self) -> &'a FunctionMap {
        self.map
    }

    /// Resolve a call to its display name and argument values.
    ///
    /// Unknown calls are named `group:type` and keep their bytes in a single
    /// hex `arg`. Bytes left after the defined arguments become `otherArg`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnmappedFunctionType`] if a mapped function has no
    /// value for the type id, or [`Error::FunctionArgument`] if an argument
    /// cannot be read.
    pub fn decode(&self, call: &FunctionCall) -> Result<DecodedFunction> {
        let Some(info) = self.map.get(call.group, call.type_id) else {
            let mut args = Vec::new();
            if !call.args.is_empty() {
                args.push(("arg".to_string(), ArgumentValue::Single(to_hex(&call.args))));
            }
            return Ok(DecodedFunction {
                name: format!("{}:{}", call.group, call.type_id),
                args,
            });
        };

        let name = match &info.kind {
            FunctionType::Single(_) => info.name.clone(),
            FunctionType::Discard | FunctionType::Range(_) => {
                format!("{}:{}", info.name, call.type_id)
            }
            FunctionType::Mapped(_) => {
                let value = info.value_for_type(call.type_id).ok_or_else(|| {
                    Error::UnmappedFunctionType {
                        function: info.name.clone(),
                        type_id: call.type_id,
                    }
                })?;
                format!("{}:{}", info.name, value.name)
            }
        };

        let data = call.args.as_slice();
        let mut offset = 0;
        let mut args = Vec::new();

        for arg in &info.args {
            if arg.is_discard {
                offset = data.len();
                break;
            }

            if arg.is_padding {
                let len = arg.data_type.fixed_len().unwrap_or(0);
                offset += len * arg.array_len.max(1);
                continue;
            }

            let value = if arg.array_len > 0 {
                let mut values = Vec::with_capacity(arg.array_len);
                for _ in 0..arg.array_len {
                    values.push(self.decode_value(&name, arg, data, &mut offset)?);
                }
                ArgumentValue::Array(values)
            } else {
                ArgumentValue::Single(self.decode_value(&name, arg, data, &mut offset)?)
            };
            args.push((arg.name.clone(), value));
        }

        if offset < data.len() {
            args.push((
                "otherArg".to_string(),
                ArgumentValue::Single(to_hex(&data[offset..])),
            ));
        }

        Ok(DecodedFunction { name, args })
    }

    fn decode_value(
        &self,
        function: &str,
        arg: &FunctionArg,
        data: &[u8],
        offset: &mut usize,
    ) -> Result<String> {
        let (value, consumed) = arg
            .data_type
            .deserialize(data, *offset, self.big_endian, self.encoding)
            .map_err(|_| Error::FunctionArgument {
                function: function.to_string(),
                argument: arg.name.clone(),
                data_type: arg.data_type.name(),
            })?;
        *offset += consumed;

        Ok(arg
            .value_map
            .as_ref()
            .and_then(|values| values.iter().find(|v| v.value == value))
            .map_or(value, |v| v.name.clone()))
    }

    /// Build a call from a display name and `name="value"` arguments.
    ///
    /// `line` is reported in errors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TextFormat`] if the name cannot be resolved or an
    /// argument is missing, malformed or out of range.
    pub fn encode(&self, name: &str, args: &[(String, String)], line: usize) -> Result<FunctionCall> {
        let Some(info) = self.map.find(name) else {
            return encode_unknown(name, args, line);
        };

        let type_id = self.resolve_type(info, name, line)?;
        let args = self.encode_args(info, name, args, line)?;
        Ok(FunctionCall {
            group: info.group,
            type_id,
            args,
        })
    }

    fn resolve_type(&self, info: &FunctionInfo, name: &str, line: usize) -> Result<u16> {
        if let FunctionType::Single(type_id) = info.kind {
            return Ok(type_id);
        }

        let (_, tail) = name.split_once(':').ok_or_else(|| {
            Error::text(
                line,
                format!("Invalid function name format for \"{name}\". Function requires type value."),
            )
        })?;

        match &info.kind {
            FunctionType::Mapped(_) => info.type_for_value(tail).ok_or_else(|| {
                Error::text(
                    line,
                    format!("\"{tail}\" is not a valid value in the value map of \"{}\".", info.name),
                )
            }),
            _ => tail.parse().map_err(|_| {
                Error::text(
                    line,
                    format!("Type value \"{tail}\" of \"{name}\" could not be parsed as u16."),
                )
            }),
        }
    }

    fn encode_args(
        &self,
        info: &FunctionInfo,
        name: &str,
        args: &[(String, String)],
        line: usize,
    ) -> Result<Vec<u8>> {
        let width = self.encoding.null_width();
        let mut data = Vec::new();
        let mut handled = vec![false; args.len()];
        let mut discard_fill = None;
        let mut last_type = None;

        for arg in &info.args {
            if arg.is_discard {
                discard_fill = Some(arg.discard_fill());
                break;
            }
            last_type = Some(&arg.data_type);

            if arg.is_padding {
                let bytes = arg.data_type.serialize("", self.big_endian, self.encoding)?;
                for _ in 0..arg.array_len.max(1) {
                    data.extend_from_slice(&bytes);
                }
                continue;
            }

            let position = args
                .iter()
                .position(|(key, _)| key.eq_ignore_ascii_case(&arg.name))
                .ok_or_else(|| {
                    Error::text(line, format!("Missing argument value for {} on \"{name}\".", arg.name))
                })?;
            handled[position] = true;
            let value = &args[position].1;

            if arg.array_len > 0 {
                let items: Vec<&str> = value
                    .trim_start_matches('[')
                    .trim_end_matches(']')
                    .split(',')
                    .collect();
                if items.len() != arg.array_len {
                    return Err(Error::text(
                        line,
                        format!(
                            "Argument array lengths do not match. Expected an array of length {} but found an array of length {}.",
                            arg.array_len,
                            items.len()
                        ),
                    ));
                }
                for item in items {
                    data.extend(self.encode_value(name, arg, item.trim(), line)?);
                }
            } else {
                data.extend(self.encode_value(name, arg, value, line)?);
            }
        }

        let mut has_unhandled = false;
        for ((key, value), _) in args.iter().zip(&handled).filter(|(_, done)| !**done) {
            let bytes = parse_hex(value).map_err(|()| {
                Error::text(line, format!("Invalid hex string value for \"{key}\"."))
            })?;
            data.extend(bytes);
            has_unhandled = true;
        }

        if let Some(fill) = discard_fill {
            if !has_unhandled && last_type == Some(&DataType::NullStr) {
                data.truncate(data.len().saturating_sub(width));
            }
            let padding = (width - data.len() % width) % width;
            data.extend(std::iter::repeat_n(fill, padding));
        }

        Ok(data)
    }

    fn encode_value(&self, function: &str, arg: &FunctionArg, value: &str, line: usize) -> Result<Vec<u8>> {
        let raw = match &arg.value_map {
            Some(values) => values
                .iter()
                .find(|v| v.name.eq_ignore_ascii_case(value))
                .map(|v| v.value.as_str())
                .ok_or_else(|| {
                    Error::text(
                        line,
                        format!("\"{value}\" is not a valid value for argument \"{}\" of \"{function}\".", arg.name),
                    )
                })?,
            None => value,
        };

        arg.data_type
            .serialize(raw, self.big_endian, self.encoding)
            .map_err(|_| {
                Error::text(
                    line,
                    format!(
                        "Failed to convert function argument value \"{value}\" of \"{}\" on \"{function}\" to {}.",
                        arg.name, arg.data_type
                    ),
                )
            })
    }
}

fn encode_unknown(name: &str, args: &[(String, String)], line: usize) -> Result<FunctionCall> {
    let Some((group, type_id)) = name.split_once(':') else {
        return Err(Error::text(
            line,
            format!(
                "Unknown function \"{name}\". Functions missing from the function map have to follow the format \"<group>:<type>\", for example \"1:2\"."
            ),
        ));
    };
    let group = group
        .parse()
        .map_err(|_| Error::text(line, "Invalid function format value for group index."))?;
    let type_id = type_id
        .parse()
        .map_err(|_| Error::text(line, "Invalid function format value for type index."))?;

    let args = match args {
        [] => Vec::new(),
        [(key, value)] => parse_hex(value)
            .map_err(|()| Error::text(line, format!("Invalid hex string value for \"{key}\".")))?,
        _ => {
            return Err(Error::text(
                line,
                "Undefined functions can only have a single argument.",
            ));
        }
    };

    Ok(FunctionCall {
        group,
        type_id,
        args,
    })
}
