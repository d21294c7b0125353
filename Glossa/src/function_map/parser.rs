//! Function map source parser
//!
//! One forward pass builds functions and maps while tracking the element that
//! argument and value lines belong to. Map references are resolved in a second
//! pass so maps may be declared after their first use, and a final pass checks
//! the group invariants.

use super::{DataType, FunctionArg, FunctionInfo, FunctionMap, FunctionType, FunctionValue};
use crate::encoding::TextEncoding;
use crate::error::{Error, Result};
use regex::Regex;
use std::collections::BTreeSet;

lazy_static::lazy_static! {
    static ref FUNCTION_REGEX: Regex = Regex::new(
        r"^\[\s*(\d+)\s*,\s*(\d+|\d+\s*-\s*\d+|_|\(\s*\d+(?:\s*-\s*\d+)?(?:\s*,\s*\d+(?:\s*-\s*\d+)?)*\s*\)|\{[A-Za-z0-9_]+\})\s*\]\s*(?:\s+([A-Za-z0-9_]+))?\s*(?:\s+#\s*(.+))?$"
    ).expect("function header pattern is valid");

    static ref ARGUMENT_REGEX: Regex = Regex::new(
        r"^\s{2,}([A-Za-z0-9_]+|\{[A-Za-z0-9_]+\})(?:\[(\d+)\])?\s*(?:\s+([A-Za-z0-9_]+))?\s*(?:\s+#\s*(.+))?$"
    ).expect("argument pattern is valid");

    static ref PADDING_REGEX: Regex = Regex::new(r"^0x(?:[A-Fa-f0-9]{2})+$")
        .expect("padding pattern is valid");

    static ref DISCARD_REGEX: Regex = Regex::new(r"^_(0x[A-Fa-f0-9]{2})?$")
        .expect("discard pattern is valid");

    static ref MAP_REGEX: Regex = Regex::new(
        r"^map\s+([A-Za-z0-9_]+)(?:\s+([A-Za-z0-9_]+))?\s*(?:\s+#\s*(.+))?$"
    ).expect("map header pattern is valid");

    static ref MAP_VALUE_REGEX: Regex = Regex::new(
        r"^\s{2,}(-?[A-Za-z0-9_]+)(?:\s+([A-Za-z0-9_]+))?\s*(?:\s+#\s*(.+))?$"
    ).expect("map value pattern is valid");
}

/// Element that indented lines attach to.
#[derive(Clone, Copy)]
enum Open {
    Nothing,
    Function,
    Map,
}

struct MapDefinition {
    name: String,
    data_type: DataType,
    values: Vec<FunctionValue>,
}

enum ReferenceTarget {
    FunctionType(usize),
    Argument(usize, usize),
}

struct MapReference {
    map: String,
    line: usize,
    target: ReferenceTarget,
}

#[derive(Default)]
struct ParseState {
    functions: Vec<FunctionInfo>,
    lines: Vec<usize>,
    maps: Vec<MapDefinition>,
    references: Vec<MapReference>,
}

pub(super) fn parse(source: &str) -> Result<FunctionMap> {
    let mut state = ParseState::default();
    let mut open = Open::Nothing;

    for (index, raw) in source.split('\n').enumerate() {
        let line_number = index + 1;
        let line = raw.trim_end_matches('\r');
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(captures) = FUNCTION_REGEX.captures(line) {
            state.parse_function(&captures, line_number)?;
            open = Open::Function;
            continue;
        }

        if let Some(captures) = MAP_REGEX.captures(line) {
            state.parse_map(&captures, line_number)?;
            open = Open::Map;
            continue;
        }

        match open {
            Open::Function => {
                let captures = ARGUMENT_REGEX.captures(line).ok_or_else(|| {
                    Error::function_map(line_number, "invalid argument format")
                })?;
                state.parse_argument(&captures, line_number)?;
            }
            Open::Map => {
                let captures = MAP_VALUE_REGEX.captures(line).ok_or_else(|| {
                    Error::function_map(line_number, "invalid map item format")
                })?;
                state.parse_map_value(&captures, line_number)?;
            }
            Open::Nothing => {
                return Err(Error::function_map(line_number, "unrecognized value"));
            }
        }
    }

    state.resolve_references()?;
    state.validate()?;

    tracing::debug!(
        "Parsed function map with {} functions and {} maps",
        state.functions.len(),
        state.maps.len()
    );
    Ok(FunctionMap::from_functions(state.functions))
}

fn capture<'a>(captures: &'a regex::Captures<'_>, index: usize) -> Option<&'a str> {
    captures.get(index).map(|m| m.as_str())
}

fn parse_number<T: std::str::FromStr>(text: &str, line: usize, what: &str) -> Result<T> {
    text.trim()
        .parse()
        .map_err(|_| Error::function_map(line, format!("invalid {what} \"{}\"", text.trim())))
}

/// Expand `a-b`, `(a-b, c)` and similar lists into sorted unique type ids.
fn parse_type_list(spec: &str, line: usize) -> Result<Vec<u16>> {
    let inner = spec.trim().trim_start_matches('(').trim_end_matches(')');
    let mut types = BTreeSet::new();
    for part in inner.split(',') {
        if let Some((start, end)) = part.split_once('-') {
            let start: u16 = parse_number(start, line, "type id")?;
            let end: u16 = parse_number(end, line, "type id")?;
            if start > end {
                return Err(Error::function_map(
                    line,
                    format!("invalid type range {start}-{end}"),
                ));
            }
            types.extend(start..=end);
        } else {
            types.insert(parse_number::<u16>(part, line, "type id")?);
        }
    }
    Ok(types.into_iter().collect())
}

impl ParseState {
    fn parse_function(&mut self, captures: &regex::Captures<'_>, line: usize) -> Result<()> {
        let group: u16 = parse_number(&captures[1], line, "group")?;
        let spec = captures[2].trim();

        let kind = if spec == "_" {
            FunctionType::Discard
        } else if let Some(map) = spec.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            self.references.push(MapReference {
                map: map.to_string(),
                line,
                target: ReferenceTarget::FunctionType(self.functions.len()),
            });
            FunctionType::Mapped(Vec::new())
        } else if spec.contains('-') || spec.starts_with('(') {
            FunctionType::Range(parse_type_list(spec, line)?)
        } else {
            FunctionType::Single(parse_number(spec, line, "type id")?)
        };

        let name = match (capture(captures, 3), &kind) {
            (Some(name), _) => name.to_string(),
            (None, FunctionType::Single(type_id)) => format!("{group}:{type_id}"),
            (None, _) => group.to_string(),
        };

        self.functions.push(FunctionInfo {
            group,
            kind,
            name,
            description: capture(captures, 4).unwrap_or_default().trim().to_string(),
            args: Vec::new(),
        });
        self.lines.push(line);
        Ok(())
    }

    fn parse_argument(&mut self, captures: &regex::Captures<'_>, line: usize) -> Result<()> {
        let function_index = self.functions.len() - 1;
        let arg_index = self.functions[function_index].args.len();

        if self.functions[function_index]
            .args
            .last()
            .is_some_and(|arg| arg.is_discard)
        {
            return Err(Error::function_map(
                line,
                "argument discard padding must be the last argument",
            ));
        }

        let type_name = &captures[1];
        let array_len = match capture(captures, 2) {
            Some(len) => parse_number(len, line, "array length")?,
            None => 0,
        };

        let mut is_padding = false;
        let mut is_discard = false;
        let data_type = if let Some(map) = type_name
            .strip_prefix('{')
            .and_then(|s| s.strip_suffix('}'))
        {
            self.references.push(MapReference {
                map: map.to_string(),
                line,
                target: ReferenceTarget::Argument(function_index, arg_index),
            });
            DataType::U16
        } else if let Some(discard) = DISCARD_REGEX.captures(type_name) {
            if array_len > 0 {
                return Err(Error::function_map(
                    line,
                    "argument discard padding cannot be an array",
                ));
            }
            is_discard = true;
            let fill = capture(&discard, 1)
                .and_then(|literal| super::parse_hex(literal).ok())
                .unwrap_or_else(|| vec![0]);
            DataType::Padding(fill)
        } else if PADDING_REGEX.is_match(type_name) {
            is_padding = true;
            DataType::padding(type_name).ok_or_else(|| {
                Error::function_map(line, format!("invalid padding \"{type_name}\""))
            })?
        } else {
            DataType::from_alias(type_name).ok_or_else(|| {
                Error::function_map(line, format!("unknown argument type \"{type_name}\""))
            })?
        };

        let function = &mut self.functions[function_index];
        let name = capture(captures, 3)
            .map_or_else(|| format!("arg{}", arg_index + 1), str::to_string);

        if let Some(existing) = function.args.iter().find(|arg| arg.name == name) {
            if !(existing.is_padding && is_padding) {
                return Err(Error::function_map(
                    line,
                    format!("duplicate argument name \"{name}\""),
                ));
            }
        }

        function.args.push(FunctionArg {
            name,
            description: capture(captures, 4).unwrap_or_default().trim().to_string(),
            data_type,
            array_len,
            is_padding,
            is_discard,
            value_map: None,
        });
        Ok(())
    }

    fn parse_map(&mut self, captures: &regex::Captures<'_>, line: usize) -> Result<()> {
        let name = captures[1].to_string();
        let data_type = match capture(captures, 2) {
            Some(alias) => DataType::from_alias(alias).ok_or_else(|| {
                Error::function_map(line, format!("unknown map data type \"{alias}\""))
            })?,
            None => DataType::U16,
        };

        if self.maps.iter().any(|map| map.name == name) {
            return Err(Error::function_map(
                line,
                format!("duplicate map name \"{name}\""),
            ));
        }

        self.maps.push(MapDefinition {
            name,
            data_type,
            values: Vec::new(),
        });
        Ok(())
    }

    fn parse_map_value(&mut self, captures: &regex::Captures<'_>, line: usize) -> Result<()> {
        let Some(map) = self.maps.last_mut() else {
            return Err(Error::function_map(line, "map value outside of a map"));
        };

        let value = captures[1].to_string();
        let name = capture(captures, 2).unwrap_or(&value).to_string();

        if map
            .data_type
            .serialize(&value, false, TextEncoding::Utf8)
            .is_err()
        {
            return Err(Error::function_map(
                line,
                format!(
                    "value \"{value}\" is not a valid {} for map \"{}\"",
                    map.data_type, map.name
                ),
            ));
        }

        if map.values.iter().any(|v| v.value == value) {
            return Err(Error::function_map(
                line,
                format!("duplicate value \"{value}\" in map \"{}\"", map.name),
            ));
        }
        if map.values.iter().any(|v| v.name == name) {
            return Err(Error::function_map(
                line,
                format!("duplicate value name \"{name}\" in map \"{}\"", map.name),
            ));
        }

        map.values.push(FunctionValue {
            value,
            name,
            description: capture(captures, 3).unwrap_or_default().trim().to_string(),
        });
        Ok(())
    }

    fn resolve_references(&mut self) -> Result<()> {
        for reference in &self.references {
            let map = self
                .maps
                .iter()
                .find(|map| map.name == reference.map)
                .ok_or_else(|| {
                    Error::function_map(
                        reference.line,
                        format!("undefined map \"{}\"", reference.map),
                    )
                })?;

            match reference.target {
                ReferenceTarget::FunctionType(function) => {
                    if map.data_type != DataType::U16 {
                        return Err(Error::function_map(
                            reference.line,
                            format!(
                                "map \"{}\" must use u16 to define function types",
                                map.name
                            ),
                        ));
                    }
                    self.functions[function].kind = FunctionType::Mapped(map.values.clone());
                }
                ReferenceTarget::Argument(function, arg) => {
                    let arg = &mut self.functions[function].args[arg];
                    arg.data_type = map.data_type.clone();
                    arg.value_map = Some(map.values.clone());
                }
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        for (index, function) in self.functions.iter().enumerate() {
            let line = self.lines[index];
            let types: BTreeSet<u16> = function.type_ids().into_iter().collect();

            for other in &self.functions[..index] {
                let same_name = function.name.eq_ignore_ascii_case(&other.name);

                if other.group != function.group {
                    if same_name {
                        return Err(Error::function_map(
                            line,
                            format!(
                                "function name \"{}\" is already used in group {}",
                                function.name, other.group
                            ),
                        ));
                    }
                    continue;
                }

                if function.is_discard() && other.is_discard() {
                    return Err(Error::function_map(
                        line,
                        format!("group {} already has a discard function", function.group),
                    ));
                }

                let plain = |f: &FunctionInfo| matches!(f.kind, FunctionType::Single(_));
                if same_name && plain(function) && plain(other) {
                    return Err(Error::function_map(
                        line,
                        format!("duplicate function name \"{}\"", function.name),
                    ));
                }

                if let Some(type_id) = other.type_ids().into_iter().find(|t| types.contains(t)) {
                    return Err(Error::function_map(
                        line,
                        format!(
                            "type {type_id} of \"{}\" overlaps with \"{}\" in group {}",
                            function.name, other.name, function.group
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn syntax_line(result: Result<FunctionMap>) -> usize {
        match result {
            Err(Error::FunctionMapSyntax { line, .. }) => line,
            other => panic!("expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_simple_function() {
        let map = parse("[1, 2] greet # says hi\n  str name\n").unwrap();
        let function = map.get(1, 2).unwrap();
        assert_eq!(function.name, "greet");
        assert_eq!(function.description, "says hi");
        assert_eq!(function.args.len(), 1);
        assert_eq!(function.args[0].name, "name");
        assert_eq!(function.args[0].data_type, DataType::Str);
    }

    #[test]
    fn test_default_names() {
        let map = parse("[3, 4]\n  u8\n  0xCDCD\n  0xCDCD\n[3, _]\n[5, 1-3]\n").unwrap();
        let plain = map.get(3, 4).unwrap();
        assert_eq!(plain.name, "3:4");
        assert_eq!(plain.args[0].name, "arg1");
        assert!(plain.args[1].is_padding);
        assert_eq!(plain.args[2].name, "arg3");
        assert_eq!(map.get(3, 9).unwrap().name, "3");
        assert_eq!(map.get(5, 2).unwrap().name, "5");
    }

    #[test]
    fn test_type_lists() {
        let map = parse("[0, (1-3, 7, 2)] mixed\n").unwrap();
        let function = map.get(0, 7).unwrap();
        assert_eq!(function.kind, FunctionType::Range(vec![1, 2, 3, 7]));
        assert!(map.get(0, 4).is_none());
    }

    #[test]
    fn test_overlapping_ranges() {
        let source = "[1, (1-5)] first\n\n[1, (4-8)] second\n";
        assert_eq!(syntax_line(parse(source)), 3);
    }

    #[test]
    fn test_single_overlaps_range() {
        assert_eq!(syntax_line(parse("[1, 4] single\n[1, 2-6] range\n")), 2);
        assert_eq!(syntax_line(parse("[1, 2-6] range\n[1, 4] single\n")), 2);
        assert_eq!(syntax_line(parse("[1, 4] a\n[1, 4] b\n")), 2);
    }

    #[test]
    fn test_group_rules() {
        assert_eq!(syntax_line(parse("[1, _] a\n[1, _] b\n")), 2);
        assert_eq!(syntax_line(parse("[1, 0] dup\n[1, 1] dup\n")), 2);
        assert_eq!(syntax_line(parse("[1, 0] name\n[2, 0] name\n")), 2);
        // ranged functions may share their default name
        assert!(parse("[1, 0-1]\n[1, 2-3]\n").is_ok());
    }

    #[test]
    fn test_maps() {
        let source = "\
[0, {sizes}] size
  {colors} color
  u8 alpha

map sizes
  0 small
  1 large # big text

map colors u8
  0 red
  1 blue
";
        let map = parse(source).unwrap();
        let function = map.get(0, 1).unwrap();
        assert_eq!(function.name, "size");
        assert!(function.is_mapped());
        assert_eq!(function.args[0].data_type, DataType::U8);
        let values = function.args[0].value_map.as_ref().unwrap();
        assert_eq!(values[1].name, "blue");
    }

    #[test]
    fn test_map_errors() {
        assert_eq!(syntax_line(parse("[0, 0]\n  {missing} a\n")), 2);
        assert_eq!(syntax_line(parse("[0, {m}]\nmap m u8\n  1 one\n")), 1);
        assert_eq!(syntax_line(parse("map m u8\n  300 big\n")), 2);
        assert_eq!(syntax_line(parse("map m\n  1 one\n  1 uno\n")), 3);
        assert_eq!(syntax_line(parse("map m\n  1 one\n  2 one\n")), 3);
        assert_eq!(syntax_line(parse("map m\nmap m\n")), 2);
        assert_eq!(syntax_line(parse("map m vec3\n")), 1);
    }

    #[test]
    fn test_argument_errors() {
        assert_eq!(syntax_line(parse("[0, 0]\n  _\n  u8\n")), 3);
        assert_eq!(syntax_line(parse("[0, 0]\n  _[2]\n")), 2);
        assert_eq!(syntax_line(parse("[0, 0]\n  vec3 a\n")), 2);
        assert_eq!(syntax_line(parse("[0, 0]\n  u8 a\n  u16 a\n")), 3);
        assert_eq!(syntax_line(parse("[0, 0]\n u8 a\n")), 2);
        assert_eq!(syntax_line(parse("  u8 a\n")), 1);
    }

    #[test]
    fn test_discard_argument() {
        let map = parse("[0, 0]\n  nstr text\n  _0xCD\n").unwrap();
        let arg = &map.get(0, 0).unwrap().args[1];
        assert!(arg.is_discard);
        assert_eq!(arg.discard_fill(), 0xCD);
    }

    #[test]
    fn test_comments_and_crlf() {
        let map = parse("# header\r\n[0, 1] a\r\n  u8 v # value\r\n\r\n").unwrap();
        assert_eq!(map.get(0, 1).unwrap().args[0].description, "value");
    }
}
