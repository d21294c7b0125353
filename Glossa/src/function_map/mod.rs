//! Function map language
//!
//! Message formats embed control tags as raw `(group, type, args)` records.
//! A function map is a small text file that gives those records names and
//! typed arguments so they can be edited as text:
//!
//! ```text
//! map colors u16     # text colours
//!   0 red
//!   1 blue
//!
//! [0, 3] color       # change the text colour
//!   {colors} value
//!
//! [1, (0-2, 5)] ruby
//!   u16 base
//!   nstr text
//!   _0xCD
//! ```
//!
//! [`FunctionMap::parse`] compiles the source into an immutable lookup
//! structure that can be shared between threads.

mod data_types;
mod lookup;
mod parser;

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

pub use data_types::{DataType, to_hex};
pub(crate) use data_types::parse_hex;

use crate::error::{Error, Result};

/// One entry of a value map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionValue {
    /// Raw value as written in the map (parsed with the map's data type).
    pub value: String,
    /// Display name used in text.
    pub name: String,
    pub description: String,
}

/// Type ids covered by a function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionType {
    /// Exactly one type id.
    Single(u16),
    /// A sorted, deduplicated list of type ids.
    Range(Vec<u16>),
    /// Every type id of the group that no other function claims.
    Discard,
    /// Type ids taken from a `u16` value map; each value has its own name.
    Mapped(Vec<FunctionValue>),
}

/// One argument of a function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionArg {
    pub name: String,
    pub description: String,
    pub data_type: DataType,
    /// Number of array elements, 0 for a scalar.
    pub array_len: usize,
    pub is_padding: bool,
    /// Trailing fill that pads the arguments to the text encoding's unit width.
    pub is_discard: bool,
    pub value_map: Option<Vec<FunctionValue>>,
}

impl FunctionArg {
    /// Fill byte of a discard argument.
    #[must_use]
    pub fn discard_fill(&self) -> u8 {
        match &self.data_type {
            DataType::Padding(bytes) => bytes.first().copied().unwrap_or(0),
            _ => 0,
        }
    }
}

/// A named function definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionInfo {
    pub group: u16,
    pub kind: FunctionType,
    pub name: String,
    pub description: String,
    pub args: Vec<FunctionArg>,
}

impl FunctionInfo {
    #[must_use]
    pub fn is_discard(&self) -> bool {
        matches!(self.kind, FunctionType::Discard)
    }

    #[must_use]
    pub fn is_ranged(&self) -> bool {
        matches!(self.kind, FunctionType::Range(_))
    }

    #[must_use]
    pub fn is_mapped(&self) -> bool {
        matches!(self.kind, FunctionType::Mapped(_))
    }

    /// Explicit type ids claimed by this function (empty for discard functions).
    #[must_use]
    pub fn type_ids(&self) -> Vec<u16> {
        match &self.kind {
            FunctionType::Single(type_id) => vec![*type_id],
            FunctionType::Range(types) => types.clone(),
            FunctionType::Discard => Vec::new(),
            FunctionType::Mapped(values) => values
                .iter()
                .filter_map(|value| value.value.trim().parse().ok())
                .collect(),
        }
    }

    /// Map value whose raw value equals `type_id`.
    #[must_use]
    pub fn value_for_type(&self, type_id: u16) -> Option<&FunctionValue> {
        match &self.kind {
            FunctionType::Mapped(values) => values
                .iter()
                .find(|value| value.value.trim().parse::<u16>().ok() == Some(type_id)),
            _ => None,
        }
    }

    /// Type id of the map value named `name` (case-insensitive).
    #[must_use]
    pub fn type_for_value(&self, name: &str) -> Option<u16> {
        match &self.kind {
            FunctionType::Mapped(values) => values
                .iter()
                .find(|value| value.name.eq_ignore_ascii_case(name))
                .and_then(|value| value.value.trim().parse().ok()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct GroupEntry {
    types: BTreeMap<u16, usize>,
    discard: Option<usize>,
}

/// A compiled function map.
#[derive(Debug, Clone, Default)]
pub struct FunctionMap {
    functions: Vec<FunctionInfo>,
    groups: BTreeMap<u16, GroupEntry>,
}

impl FunctionMap {
    /// Compile function map source text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FunctionMapSyntax`] with the 1-based line number of
    /// the first malformed or conflicting definition.
    pub fn parse(source: &str) -> Result<Self> {
        parser::parse(source)
    }

    /// Read and compile a function map file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or
    /// [`Error::FunctionMapSyntax`] if it is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::parse(&source)
    }

    /// All definitions in source order.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionInfo> {
        self.functions.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    fn from_functions(functions: Vec<FunctionInfo>) -> Self {
        let mut groups: BTreeMap<u16, GroupEntry> = BTreeMap::new();
        for (index, function) in functions.iter().enumerate() {
            let entry = groups.entry(function.group).or_default();
            if function.is_discard() {
                entry.discard = Some(index);
            } else {
                for type_id in function.type_ids() {
                    entry.types.insert(type_id, index);
                }
            }
        }
        Self { functions, groups }
    }
}

impl FromStr for FunctionMap {
    type Err = Error;

    fn from_str(source: &str) -> Result<Self> {
        Self::parse(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_map_is_shareable() {
        assert_send_sync::<FunctionMap>();
    }

    #[test]
    fn test_mapped_values() {
        let info = FunctionInfo {
            group: 2,
            kind: FunctionType::Mapped(vec![
                FunctionValue {
                    value: "4".into(),
                    name: "small".into(),
                    description: String::new(),
                },
                FunctionValue {
                    value: "9".into(),
                    name: "large".into(),
                    description: String::new(),
                },
            ]),
            name: "size".into(),
            description: String::new(),
            args: Vec::new(),
        };
        assert_eq!(info.type_ids(), vec![4, 9]);
        assert_eq!(info.type_for_value("LARGE"), Some(9));
        assert_eq!(info.value_for_type(4).map(|v| v.name.as_str()), Some("small"));
        assert!(info.value_for_type(5).is_none());
    }
}
