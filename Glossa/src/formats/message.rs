//! Message model shared by MSBT and BMG

use crate::error::{Error, Result};
use crate::function_table::FunctionTable;
use crate::text::FormatProvider;
use regex::Regex;

lazy_static::lazy_static! {
    static ref PLACEHOLDER_REGEX: Regex =
        Regex::new(r"\{\{(\d+)\}\}").expect("placeholder pattern is valid");
}

/// A raw control tag embedded in message text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionCall {
    pub group: u16,
    pub type_id: u16,
    pub args: Vec<u8>,
}

/// One localized message.
///
/// `text` contains `{{n}}` placeholders that reference `functions[n]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Message {
    pub label: String,
    /// MSBT `NLI1` id.
    pub index: Option<u32>,
    pub attribute: Option<Vec<u8>>,
    /// MSBT `ATR1` string attribute; exclusive with `attribute` within a file.
    pub attribute_text: Option<String>,
    /// MSBT `TSY1` style index.
    pub style_index: Option<u32>,
    pub text: String,
    pub functions: Vec<FunctionCall>,
}

/// Piece of message text between function placeholders.
pub(crate) enum Segment<'a> {
    Text(&'a str),
    Function(&'a FunctionCall),
}

/// Placeholder text for function `index`.
#[must_use]
pub fn placeholder(index: usize) -> String {
    format!("{{{{{index}}}}}")
}

impl Message {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Message text with every placeholder removed.
    #[must_use]
    pub fn to_clean_string(&self) -> String {
        PLACEHOLDER_REGEX.replace_all(&self.text, "").into_owned()
    }

    /// Message text with each placeholder replaced by its formatted function.
    ///
    /// # Errors
    ///
    /// Returns an error if a function's arguments cannot be decoded.
    pub fn to_compiled_string(
        &self,
        table: &FunctionTable<'_>,
        provider: &dyn FormatProvider,
    ) -> Result<String> {
        let formatted = self
            .functions
            .iter()
            .map(|call| {
                table
                    .decode(call)
                    .map(|decoded| provider.format_function(self, &decoded))
            })
            .collect::<Result<Vec<_>>>()?;

        let text = PLACEHOLDER_REGEX.replace_all(&self.text, |captures: &regex::Captures<'_>| {
            captures[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| formatted.get(index))
                .map_or_else(|| captures[0].to_string(), Clone::clone)
        });
        Ok(provider.format_message(self, &text))
    }

    /// Split the text at each function placeholder, in function order.
    pub(crate) fn segments(&self) -> Result<Vec<Segment<'_>>> {
        let mut segments = Vec::with_capacity(self.functions.len() * 2 + 1);
        let mut rest = self.text.as_str();

        for (index, function) in self.functions.iter().enumerate() {
            let marker = placeholder(index);
            let (before, after) = rest.split_once(&marker).ok_or_else(|| Error::MissingPlaceholder {
                label: self.label.clone(),
                index,
            })?;
            segments.push(Segment::Text(before));
            segments.push(Segment::Function(function));
            rest = after;
        }

        segments.push(Segment::Text(rest));
        Ok(segments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::TextEncoding;
    use crate::function_map::FunctionMap;
    use crate::text::DefaultFormatProvider;
    use pretty_assertions::assert_eq;

    fn sample() -> Message {
        Message {
            label: "greeting".into(),
            text: "Hello {{0}}world{{1}}!".into(),
            functions: vec![
                FunctionCall {
                    group: 0,
                    type_id: 3,
                    args: vec![1, 0],
                },
                FunctionCall {
                    group: 9,
                    type_id: 9,
                    args: Vec::new(),
                },
            ],
            ..Message::default()
        }
    }

    #[test]
    fn test_clean_string() {
        assert_eq!(sample().to_clean_string(), "Hello world!");
    }

    #[test]
    fn test_compiled_string() {
        let map = FunctionMap::parse("[0, 3] color\n  u16 id\n").unwrap();
        let table = FunctionTable::new(&map, false, TextEncoding::Utf16Le);
        let text = sample()
            .to_compiled_string(&table, &DefaultFormatProvider)
            .unwrap();
        assert_eq!(text, "Hello {{color id=\"1\"}}world{{9:9}}!");
    }

    #[test]
    fn test_segments_require_placeholders() {
        let mut message = sample();
        assert_eq!(message.segments().unwrap().len(), 5);
        message.text = "Hello {{0}}".into();
        assert!(matches!(
            message.segments(),
            Err(Error::MissingPlaceholder { index: 1, .. })
        ));
    }
}
