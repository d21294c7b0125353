//! Rendering of functions inside round-trip text

use crate::formats::Message;
use crate::function_table::DecodedFunction;

/// Controls how decoded functions and whole messages are rendered.
pub trait FormatProvider {
    /// Render one function in place of its placeholder.
    fn format_function(&self, message: &Message, function: &DecodedFunction) -> String;

    /// Post-process the message text after every function was rendered.
    fn format_message(&self, _message: &Message, text: &str) -> String {
        text.to_string()
    }
}

/// Renders `{{name arg="value" list="[1,2]"}}`, the syntax the text reader parses.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFormatProvider;

impl FormatProvider for DefaultFormatProvider {
    fn format_function(&self, _message: &Message, function: &DecodedFunction) -> String {
        let mut out = String::from("{{");
        out.push_str(&function.name);
        for (name, value) in &function.args {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&value.to_string());
            out.push('"');
        }
        out.push_str("}}");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function_table::ArgumentValue;

    #[test]
    fn test_default_format() {
        let function = DecodedFunction {
            name: "pos".into(),
            args: vec![
                ("xy".into(), ArgumentValue::Array(vec!["1".into(), "-1".into()])),
                ("mode".into(), ArgumentValue::Single("fast".into())),
            ],
        };
        let message = Message::new("0");
        assert_eq!(
            DefaultFormatProvider.format_function(&message, &function),
            "{{pos xy=\"[1,-1]\" mode=\"fast\"}}"
        );
        assert_eq!(
            DefaultFormatProvider.format_function(
                &message,
                &DecodedFunction {
                    name: "br".into(),
                    args: Vec::new()
                }
            ),
            "{{br}}"
        );
        assert_eq!(DefaultFormatProvider.format_message(&message, "text"), "text");
    }
}
