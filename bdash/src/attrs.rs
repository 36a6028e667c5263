use std::ops::Range;

use crate::parser::error::ParseError;

/// Attributes parsed from one fenced block's info-string:
/// `{#id .class key=value ...}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Key/value pairs in source order. First occurrence wins on lookup;
    /// unknown keys are preserved for forward compatibility.
    pub kvs: Vec<(String, String)>,
}

impl AttributeSet {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.kvs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

/// Parse the interior of a brace-wrapped info-string into an AttributeSet.
///
/// Grammar: whitespace-separated tokens; each token is `.class`, `#id`,
/// or `key=value`. Values are unquoted strings with no embedded
/// whitespace (quoting is not supported in v1).
pub fn parse_attributes(
    input: &str,
    span: Range<usize>,
    file_id: usize,
) -> Result<AttributeSet, ParseError> {
    let mut attrs = AttributeSet::default();

    for token in input.split_whitespace() {
        if let Some(class) = token.strip_prefix('.') {
            if class.is_empty() {
                return Err(ParseError::error("empty class marker '.'", span, file_id));
            }
            attrs.classes.push(class.to_string());
        } else if let Some(id) = token.strip_prefix('#') {
            if id.is_empty() {
                return Err(ParseError::error("empty id marker '#'", span, file_id));
            }
            if attrs.id.is_none() {
                attrs.id = Some(id.to_string());
            }
        } else if let Some((key, value)) = token.split_once('=') {
            if key.is_empty() {
                return Err(ParseError::error(
                    format!("attribute token '{}' has an empty key", token),
                    span,
                    file_id,
                ));
            }
            if value.is_empty() {
                return Err(ParseError::error(
                    format!("attribute token '{}' has an empty value", token),
                    span,
                    file_id,
                ));
            }
            if value.starts_with('"') || value.starts_with('\'') {
                return Err(ParseError::error(
                    format!("attribute value in '{}' is quoted", token),
                    span,
                    file_id,
                )
                .with_note("quoted attribute values are not supported"));
            }
            attrs.kvs.push((key.to_string(), value.to_string()));
        } else {
            return Err(ParseError::error(
                format!("invalid attribute token '{}'", token),
                span,
                file_id,
            )
            .with_note("expected `.class`, `#id`, or `key=value`"));
        }
    }

    Ok(attrs)
}
