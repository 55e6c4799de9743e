//! JSON parsing and pretty-printing for test case documents.
//!
//! Parsing goes through `serde_json` and converts the result into the
//! `CaseValue` model. Input may be a single object or an array of objects;
//! anything else is kept whole as a single document.
//!
//! # Example
//!
//! ```
//! use casequill::document::parser::parse_documents;
//!
//! let docs = parse_documents(r#"[{"a": 1}, {"b": null}]"#).unwrap();
//! assert_eq!(docs.len(), 2);
//!
//! let single = parse_documents(r#"{"a": 1}"#).unwrap();
//! assert_eq!(single.len(), 1);
//! ```

use super::node::CaseValue;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::Value as SerdeValue;
use std::fmt;

/// A JSON syntax error with the position reported by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid JSON: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

impl From<serde_json::Error> for ParseError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Parses text into a single document.
///
/// Any JSON value is accepted; no schema is applied.
pub fn parse_document(text: &str) -> Result<CaseValue, ParseError> {
    let value: SerdeValue = serde_json::from_str(text)?;
    Ok(CaseValue::from(&value))
}

/// Parses text into a list of documents.
///
/// An array whose elements are all objects yields one document per element.
/// Any other value, including an array holding non-objects, is wrapped as a
/// one-element list.
pub fn parse_documents(text: &str) -> Result<Vec<CaseValue>, ParseError> {
    let value = parse_document(text)?;
    Ok(split_documents(value))
}

/// Splits an already-parsed value into documents using the same rules as
/// [`parse_documents`].
pub fn split_documents(value: CaseValue) -> Vec<CaseValue> {
    match value {
        CaseValue::Array(items) if items.iter().all(CaseValue::is_object) => items,
        other => vec![other],
    }
}

/// Pretty-prints a document with the given number of spaces per level.
pub fn to_pretty_json(value: &CaseValue, indent: usize) -> String {
    serialize_pretty(&value.to_serde(), indent)
}

/// Pretty-prints a list of documents as one JSON array.
pub fn to_pretty_json_array(values: &[CaseValue], indent: usize) -> String {
    let array = SerdeValue::Array(values.iter().map(CaseValue::to_serde).collect());
    serialize_pretty(&array, indent)
}

fn serialize_pretty(value: &SerdeValue, indent: usize) -> String {
    let indent_str = " ".repeat(indent);
    let formatter = PrettyFormatter::with_indent(indent_str.as_bytes());
    let mut buf = Vec::new();
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    if value.serialize(&mut ser).is_err() {
        // Writing into a Vec only fails on invalid data, which Value cannot hold
        return value.to_string();
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_reports_position() {
        let err = parse_document(r#"{"a": }"#).unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.column > 0);
        assert!(err.to_string().starts_with("Invalid JSON:"));
    }

    #[test]
    fn test_array_of_objects_is_split() {
        let docs = parse_documents(r#"[{"a": 1}, {"a": 2}, {}]"#).unwrap();
        assert_eq!(docs.len(), 3);
    }

    #[test]
    fn test_mixed_array_is_one_document() {
        let docs = parse_documents(r#"[{"a": 1}, 5]"#).unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs[0].is_array());
    }

    #[test]
    fn test_scalar_is_wrapped() {
        let docs = parse_documents("42").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].kind_name(), "number");
    }

    #[test]
    fn test_empty_array_yields_no_documents() {
        let docs = parse_documents("[]").unwrap();
        assert!(docs.is_empty());
    }

    #[test]
    fn test_pretty_json_uses_requested_indent() {
        let doc = parse_document(r#"{"a": {"b": 1}}"#).unwrap();
        let two = to_pretty_json(&doc, 2);
        assert!(two.contains("\n  \"a\": {\n    \"b\": 1"));

        let four = to_pretty_json(&doc, 4);
        assert!(four.contains("\n    \"a\""));
    }

    #[test]
    fn test_pretty_json_array() {
        let docs = parse_documents(r#"[{"a": 1}]"#).unwrap();
        assert_eq!(to_pretty_json_array(&docs, 2), "[\n  {\n    \"a\": 1\n  }\n]");
    }
}
