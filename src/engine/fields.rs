//! Flat field view of a document for per-field editing.
//!
//! `flatten` turns a nested document into an ordered map from dotted path to
//! a single editable value, and `unflatten` rebuilds the document from that
//! map. Arrays are not descended into: each one is shown as a single text
//! field holding its JSON rendering, and text that looks like a bracketed
//! list is parsed back into an array on the way in. That round trip is
//! lossy only for string fields whose content is itself a JSON array.
//!
//! # Example
//!
//! ```
//! use casequill::document::parser::parse_document;
//! use casequill::engine::fields::{flatten, unflatten, FieldValue};
//!
//! let doc = parse_document(r#"{"mhm": {"age": 25, "rhr_day": [60, 62]}}"#).unwrap();
//! let fields = flatten(&doc, ".").unwrap();
//! assert_eq!(fields.get("mhm.rhr_day"), Some(&FieldValue::Text("[60,62]".to_string())));
//! assert_eq!(unflatten(&fields, ".").unwrap(), doc);
//! ```

use crate::document::node::{CaseNumber, CaseValue};
use crate::document::parser::parse_document;
use indexmap::IndexMap;
use std::fmt;

/// Ordered map from field path to value.
pub type FlatFields = IndexMap<String, FieldValue>;

/// A single editable leaf.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Number(CaseNumber),
    /// A string, or the JSON rendering of an array
    Text(String),
    /// Placeholder for an object with no keys
    EmptyGroup,
}

/// The control used to edit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Checkbox,
    Number,
    Text,
    /// Read-only marker for an empty section
    Group,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Checkbox => "checkbox",
            FieldKind::Number => "number",
            FieldKind::Text => "text",
            FieldKind::Group => "group",
        };
        write!(f, "{}", name)
    }
}

/// Errors from the flat field codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    /// Only objects can be shown as fields.
    NotAnObject { found: &'static str },
    /// The path separator must be non-empty.
    EmptySeparator,
    /// A key that is empty or contains the separator cannot round-trip.
    InvalidKey { key: String },
    /// A path with an empty segment, such as `a..b`.
    EmptySegment { path: String },
    /// A path that runs through a leaf or overwrites a section.
    PathConflict { path: String },
    /// Input that does not fit the field's control.
    InvalidInput { input: String, expected: &'static str },
    /// The field cannot be edited.
    ReadOnly { path: String },
    /// The path names no field of the document.
    UnknownField { path: String },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::NotAnObject { found } => {
                write!(f, "Field view needs an object, found {}", found)
            }
            FieldError::EmptySeparator => write!(f, "Field separator cannot be empty"),
            FieldError::InvalidKey { key } => {
                write!(f, "Key '{}' cannot be used as a field name", key)
            }
            FieldError::EmptySegment { path } => {
                write!(f, "Field path '{}' has an empty segment", path)
            }
            FieldError::PathConflict { path } => {
                write!(f, "Field path '{}' conflicts with another field", path)
            }
            FieldError::InvalidInput { input, expected } => {
                write!(f, "Expected {}, got '{}'", expected, input)
            }
            FieldError::ReadOnly { path } => write!(f, "Field '{}' is read-only", path),
            FieldError::UnknownField { path } => write!(f, "No field named '{}'", path),
        }
    }
}

impl std::error::Error for FieldError {}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => Ok(()),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Text(text) => write!(f, "{}", text),
            FieldValue::EmptyGroup => write!(f, "{{}}"),
        }
    }
}

impl FieldValue {
    /// Picks the control for this value's runtime kind.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Boolean(_) => FieldKind::Checkbox,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Null | FieldValue::Text(_) => FieldKind::Text,
            FieldValue::EmptyGroup => FieldKind::Group,
        }
    }

    fn from_leaf(value: &CaseValue) -> Self {
        match value {
            CaseValue::Null => FieldValue::Null,
            CaseValue::Boolean(b) => FieldValue::Boolean(*b),
            CaseValue::Number(n) => FieldValue::Number(*n),
            CaseValue::String(s) => FieldValue::Text(s.clone()),
            CaseValue::Array(_) => FieldValue::Text(value.to_serde().to_string()),
            CaseValue::Object(entries) if entries.is_empty() => FieldValue::EmptyGroup,
            CaseValue::Object(_) => FieldValue::Text(value.to_serde().to_string()),
        }
    }

    /// Converts the field back into a document value.
    ///
    /// Text wrapped in `[` and `]` is parsed as a JSON array when it can be;
    /// otherwise it stays a string.
    pub fn to_value(&self) -> CaseValue {
        match self {
            FieldValue::Null => CaseValue::Null,
            FieldValue::Boolean(b) => CaseValue::Boolean(*b),
            FieldValue::Number(n) => CaseValue::Number(*n),
            FieldValue::EmptyGroup => CaseValue::empty_object(),
            FieldValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.starts_with('[') && trimmed.ends_with(']') {
                    if let Ok(CaseValue::Array(items)) = parse_document(trimmed) {
                        return CaseValue::Array(items);
                    }
                }
                CaseValue::String(text.clone())
            }
        }
    }

    /// Interprets user input for a field that currently holds `self`.
    ///
    /// - Checkbox fields take `true`/`false` (also `yes`/`no`, `on`/`off`,
    ///   `1`/`0`); blank input clears them to null.
    /// - Number fields take a number; blank input clears them to null.
    /// - String fields take the input verbatim.
    /// - Null fields infer the kind: blank stays null, booleans and numbers
    ///   are recognised, anything else is text.
    ///
    /// A bare `null` clears checkbox, number and null fields.
    pub fn parse_input(&self, input: &str) -> Result<FieldValue, FieldError> {
        let trimmed = input.trim();
        let clears = trimmed.is_empty() || trimmed == "null";
        match self {
            FieldValue::EmptyGroup => Err(FieldError::ReadOnly {
                path: String::new(),
            }),
            FieldValue::Text(_) => Ok(FieldValue::Text(input.to_string())),
            FieldValue::Boolean(_) => {
                if clears {
                    return Ok(FieldValue::Null);
                }
                parse_bool(trimmed)
                    .map(FieldValue::Boolean)
                    .ok_or_else(|| FieldError::InvalidInput {
                        input: input.to_string(),
                        expected: "true or false",
                    })
            }
            FieldValue::Number(_) => {
                if clears {
                    return Ok(FieldValue::Null);
                }
                CaseNumber::parse(trimmed)
                    .map(FieldValue::Number)
                    .ok_or_else(|| FieldError::InvalidInput {
                        input: input.to_string(),
                        expected: "a number",
                    })
            }
            FieldValue::Null => {
                if clears {
                    Ok(FieldValue::Null)
                } else if let Some(b) = strict_bool(trimmed) {
                    Ok(FieldValue::Boolean(b))
                } else if let Some(n) = CaseNumber::parse(trimmed) {
                    Ok(FieldValue::Number(n))
                } else {
                    Ok(FieldValue::Text(input.to_string()))
                }
            }
        }
    }
}

fn strict_bool(text: &str) -> Option<bool> {
    match text {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Flattens an object document into dotted paths.
///
/// Empty objects become [`FieldValue::EmptyGroup`] leaves so the section
/// survives the trip back through [`unflatten`].
pub fn flatten(document: &CaseValue, separator: &str) -> Result<FlatFields, FieldError> {
    if separator.is_empty() {
        return Err(FieldError::EmptySeparator);
    }
    let entries = document.as_object().ok_or(FieldError::NotAnObject {
        found: document.kind_name(),
    })?;

    let mut fields = FlatFields::new();
    flatten_into(entries, None, separator, &mut fields)?;
    Ok(fields)
}

fn flatten_into(
    entries: &IndexMap<String, CaseValue>,
    prefix: Option<&str>,
    separator: &str,
    fields: &mut FlatFields,
) -> Result<(), FieldError> {
    for (key, value) in entries {
        if key.is_empty() || key.contains(separator) {
            return Err(FieldError::InvalidKey { key: key.clone() });
        }
        let path = match prefix {
            Some(prefix) => format!("{}{}{}", prefix, separator, key),
            None => key.clone(),
        };
        match value {
            CaseValue::Object(children) if !children.is_empty() => {
                flatten_into(children, Some(&path), separator, fields)?;
            }
            leaf => {
                fields.insert(path, FieldValue::from_leaf(leaf));
            }
        }
    }
    Ok(())
}

/// Rebuilds a nested document from dotted paths.
pub fn unflatten(fields: &FlatFields, separator: &str) -> Result<CaseValue, FieldError> {
    if separator.is_empty() {
        return Err(FieldError::EmptySeparator);
    }

    let mut root: IndexMap<String, CaseValue> = IndexMap::new();
    for (path, value) in fields {
        let segments: Vec<&str> = path.split(separator).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(FieldError::EmptySegment { path: path.clone() });
        }
        let Some((last, parents)) = segments.split_last() else {
            return Err(FieldError::EmptySegment { path: path.clone() });
        };

        let mut current = &mut root;
        for segment in parents {
            current = match current
                .entry(segment.to_string())
                .or_insert_with(CaseValue::empty_object)
            {
                CaseValue::Object(children) => children,
                _ => return Err(FieldError::PathConflict { path: path.clone() }),
            };
        }

        match (current.get(*last), value) {
            (Some(CaseValue::Object(_)), FieldValue::EmptyGroup) => {}
            (Some(_), _) => return Err(FieldError::PathConflict { path: path.clone() }),
            (None, value) => {
                current.insert(last.to_string(), value.to_value());
            }
        }
    }

    Ok(CaseValue::Object(root))
}

/// One field as presented in a tab.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    /// Full dotted path
    pub path: String,
    /// Path with the tab's segment removed
    pub label: String,
    pub value: FieldValue,
    pub kind: FieldKind,
}

/// Fields sharing a top-level key.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTab {
    pub name: String,
    pub fields: Vec<FieldEntry>,
}

/// Groups fields into tabs by their first path segment, in first-seen order.
pub fn group_by_tab(fields: &FlatFields, separator: &str) -> Vec<FieldTab> {
    let mut tabs: IndexMap<String, Vec<FieldEntry>> = IndexMap::new();
    for (path, value) in fields {
        let (name, label) = match path.split_once(separator) {
            Some((head, rest)) if !separator.is_empty() => (head, rest),
            _ => (path.as_str(), path.as_str()),
        };
        tabs.entry(name.to_string()).or_default().push(FieldEntry {
            path: path.clone(),
            label: label.to_string(),
            value: value.clone(),
            kind: value.kind(),
        });
    }
    tabs.into_iter()
        .map(|(name, fields)| FieldTab { name, fields })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> CaseValue {
        parse_document(text).unwrap()
    }

    #[test]
    fn test_flatten_nested_paths() {
        let fields = flatten(&doc(r#"{"mhm": {"age": 25, "sex": "f"}, "clip": true}"#), ".")
            .unwrap();
        let paths: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["mhm.age", "mhm.sex", "clip"]);
        assert_eq!(fields["clip"], FieldValue::Boolean(true));
    }

    #[test]
    fn test_flatten_custom_separator() {
        let fields = flatten(&doc(r#"{"a": {"b": {"c": 1}}}"#), "/").unwrap();
        assert!(fields.contains_key("a/b/c"));
        assert_eq!(unflatten(&fields, "/").unwrap(), doc(r#"{"a": {"b": {"c": 1}}}"#));
    }

    #[test]
    fn test_empty_sections_round_trip() {
        let original = doc(r#"{"smk": {}, "mhm": {"age": null}}"#);
        let fields = flatten(&original, ".").unwrap();
        assert_eq!(fields["smk"], FieldValue::EmptyGroup);
        assert_eq!(unflatten(&fields, ".").unwrap(), original);
    }

    #[test]
    fn test_flatten_rejects_non_objects() {
        assert_eq!(
            flatten(&CaseValue::Array(vec![]), "."),
            Err(FieldError::NotAnObject { found: "array" })
        );
    }

    #[test]
    fn test_flatten_rejects_keys_with_separator() {
        let result = flatten(&doc(r#"{"a.b": 1}"#), ".");
        assert_eq!(
            result,
            Err(FieldError::InvalidKey {
                key: "a.b".to_string()
            })
        );
        assert!(flatten(&doc(r#"{"": 1}"#), ".").is_err());
    }

    #[test]
    fn test_unflatten_rejects_empty_segments() {
        for path in ["", ".a", "a.", "a..b"] {
            let mut fields = FlatFields::new();
            fields.insert(path.to_string(), FieldValue::Null);
            assert_eq!(
                unflatten(&fields, "."),
                Err(FieldError::EmptySegment {
                    path: path.to_string()
                }),
                "path {:?}",
                path
            );
        }
    }

    #[test]
    fn test_unflatten_rejects_conflicts() {
        let mut fields = FlatFields::new();
        fields.insert("a".to_string(), FieldValue::Number(CaseNumber::Integer(1)));
        fields.insert("a.b".to_string(), FieldValue::Number(CaseNumber::Integer(2)));
        assert!(matches!(
            unflatten(&fields, "."),
            Err(FieldError::PathConflict { .. })
        ));

        let mut reversed = FlatFields::new();
        reversed.insert("a.b".to_string(), FieldValue::Number(CaseNumber::Integer(2)));
        reversed.insert("a".to_string(), FieldValue::Number(CaseNumber::Integer(1)));
        assert!(matches!(
            unflatten(&reversed, "."),
            Err(FieldError::PathConflict { .. })
        ));
    }

    #[test]
    fn test_bracketed_text_becomes_array() {
        let mut fields = FlatFields::new();
        fields.insert("slp.bed".to_string(), FieldValue::Text(" [22, 23] ".to_string()));
        fields.insert("slp.note".to_string(), FieldValue::Text("[not json]".to_string()));
        let rebuilt = unflatten(&fields, ".").unwrap();
        assert_eq!(rebuilt, doc(r#"{"slp": {"bed": [22, 23], "note": "[not json]"}}"#));
    }

    #[test]
    fn test_kinds() {
        assert_eq!(FieldValue::Boolean(false).kind(), FieldKind::Checkbox);
        assert_eq!(FieldValue::Number(CaseNumber::Float(1.5)).kind(), FieldKind::Number);
        assert_eq!(FieldValue::Null.kind(), FieldKind::Text);
        assert_eq!(FieldValue::Text("[1]".to_string()).kind(), FieldKind::Text);
        assert_eq!(FieldValue::EmptyGroup.kind(), FieldKind::Group);
    }

    #[test]
    fn test_parse_input_by_kind() {
        let checkbox = FieldValue::Boolean(true);
        assert_eq!(checkbox.parse_input("no"), Ok(FieldValue::Boolean(false)));
        assert_eq!(checkbox.parse_input(""), Ok(FieldValue::Null));
        assert!(checkbox.parse_input("maybe").is_err());

        let number = FieldValue::Number(CaseNumber::Integer(1));
        assert_eq!(
            number.parse_input("72.5"),
            Ok(FieldValue::Number(CaseNumber::Float(72.5)))
        );
        assert!(number.parse_input("tall").is_err());

        let text = FieldValue::Text("x".to_string());
        assert_eq!(text.parse_input("42"), Ok(FieldValue::Text("42".to_string())));

        let unset = FieldValue::Null;
        assert_eq!(unset.parse_input(" "), Ok(FieldValue::Null));
        assert_eq!(unset.parse_input("false"), Ok(FieldValue::Boolean(false)));
        assert_eq!(
            unset.parse_input("25"),
            Ok(FieldValue::Number(CaseNumber::Integer(25)))
        );
        assert_eq!(unset.parse_input("m"), Ok(FieldValue::Text("m".to_string())));

        assert!(FieldValue::EmptyGroup.parse_input("x").is_err());
    }

    #[test]
    fn test_null_input_clears_field() {
        assert_eq!(FieldValue::Null.parse_input("null"), Ok(FieldValue::Null));
        assert_eq!(FieldValue::Boolean(true).parse_input(" null "), Ok(FieldValue::Null));
        assert_eq!(
            FieldValue::Number(CaseNumber::Integer(3)).parse_input("null"),
            Ok(FieldValue::Null)
        );
        // text fields keep what was typed
        assert_eq!(
            FieldValue::Text("x".to_string()).parse_input("null"),
            Ok(FieldValue::Text("null".to_string()))
        );
    }

    #[test]
    fn test_empty_group_merges_with_nested_leaf() {
        let expected = doc(r#"{"a": {"b": 1}}"#);

        let mut group_first = FlatFields::new();
        group_first.insert("a".to_string(), FieldValue::EmptyGroup);
        group_first.insert("a.b".to_string(), FieldValue::Number(CaseNumber::Integer(1)));
        assert_eq!(unflatten(&group_first, ".").unwrap(), expected);

        let mut leaf_first = FlatFields::new();
        leaf_first.insert("a.b".to_string(), FieldValue::Number(CaseNumber::Integer(1)));
        leaf_first.insert("a".to_string(), FieldValue::EmptyGroup);
        assert_eq!(unflatten(&leaf_first, ".").unwrap(), expected);
    }

    #[test]
    fn test_group_by_tab() {
        let fields = flatten(
            &doc(r#"{"mhm": {"age": 25, "bp": {"sbp": 120}}, "clip": null, "smk": {"now": true}}"#),
            ".",
        )
        .unwrap();
        let tabs = group_by_tab(&fields, ".");
        let names: Vec<&str> = tabs.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["mhm", "clip", "smk"]);
        assert_eq!(tabs[0].fields[1].label, "bp.sbp");
        assert_eq!(tabs[1].fields[0].label, "clip");
        assert_eq!(tabs[2].fields[0].kind, FieldKind::Checkbox);
    }
}
