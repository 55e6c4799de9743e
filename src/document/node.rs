//! Test case value representation.
//!
//! This module provides the core data structure for representing test case
//! documents in casequill. Every document is a `CaseValue`: a tagged variant
//! over the six JSON node kinds. The canonicalization engine matches on this
//! variant exhaustively instead of inspecting types at runtime.
//!
//! # Example
//!
//! ```
//! use casequill::document::node::{CaseNumber, CaseValue};
//! use indexmap::IndexMap;
//!
//! let mut mhm = IndexMap::new();
//! mhm.insert("age".to_string(), CaseValue::Number(CaseNumber::Integer(25)));
//! mhm.insert("hgt".to_string(), CaseValue::Null);
//!
//! let mut root = IndexMap::new();
//! root.insert("mhm".to_string(), CaseValue::Object(mhm));
//! let doc = CaseValue::Object(root);
//!
//! assert!(doc.is_object());
//! assert_eq!(doc.get("mhm").and_then(|m| m.get("age")).map(|v| v.kind_name()), Some("number"));
//! ```

use indexmap::IndexMap;
use serde_json::Value as SerdeValue;

/// Represents JSON numbers (integer or float)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CaseNumber {
    Integer(i64),
    Float(f64),
}

impl std::fmt::Display for CaseNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaseNumber::Integer(i) => write!(f, "{}", i),
            CaseNumber::Float(fl) => write!(f, "{}", fl),
        }
    }
}

impl CaseNumber {
    pub fn as_f64(&self) -> f64 {
        match self {
            CaseNumber::Integer(i) => *i as f64,
            CaseNumber::Float(f) => *f,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, CaseNumber::Integer(_))
    }

    /// Parses user input into a number, preferring integers.
    ///
    /// Returns `None` for anything that is not a finite decimal number.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Ok(i) = text.parse::<i64>() {
            return Some(CaseNumber::Integer(i));
        }
        match text.parse::<f64>() {
            Ok(f) if f.is_finite() => Some(CaseNumber::Float(f)),
            _ => None,
        }
    }
}

/// One node of a test case document.
///
/// Objects keep their keys in insertion order for display, but equality
/// ignores key order: two objects are equal when they hold the same keys
/// mapped to equal values.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseValue {
    /// A mapping from string keys to values
    Object(IndexMap<String, CaseValue>),
    /// An ordered sequence of values
    Array(Vec<CaseValue>),
    /// A string
    String(String),
    /// A number (integer or float)
    Number(CaseNumber),
    /// A boolean
    Boolean(bool),
    /// JSON null, also used for "no answer"
    Null,
}

impl CaseValue {
    /// Creates an empty object.
    pub fn empty_object() -> Self {
        CaseValue::Object(IndexMap::new())
    }

    /// Returns true if this value is an object.
    ///
    /// # Example
    ///
    /// ```
    /// use casequill::document::node::CaseValue;
    ///
    /// assert!(CaseValue::empty_object().is_object());
    /// assert!(!CaseValue::Null.is_object());
    /// ```
    pub fn is_object(&self) -> bool {
        matches!(self, CaseValue::Object(_))
    }

    /// Returns true if this value is an array.
    pub fn is_array(&self) -> bool {
        matches!(self, CaseValue::Array(_))
    }

    /// Returns the entries of an object, or `None` for any other kind.
    pub fn as_object(&self) -> Option<&IndexMap<String, CaseValue>> {
        match self {
            CaseValue::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Looks up a key on an object. Non-objects have no keys.
    pub fn get(&self, key: &str) -> Option<&CaseValue> {
        self.as_object().and_then(|entries| entries.get(key))
    }

    /// A short lowercase name for the value's kind, used in messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            CaseValue::Object(_) => "object",
            CaseValue::Array(_) => "array",
            CaseValue::String(_) => "string",
            CaseValue::Number(_) => "number",
            CaseValue::Boolean(_) => "boolean",
            CaseValue::Null => "null",
        }
    }

    /// Converts this value into a `serde_json::Value` for serialization.
    ///
    /// Non-finite floats have no JSON representation and become `null`.
    pub fn to_serde(&self) -> SerdeValue {
        match self {
            CaseValue::Object(entries) => SerdeValue::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_serde()))
                    .collect(),
            ),
            CaseValue::Array(items) => SerdeValue::Array(items.iter().map(|v| v.to_serde()).collect()),
            CaseValue::String(s) => SerdeValue::String(s.clone()),
            CaseValue::Number(CaseNumber::Integer(i)) => SerdeValue::from(*i),
            CaseValue::Number(CaseNumber::Float(f)) => serde_json::Number::from_f64(*f)
                .map(SerdeValue::Number)
                .unwrap_or(SerdeValue::Null),
            CaseValue::Boolean(b) => SerdeValue::Bool(*b),
            CaseValue::Null => SerdeValue::Null,
        }
    }
}

impl From<&SerdeValue> for CaseValue {
    fn from(value: &SerdeValue) -> Self {
        match value {
            SerdeValue::Null => CaseValue::Null,
            SerdeValue::Bool(b) => CaseValue::Boolean(*b),
            SerdeValue::Number(n) => {
                // u64 values above i64::MAX fall through to f64
                if let Some(i) = n.as_i64() {
                    CaseValue::Number(CaseNumber::Integer(i))
                } else {
                    CaseValue::Number(CaseNumber::Float(n.as_f64().unwrap_or(0.0)))
                }
            }
            SerdeValue::String(s) => CaseValue::String(s.clone()),
            SerdeValue::Array(items) => CaseValue::Array(items.iter().map(CaseValue::from).collect()),
            SerdeValue::Object(map) => CaseValue::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), CaseValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<SerdeValue> for CaseValue {
    fn from(value: SerdeValue) -> Self {
        CaseValue::from(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_display() {
        assert_eq!(format!("{}", CaseNumber::Integer(42)), "42");
        assert_eq!(format!("{}", CaseNumber::Float(42.5)), "42.5");
    }

    #[test]
    fn test_number_parse_prefers_integer() {
        assert_eq!(CaseNumber::parse("25"), Some(CaseNumber::Integer(25)));
        assert_eq!(CaseNumber::parse(" 1.5 "), Some(CaseNumber::Float(1.5)));
        assert_eq!(CaseNumber::parse("abc"), None);
        assert_eq!(CaseNumber::parse("inf"), None);
    }

    #[test]
    fn test_object_equality_ignores_key_order() {
        let a = CaseValue::from(json!({"x": 1, "y": 2}));
        let b = CaseValue::from(json!({"y": 2, "x": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_conversion_keeps_kinds() {
        let source = json!({"a": 1, "b": 1.5, "c": "s", "d": [true, null], "e": {}});
        let value = CaseValue::from(&source);

        assert_eq!(value.get("a"), Some(&CaseValue::Number(CaseNumber::Integer(1))));
        assert_eq!(value.get("b"), Some(&CaseValue::Number(CaseNumber::Float(1.5))));
        assert_eq!(value.get("e"), Some(&CaseValue::empty_object()));
        assert_eq!(value.to_serde(), source);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(CaseValue::Null.kind_name(), "null");
        assert_eq!(CaseValue::Array(vec![]).kind_name(), "array");
        assert_eq!(CaseValue::Boolean(false).kind_name(), "boolean");
    }
}
