//! Blank template generation.

use crate::document::node::CaseValue;

/// Produces a copy of `template` with every leaf reset to "no answer".
///
/// Objects keep their keys and are blanked recursively. Arrays become empty
/// arrays, strings become `""`, and numbers and booleans become `null` so a
/// blank field is never mistaken for a real `0` or `false`.
///
/// # Example
///
/// ```
/// use casequill::document::parser::parse_document;
/// use casequill::engine::blank;
///
/// let doc = parse_document(r#"{"a": 5, "b": "x", "c": [1, 2], "d": true}"#).unwrap();
/// let expected = parse_document(r#"{"a": null, "b": "", "c": [], "d": null}"#).unwrap();
/// assert_eq!(blank(&doc), expected);
/// ```
pub fn blank(template: &CaseValue) -> CaseValue {
    match template {
        CaseValue::Object(entries) => CaseValue::Object(
            entries
                .iter()
                .map(|(key, value)| (key.clone(), blank(value)))
                .collect(),
        ),
        CaseValue::Array(_) => CaseValue::Array(Vec::new()),
        CaseValue::String(_) => CaseValue::String(String::new()),
        CaseValue::Number(_) | CaseValue::Boolean(_) | CaseValue::Null => CaseValue::Null,
    }
}
