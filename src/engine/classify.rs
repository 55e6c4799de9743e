//! Emptiness rules for single values.

use crate::document::node::CaseValue;

/// Returns true if a value carries no answer.
///
/// Null, whitespace-only strings, empty arrays and empty objects are empty.
/// Booleans and numbers never are: `false` and `0` are real answers.
///
/// # Example
///
/// ```
/// use casequill::document::node::{CaseNumber, CaseValue};
/// use casequill::engine::is_empty;
///
/// assert!(is_empty(&CaseValue::String("  ".to_string())));
/// assert!(!is_empty(&CaseValue::Boolean(false)));
/// assert!(!is_empty(&CaseValue::Number(CaseNumber::Integer(0))));
/// ```
pub fn is_empty(value: &CaseValue) -> bool {
    match value {
        CaseValue::Null => true,
        CaseValue::String(s) => s.trim().is_empty(),
        CaseValue::Array(items) => items.is_empty(),
        CaseValue::Object(entries) => entries.is_empty(),
        CaseValue::Boolean(_) | CaseValue::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::CaseNumber;
    use indexmap::IndexMap;

    #[test]
    fn test_null_is_empty() {
        assert!(is_empty(&CaseValue::Null));
    }

    #[test]
    fn test_strings_are_trimmed() {
        assert!(is_empty(&CaseValue::String(String::new())));
        assert!(is_empty(&CaseValue::String(" \t\n".to_string())));
        assert!(!is_empty(&CaseValue::String(" x ".to_string())));
        // only whitespace counts, the literal word is an answer
        assert!(!is_empty(&CaseValue::String("null".to_string())));
    }

    #[test]
    fn test_containers() {
        assert!(is_empty(&CaseValue::Array(vec![])));
        assert!(!is_empty(&CaseValue::Array(vec![CaseValue::Null])));
        assert!(is_empty(&CaseValue::Object(IndexMap::new())));

        let mut entries = IndexMap::new();
        entries.insert("a".to_string(), CaseValue::Null);
        assert!(!is_empty(&CaseValue::Object(entries)));
    }

    #[test]
    fn test_scalars_are_never_empty() {
        assert!(!is_empty(&CaseValue::Boolean(false)));
        assert!(!is_empty(&CaseValue::Boolean(true)));
        assert!(!is_empty(&CaseValue::Number(CaseNumber::Integer(0))));
        assert!(!is_empty(&CaseValue::Number(CaseNumber::Float(0.0))));
    }
}
