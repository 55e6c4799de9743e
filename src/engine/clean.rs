//! Recursive cleaning and the blank-document predicate.

use super::classify::is_empty;
use crate::document::node::CaseValue;
use indexmap::IndexMap;

/// Strips empty values from a document.
///
/// Nested objects are cleaned depth-first and dropped when nothing is left
/// in them. Every other value is kept verbatim unless [`is_empty`] says it
/// carries no answer. Arrays are not cleaned element by element: a non-empty
/// array survives exactly as it is.
///
/// Documents are objects at the root. A non-object root is returned as-is
/// when it has content, and as an empty object otherwise.
pub fn clean(document: &CaseValue) -> CaseValue {
    match document {
        CaseValue::Object(entries) => CaseValue::Object(clean_entries(entries)),
        other if is_empty(other) => CaseValue::empty_object(),
        other => other.clone(),
    }
}

fn clean_entries(entries: &IndexMap<String, CaseValue>) -> IndexMap<String, CaseValue> {
    let mut cleaned = IndexMap::with_capacity(entries.len());
    for (key, value) in entries {
        match value {
            CaseValue::Object(children) => {
                let child = clean_entries(children);
                if !child.is_empty() {
                    cleaned.insert(key.clone(), CaseValue::Object(child));
                }
            }
            other if !is_empty(other) => {
                cleaned.insert(key.clone(), other.clone());
            }
            _ => {}
        }
    }
    cleaned
}

/// Returns true if cleaning `document` leaves nothing behind.
///
/// # Example
///
/// ```
/// use casequill::document::parser::parse_document;
/// use casequill::engine::is_blank;
///
/// assert!(is_blank(&parse_document(r#"{"mhm": {"age": null, "hgt": null}}"#).unwrap()));
/// assert!(!is_blank(&parse_document(r#"{"smk": {"now": false}}"#).unwrap()));
/// ```
pub fn is_blank(document: &CaseValue) -> bool {
    is_empty(&clean(document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::parser::parse_document;

    fn doc(text: &str) -> CaseValue {
        parse_document(text).unwrap()
    }

    #[test]
    fn test_strips_null_and_empty_sections() {
        let input = doc(r#"{"mhm": {"age": 25, "hgt": null}, "smk": {}}"#);
        assert_eq!(clean(&input), doc(r#"{"mhm": {"age": 25}}"#));
    }

    #[test]
    fn test_all_null_section_is_removed() {
        let input = doc(r#"{"mhm": {"age": null, "hgt": null}}"#);
        assert_eq!(clean(&input), doc("{}"));
        assert!(is_blank(&input));
    }

    #[test]
    fn test_deeply_nested_empties_collapse() {
        let input = doc(r#"{"a": {"b": {"c": {"d": ""}}}, "e": {"f": {}}}"#);
        assert_eq!(clean(&input), doc("{}"));
    }

    #[test]
    fn test_false_and_zero_survive() {
        let input = doc(r#"{"smk": {"now": false, "yrs": 0, "num": 0.0, "qit": null}}"#);
        assert_eq!(
            clean(&input),
            doc(r#"{"smk": {"now": false, "yrs": 0, "num": 0.0}}"#)
        );
    }

    #[test]
    fn test_arrays_are_kept_verbatim() {
        let input = doc(r#"{"slp": {"bed": [null, "", {}], "awk": []}}"#);
        assert_eq!(clean(&input), doc(r#"{"slp": {"bed": [null, "", {}]}}"#));
    }

    #[test]
    fn test_whitespace_strings_are_stripped() {
        let input = doc(r#"{"mhm": {"sex": "   ", "note": " m "}}"#);
        assert_eq!(clean(&input), doc(r#"{"mhm": {"note": " m "}}"#));
    }

    #[test]
    fn test_non_object_roots() {
        assert_eq!(clean(&CaseValue::Null), CaseValue::empty_object());
        assert!(is_blank(&CaseValue::Array(vec![])));
        assert_eq!(clean(&CaseValue::Boolean(false)), CaseValue::Boolean(false));
        assert!(!is_blank(&CaseValue::Boolean(false)));
    }

    #[test]
    fn test_key_order_is_preserved() {
        let input = doc(r#"{"z": 1, "a": null, "m": 2}"#);
        let cleaned = clean(&input);
        let keys: Vec<&String> = cleaned.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "m"]);
    }
}
