//! Canonicalization engine for test case documents.
//!
//! These are the rules that turn a freely edited document into a blank
//! template, into a cleaned document with empty values stripped, and that
//! decide whether a document carries any content at all.
//!
//! # Example
//!
//! ```
//! use casequill::document::parser::parse_document;
//! use casequill::engine::{blank, clean, is_blank};
//!
//! let doc = parse_document(r#"{"mhm": {"age": 25, "hgt": null}, "smk": {}}"#).unwrap();
//! assert_eq!(clean(&doc), parse_document(r#"{"mhm": {"age": 25}}"#).unwrap());
//! assert!(!is_blank(&doc));
//! assert!(is_blank(&blank(&doc)));
//! ```

pub mod blank;
pub mod classify;
pub mod clean;
pub mod fields;

pub use blank::blank;
pub use classify::is_empty;
pub use clean::{clean, is_blank};
pub use fields::{flatten, unflatten, FieldError, FieldKind, FieldValue, FlatFields};
