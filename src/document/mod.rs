//! Test case document model.
//!
//! This module provides the tagged `CaseValue` representation of a test case,
//! parsing and pretty-printing through `serde_json`, and the built-in
//! health-score template.
//!
//! # Modules
//!
//! - `node`: the `CaseValue` variant and conversions to and from serde values
//! - `parser`: text to documents and back
//! - `template`: the default health-score skeleton

pub mod node;
pub mod parser;
pub mod template;
